//! Blocking UART adapter
//!
//! Wraps an embassy-rp blocking UART in the `sonar-hal` byte traits. The
//! receive FIFO level is read from the peripheral's flag register, so
//! `available()` never consumes a byte.

use embassy_rp::pac;
use embassy_rp::uart::{self, Blocking, Uart};

use sonar_hal::uart::{DataBits, Parity, StopBits};
use sonar_hal::{UartConfig, UartRx, UartTx};

/// UART peripheral instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartPort {
    Uart0,
    Uart1,
}

impl UartPort {
    fn regs(self) -> pac::uart::Uart {
        match self {
            UartPort::Uart0 => pac::UART0,
            UartPort::Uart1 => pac::UART1,
        }
    }
}

/// Convert a board-agnostic UART configuration for embassy-rp
pub fn rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}

/// Blocking UART implementing [`UartTx`] and [`UartRx`]
pub struct RpUart<'d> {
    uart: Uart<'d, Blocking>,
    port: UartPort,
}

impl<'d> RpUart<'d> {
    /// Wrap a blocking UART
    ///
    /// `port` must name the peripheral `uart` was created from.
    pub fn new(uart: Uart<'d, Blocking>, port: UartPort) -> Self {
        Self { uart, port }
    }
}

impl UartTx for RpUart<'_> {
    type Error = uart::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.uart.blocking_write(&[byte])
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.uart.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.blocking_flush()
    }
}

impl UartRx for RpUart<'_> {
    type Error = uart::Error;

    fn available(&mut self) -> bool {
        !self.port.regs().uartfr().read().rxfe()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.uart.blocking_read(&mut buf)?;
        Ok(buf[0])
    }
}
