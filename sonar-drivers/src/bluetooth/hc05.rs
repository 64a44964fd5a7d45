//! HC-05 Bluetooth serial module
//!
//! In data mode the HC-05 is a transparent UART bridge: bytes written to
//! its RX pin arrive at the paired host and vice versa. The driver only
//! moves bytes and splits incoming text into lines.
//!
//! Factory settings are 9600 baud 8N1, see [`UartConfig::hc05_default`].
//!
//! [`UartConfig::hc05_default`]: sonar_hal::UartConfig::hc05_default

use core::fmt;

use heapless::{String, Vec};
use sonar_hal::{UartRx, UartTx};

/// HC-05 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hc05Error {
    /// Transmit failed
    Tx,
    /// Receive failed
    Rx,
    /// Received line is not valid UTF-8
    InvalidUtf8,
}

/// HC-05 driver over a UART
pub struct Hc05<U> {
    uart: U,
}

impl<U: UartTx + UartRx> Hc05<U> {
    /// Create a new driver
    ///
    /// The UART must already be configured for the module's baud rate.
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    /// Send raw bytes
    pub fn send(&mut self, data: &[u8]) -> Result<(), Hc05Error> {
        self.uart.write_all(data).map_err(|_| Hc05Error::Tx)
    }

    /// Send a string
    pub fn send_str(&mut self, s: &str) -> Result<(), Hc05Error> {
        self.send(s.as_bytes())
    }

    /// Wait until all queued bytes have been sent
    pub fn flush(&mut self) -> Result<(), Hc05Error> {
        self.uart.flush().map_err(|_| Hc05Error::Tx)
    }

    /// Check if a received byte is waiting
    pub fn available(&mut self) -> bool {
        self.uart.available()
    }

    /// Receive one line of text
    ///
    /// Blocks until a `\n` arrives or `N` bytes have been collected,
    /// whichever comes first. The newline is consumed but not stored,
    /// and `\r` is dropped so CRLF terminals work.
    pub fn receive_line<const N: usize>(&mut self) -> Result<String<N>, Hc05Error> {
        let mut line: Vec<u8, N> = Vec::new();

        while !line.is_full() {
            let byte = self.uart.read_byte().map_err(|_| Hc05Error::Rx)?;
            match byte {
                b'\n' => break,
                b'\r' => {}
                // Cannot fail, capacity checked by the loop condition
                _ => line.push(byte).map_err(|_| Hc05Error::Rx)?,
            }
        }

        String::from_utf8(line).map_err(|_| Hc05Error::InvalidUtf8)
    }

    /// Get access to the UART
    pub fn uart(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Release the UART
    pub fn release(self) -> U {
        self.uart
    }
}

impl<U: UartTx + UartRx> fmt::Write for Hc05<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send_str(s).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct MockUart {
        rx: VecDeque<u8>,
        tx: std::vec::Vec<u8>,
        fail_tx: bool,
    }

    impl MockUart {
        fn with_input(input: &[u8]) -> Self {
            Self {
                rx: input.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl UartTx for MockUart {
        type Error = ();

        fn write_byte(&mut self, byte: u8) -> Result<(), ()> {
            if self.fail_tx {
                return Err(());
            }
            self.tx.push(byte);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for MockUart {
        type Error = ();

        fn available(&mut self) -> bool {
            !self.rx.is_empty()
        }

        // An empty queue stands in for a dropped link
        fn read_byte(&mut self) -> Result<u8, ()> {
            self.rx.pop_front().ok_or(())
        }
    }

    #[test]
    fn test_send() {
        let mut bt = Hc05::new(MockUart::default());
        bt.send_str("dist 12.34\r\n").unwrap();
        bt.send(&[0x00, 0xFF]).unwrap();

        assert_eq!(bt.release().tx, b"dist 12.34\r\n\x00\xFF");
    }

    #[test]
    fn test_send_error() {
        let mut bt = Hc05::new(MockUart {
            fail_tx: true,
            ..Default::default()
        });
        assert_eq!(bt.send_str("x"), Err(Hc05Error::Tx));
        assert!(write!(bt, "{}", 1).is_err());
    }

    #[test]
    fn test_fmt_write() {
        let mut bt = Hc05::new(MockUart::default());
        write!(bt, "{:.2} cm", 171.5f32).unwrap();
        assert_eq!(bt.release().tx, b"171.50 cm");
    }

    #[test]
    fn test_receive_lines() {
        let mut bt = Hc05::new(MockUart::with_input(b"ping\nrate 2\r\n"));

        assert!(bt.available());
        assert_eq!(bt.receive_line::<16>().unwrap().as_str(), "ping");
        assert_eq!(bt.receive_line::<16>().unwrap().as_str(), "rate 2");
        assert!(!bt.available());
    }

    #[test]
    fn test_receive_empty_line() {
        let mut bt = Hc05::new(MockUart::with_input(b"\r\n"));
        assert_eq!(bt.receive_line::<8>().unwrap().as_str(), "");
    }

    #[test]
    fn test_receive_line_capacity() {
        let mut bt = Hc05::new(MockUart::with_input(b"abcdefgh\n"));

        // Stops at capacity, the rest stays queued
        assert_eq!(bt.receive_line::<5>().unwrap().as_str(), "abcde");
        assert_eq!(bt.receive_line::<5>().unwrap().as_str(), "fgh");
    }

    #[test]
    fn test_receive_error() {
        let mut bt = Hc05::new(MockUart::with_input(b"no newline"));
        assert_eq!(bt.receive_line::<32>(), Err(Hc05Error::Rx));
    }

    #[test]
    fn test_receive_invalid_utf8() {
        let mut bt = Hc05::new(MockUart::with_input(&[0xC3, 0x28, b'\n']));
        assert_eq!(bt.receive_line::<8>(), Err(Hc05Error::InvalidUtf8));
    }
}
