//! Build script for sonar-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sonar.toml at compile time
//! - Emits the validated configuration as constants

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sonar_core::config::{RangerConfig, TimerConfig};
use sonar_hal::Prescaler;

/// Largest prescaler the RP2040 PWM divider (8.4 fixed point) can realize
const RP2040_MAX_PRESCALER: Prescaler = Prescaler::Div64;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    emit_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Contents of sonar.toml
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SonarToml {
    timer: TimerConfig,
    #[serde(default)]
    ranger: RangerConfig,
    #[serde(default)]
    bluetooth: BluetoothSection,
    #[serde(default)]
    report: ReportSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BluetoothSection {
    baudrate: u32,
}

impl Default for BluetoothSection {
    fn default() -> Self {
        Self { baudrate: 9600 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ReportSection {
    /// Pause between measurement cycles
    interval_ms: u64,
    /// Also measure closing speed each cycle
    speed: bool,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            speed: false,
        }
    }
}

/// Read and parse sonar.toml
fn load_config() -> SonarToml {
    // Re-run if sonar.toml changes
    println!("cargo:rerun-if-changed=sonar.toml");

    let config_path = Path::new("sonar.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: sonar.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a sonar.toml configuration file.          ║\n\
            ║  Please create one in the sonar-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read sonar.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid sonar.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check values against the same validators the firmware relies on
fn validate_config(config: &SonarToml) {
    let mut errors = Vec::new();

    match config.timer.validate() {
        Ok(prescaler) if !prescaler.is_at_most(RP2040_MAX_PRESCALER) => errors.push(format!(
            "[timer] prescaler {} not supported by the RP2040 PWM (max {})",
            prescaler.divisor(),
            RP2040_MAX_PRESCALER.divisor()
        )),
        Ok(_) => {}
        Err(e) => errors.push(format!("[timer] {:?}", e)),
    }

    if let Err(e) = config.ranger.validate() {
        errors.push(format!("[ranger] {:?}", e));
    }

    if config.bluetooth.baudrate == 0 {
        errors.push("[bluetooth] baudrate must be non-zero".to_string());
    }

    if config.report.interval_ms == 0 {
        errors.push("[report] interval_ms must be non-zero".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid sonar.toml configuration                         ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=sonar.toml validated successfully");
}

/// Write the configuration as Rust constants into OUT_DIR
fn emit_config(config: &SonarToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut src = String::new();
    writeln!(
        src,
        "pub const TIMER: TimerConfig = TimerConfig {{ clock_hz: {}, prescaler: {} }};",
        config.timer.clock_hz, config.timer.prescaler
    )
    .unwrap();
    writeln!(
        src,
        "pub const RANGER: RangerConfig = RangerConfig {{ \
         timeout: Micros({}), \
         speed_of_sound: SpeedOfSound::from_mm_per_s({}), \
         speed_interval: Micros({}) }};",
        config.ranger.timeout.as_micros(),
        config.ranger.speed_of_sound.mm_per_s(),
        config.ranger.speed_interval.as_micros()
    )
    .unwrap();
    writeln!(
        src,
        "pub const BLUETOOTH_BAUDRATE: u32 = {};",
        config.bluetooth.baudrate
    )
    .unwrap();
    writeln!(
        src,
        "pub const REPORT_INTERVAL_MS: u64 = {};",
        config.report.interval_ms
    )
    .unwrap();
    writeln!(src, "pub const REPORT_SPEED: bool = {};", config.report.speed).unwrap();

    fs::write(out_dir.join("sonar_config.rs"), src).unwrap();
}
