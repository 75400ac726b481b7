//! Console and SD card logger.
//!
//! Implements the [`log`] facade. Every record is printed to the console and
//! appended to `log.txt` on the SD card, so a run can be reviewed after the
//! match when no terminal was attached.
//!
//! ```ignore
//! use talos::fs::logger;
//! use log::LevelFilter;
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     logger::init(LevelFilter::Info).expect("Logger init failed");
//!     // ...
//! }
//! ```
//!
//! Example output:
//! ```text
//! INFO [1s 20ms] talos::motion::odom::tracker - Odometry initialized at (18.50, 91.20) @ 0.00°
//! WARN [14s 310ms] talos::shooter - Launcher not at speed after 3s, firing anyway
//! ```

use std::{
    fmt,
    fs::OpenOptions,
    io::{BufWriter, Write},
    sync::{Mutex, OnceLock},
    time::Duration,
};

use humantime::format_duration;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// Writes log records to the console and `log.txt`.
pub struct TalosLogger {
    /// `None` when the file could not be opened (e.g. no SD card).
    file_writer: Mutex<Option<BufWriter<std::fs::File>>>,
}

impl TalosLogger {
    fn new() -> Self {
        let file_writer = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open("log.txt")
            .ok()
            .map(BufWriter::new);

        Self {
            file_writer: Mutex::new(file_writer),
        }
    }
}

impl log::Log for TalosLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), uptime(), record.target(), record.args());
        print!("{}", line);

        if let Ok(mut guard) = self.file_writer.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writer.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file_writer.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}

static LOGGER: OnceLock<TalosLogger> = OnceLock::new();

/// Installs the logger and sets the maximum level.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(TalosLogger::new);
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

/// Formats one log line: `LEVEL [uptime] target - message`.
fn format_line(level: Level, uptime: Duration, target: &str, args: &fmt::Arguments<'_>) -> String {
    format!("{} [{}] {} - {}\n", level, format_duration(uptime), target, args)
}

#[cfg(target_os = "vexos")]
fn uptime() -> Duration { vexide::time::user_uptime() }

/// Host builds have no program clock; a fixed placeholder keeps lines stable.
#[cfg(not(target_os = "vexos"))]
fn uptime() -> Duration { Duration::from_millis(123432) }
