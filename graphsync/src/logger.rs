//! Logging module.
//!
//! Components log through the [`log`] facade with short targets, eg.
//! `"hooks"`. Embedding applications either install one of the loggers
//! below or bring their own. For test logging see [`mod@test`].

#[cfg(feature = "test")]
pub mod test;

use std::io;
use std::io::Write;

use chrono::prelude::*;
use colored::*;
use log::{Level, Log, Metadata, Record, SetLoggerError};

/// Environment variable read by [`env_level`], before `RUST_LOG`.
pub const LOG_ENV: &str = "GRAPHSYNC_LOG";

/// A logger that logs to `stdout`, with colors and timestamps.
pub struct Logger {
    level: Level,
}

impl Logger {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!(
            "{} {:<5} {:<8} {}",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            record.level(),
            record.target().cyan(),
            record.args()
        );
        let message = match record.level() {
            Level::Error => message.red(),
            Level::Warn => message.yellow(),
            Level::Info => message.normal(),
            Level::Debug => message.dimmed(),
            Level::Trace => message.white().dimmed(),
        };
        // Nb. there is nowhere to report a failed write to stdout.
        writeln!(&mut io::stdout(), "{message}").ok();
    }

    fn flush(&self) {
        io::stdout().flush().ok();
    }
}

/// A logger that logs plain lines to `stderr`.
pub struct StderrLogger {
    level: Level,
}

impl StderrLogger {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            writeln!(
                &mut io::stderr(),
                "{:<5} {:<8} {}",
                record.level(),
                record.target(),
                record.args()
            )
            .ok();
        }
    }

    fn flush(&self) {}
}

/// Initialize the `stdout` logger.
pub fn init(level: Level) -> Result<(), SetLoggerError> {
    set(Logger { level }, level)
}

/// Set a logger.
pub fn set(logger: impl Log + 'static, level: Level) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level.to_level_filter());

    Ok(())
}

/// Get the level set by [`LOG_ENV`], or else by `RUST_LOG`, if present.
pub fn env_level() -> Option<Level> {
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .find_map(|var| std::env::var(var).ok())
        .and_then(|level| level.parse().ok())
}

/// Run `callback` and log how long it took.
pub fn benchmark<F, T>(target: &str, msg: &str, callback: F) -> T
where
    F: FnOnce() -> T,
{
    use std::time::Instant;

    let now = Instant::now();
    let res = callback();
    let elapsed = now.elapsed().as_micros();
    log::debug!(target: target, "{msg} took {elapsed}us");
    res
}
