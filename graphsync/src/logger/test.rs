//! Logger for tests, printing the thread name of each record so that
//! output of concurrent sessions can be told apart.
use localtime::LocalTime;
use log::*;

struct Logger {
    level: Level,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        use colored::Colorize;

        if !self.enabled(record.metadata()) {
            return;
        }
        let time = LocalTime::now().as_secs();
        let msg = format!("{:>8} {}", format!("{}:", record.target()), record.args());
        let line = match std::thread::current().name() {
            Some(name) => format!("{time} {name:<24} {msg}"),
            None => format!("{time} {msg}"),
        };
        match record.level() {
            Level::Error => println!("{}", line.red()),
            Level::Warn => println!("{}", line.yellow()),
            _ => println!("{}", line.dimmed()),
        }
    }

    fn flush(&self) {}
}

/// Install the test logger. Does nothing if a logger is already set.
pub fn init(level: Level) {
    let logger = Logger { level };

    log::set_boxed_logger(Box::new(logger)).ok();
    log::set_max_level(level.to_level_filter());
}
