use chrono::Utc;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

/// Writes every enabled record to stderr as `<utc timestamp> <LEVEL> <target>: <message>`.
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        return Self { level };
    }

    fn format(&self, record: &Record) -> String {
        return format!(
            "{} {:<5} {}: {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            record.level(),
            record.target(),
            record.args()
        );
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        return metadata.level() <= self.level;
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format(record);
        let _ = writeln!(std::io::stderr(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Maps the number of `-v` flags onto a level. Warnings are always shown.
pub fn level_for_verbosity(occurrences: u64) -> LevelFilter {
    return match occurrences {
        0 => Level::Warn.to_level_filter(),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
}

/// Installs a [`StderrLogger`] as the global logger.
pub fn init_logger(occurrences: u64) -> Result<(), SetLoggerError> {
    let level = level_for_verbosity(occurrences);

    log::set_boxed_logger(Box::new(StderrLogger::new(level)))?;
    log::set_max_level(level);

    return Ok(());
}
