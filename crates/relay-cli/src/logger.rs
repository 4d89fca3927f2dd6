use chrono::Local;
use log::{LevelFilter, Metadata, Record};

/// Writes timestamped log lines to stderr, keeping stdout for results
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "{} {:<5} {}: {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};

    #[test]
    fn installs_once_and_filters_by_level() {
        let logger = StderrLogger::new(LevelFilter::Warn);
        let warn = Metadata::builder().level(Level::Warn).build();
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&debug));

        let installed = StderrLogger::new(LevelFilter::Info).init();
        let error: Box<dyn std::error::Error> = match installed {
            Ok(()) => match StderrLogger::new(LevelFilter::Info).init() {
                Err(e) => Box::new(e),
                Ok(()) => panic!("a second logger must be rejected"),
            },
            Err(e) => Box::new(e),
        };
        assert!(!error.to_string().is_empty());
    }
}
