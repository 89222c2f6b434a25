use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{Log, LogLevel};

/// Messages at this level and above go to stderr, the rest to stdout
const STDERR_FROM: Level = Level::Warn;

impl LogLevel {
    /// Filter letting through this level and everything more severe
    pub fn filter(self) -> LevelFilter {
        let level = match self {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        };
        LevelFilter::MoreSevereEqual(level)
    }
}

/// Where the rotating log goes when the config does not say
pub fn default_log_location() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blogdrop")
        .join("log")
        .join("server.log")
}

fn console_sink(stream: StdStream, filter: LevelFilter) -> spdlog::Result<Arc<StdStreamSink>> {
    let sink = StdStreamSink::builder()
        .std_stream(stream)
        .level_filter(filter)
        .build()?;
    Ok(Arc::new(sink))
}

/// Replaces the default logger with a daily rotating file logger. Without a
/// `[log]` section the default console logger stays in place.
pub fn configure_logger(log: Option<&Log>) -> spdlog::Result<()> {
    let Some(log) = log else {
        return Ok(());
    };

    let location = log.location.clone().unwrap_or_else(default_log_location);
    let daily_sink = Arc::new(RotatingFileSink::builder()
        .base_path(location)
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(60)
        .rotate_on_open(false)
        .build()?);

    let mut builder = Logger::builder();
    builder.sink(daily_sink);
    if log.log_to_console {
        builder
            .sink(console_sink(StdStream::Stdout, LevelFilter::MoreVerbose(STDERR_FROM))?)
            .sink(console_sink(StdStream::Stderr, LevelFilter::MoreSevereEqual(STDERR_FROM))?);
    }

    let daily_logger = Arc::new(builder.build()?);
    daily_logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    daily_logger.set_flush_period(Some(Duration::from_secs(2)));
    daily_logger.set_level_filter(log.level.filter());

    spdlog::set_default_logger(daily_logger);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(LogLevel::Critical.filter(), LevelFilter::MoreSevereEqual(Level::Critical));
        assert_eq!(LogLevel::Warn.filter(), LevelFilter::MoreSevereEqual(Level::Warn));
        assert_eq!(LogLevel::Trace.filter(), LevelFilter::MoreSevereEqual(Level::Trace));
    }

    #[test]
    fn test_console_sinks_split_at_warn() {
        assert!(console_sink(StdStream::Stdout, LevelFilter::MoreVerbose(STDERR_FROM)).is_ok());
        assert!(console_sink(StdStream::Stderr, LevelFilter::MoreSevereEqual(STDERR_FROM)).is_ok());
    }

    #[test]
    fn test_default_log_location() {
        let location = default_log_location();
        assert!(location.ends_with("blogdrop/log/server.log"));
    }

    #[test]
    fn test_no_log_section_keeps_default() {
        assert!(configure_logger(None).is_ok());
    }
}
