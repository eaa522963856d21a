//! Process-wide log subscriber.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::LogLevel;

/// Maps a configured level onto the `tracing` filter level.
pub fn tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Installs a stderr subscriber filtered at `level`.
///
/// Calling it twice keeps the first subscriber.
pub fn init(level: LogLevel) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing_level(level))
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Log subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        for name in LogLevel::NAMES {
            assert!(LogLevel::from_name(name).is_some(), "{}", name);
        }
        assert_eq!(LogLevel::from_name("WARN"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("verbose"), None);
    }

    #[test]
    fn test_warning_maps_to_warn() {
        assert_eq!(tracing_level(LogLevel::Warning), Level::WARN);
        assert_eq!(tracing_level(LogLevel::default()), Level::WARN);
        assert_eq!(tracing_level(LogLevel::Trace), Level::TRACE);
    }
}
