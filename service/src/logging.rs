use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Modules to filter out from logging when not in Trace mode.
/// The HTTP stack logs every request and every poll of a long-lived stream.
const FILTERED_MODULES: &[&str] = &["tower", "tracing", "hyper", "axum", "reqwest"];

pub struct Logger {}

impl Logger {
    /// Installs a terminal logger at the level chosen in `config`.
    ///
    /// At Trace everything is shown, otherwise the HTTP stack is muted so that
    /// channel traffic stays readable.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;

        TermLogger::init(
            level,
            Self::build_log_config(Self::muted_modules(level)),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )
    }

    /// Dependency modules to silence at `level`.
    fn muted_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            FILTERED_MODULES
        }
    }

    fn build_log_config(muted: &[&'static str]) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in muted {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_modules_cover_http_stack() {
        for module in ["tower", "hyper", "axum", "reqwest"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_trace_level_mutes_nothing() {
        assert!(Logger::muted_modules(LevelFilter::Trace).is_empty());
    }

    #[test]
    fn test_other_levels_mute_http_stack() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert_eq!(Logger::muted_modules(level), FILTERED_MODULES);
        }
    }

    #[test]
    fn test_build_log_config_does_not_panic() {
        let _muted = Logger::build_log_config(FILTERED_MODULES);
        let _open = Logger::build_log_config(&[]);
    }
}
