//! Logging configuration.
//!
//! Level and format come from `--log-level` / `--log-format`, falling back
//! to TESTBANDIT_LOG / TESTBANDIT_LOG_FORMAT. RUST_LOG, when set, replaces
//! the whole filter.

use clap::ValueEnum;

pub const ENV_LOG_LEVEL: &str = "TESTBANDIT_LOG";
pub const ENV_LOG_FORMAT: &str = "TESTBANDIT_LOG_FORMAT";

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event.
    #[value(alias = "json")]
    Jsonl,
}

/// Verbosity of the testbandit targets.
///
/// The engine emits `debug` per recorded batch and `info` per winner
/// computation; `warn` (the default) keeps command output clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Case-insensitive parse of an environment value; garbage is ignored.
fn parse_env<T: ValueEnum>(value: &str) -> Option<T> {
    T::from_str(value.trim(), true).ok()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Whether to include timestamps in human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Warn,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// CLI values win over the environment, which wins over defaults.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(cli_level, cli_format, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let defaults = LogConfig::default();
        LogConfig {
            level: cli_level
                .or_else(|| lookup(ENV_LOG_LEVEL).and_then(|v| parse_env(&v)))
                .unwrap_or(defaults.level),
            format: cli_format
                .or_else(|| lookup(ENV_LOG_FORMAT).and_then(|v| parse_env(&v)))
                .unwrap_or(defaults.format),
            timestamps: defaults.timestamps,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}
