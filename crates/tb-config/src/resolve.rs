//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → built-in demo.

use std::path::{Path, PathBuf};

use crate::experiment::ExperimentConfig;
use crate::validate::{validate_config, ValidationResult};

/// Where the experiment configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using the built-in demo experiment.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Resolved experiment file path plus its source.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Path to the experiment file (None means built-in demo).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "TESTBANDIT_CONFIG";
pub const ENV_CONFIG_DIR: &str = "TESTBANDIT_CONFIG_DIR";

/// Standard config file names, in lookup order.
const CONFIG_FILENAMES: [&str; 2] = ["experiment.toml", "experiment.json"];

/// Application name for XDG directories.
const APP_NAME: &str = "testbandit";

/// Resolve the experiment file path.
///
/// Resolution order:
/// 1. Explicit CLI path (returned even if missing so loading reports it)
/// 2. `TESTBANDIT_CONFIG` (direct path)
/// 3. `TESTBANDIT_CONFIG_DIR` + standard filename
/// 4. XDG config directory (~/.config/testbandit/)
/// 5. Built-in demo (None)
pub fn resolve_config_path(cli_path: Option<&Path>) -> ResolvedConfig {
    if let Some(path) = cli_path {
        return ResolvedConfig {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return ResolvedConfig {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&config_dir)) {
            return ResolvedConfig {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = find_in_dir(&dir) {
            return ResolvedConfig {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    ResolvedConfig::default()
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Get the XDG config directory for testbandit.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Resolve, load, and validate the experiment configuration.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<(ExperimentConfig, ConfigSource)> {
    let resolved = resolve_config_path(cli_path);
    let config = match &resolved.path {
        Some(path) => ExperimentConfig::from_file(path)?,
        None => ExperimentConfig::builtin_demo(),
    };
    validate_config(&config)?;
    Ok((config, resolved.source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_path_wins_even_if_missing() {
        let resolved = resolve_config_path(Some(Path::new("/nonexistent/experiment.json")));
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(
            resolved.path,
            Some(PathBuf::from("/nonexistent/experiment.json"))
        );
    }

    #[test]
    fn test_missing_cli_path_fails_to_load() {
        let err = load_config(Some(Path::new("/nonexistent/experiment.json"))).unwrap_err();
        assert_eq!(err.code(), 60);
    }

    #[test]
    fn test_xdg_config_dir() {
        if let Some(path) = xdg_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }
}
