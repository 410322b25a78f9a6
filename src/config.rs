use crate::error::{Result, SkiffError};
use serde::{Deserialize, Serialize};

/// Engine configuration loaded from a TOML file, env vars, or defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Structured logging level and format.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Defaults seeded into new sessions.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Structured logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log verbosity filter (e.g. `"info"`, `"debug"`). Default: `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: `"json"` or `"pretty"`. Default: `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Session variable defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial `vector_index_match_method` for new sessions.
    /// Default: `"default"` (first matching index wins).
    #[serde(default = "default_match_method")]
    pub vector_index_match_method: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_match_method() -> String {
    "default".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            vector_index_match_method: default_match_method(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults.
    /// After loading, env var overrides are applied so that:
    /// env var > TOML file > defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    SkiffError::Config(format!("failed to read config file {p}: {e}"))
                })?;
                toml::from_str(&content)
                    .map_err(|e| SkiffError::Config(format!("failed to parse config: {e}")))?
            }
            None => Config::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of file/default values.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SKIFF_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("SKIFF_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Ok(v) = std::env::var("SKIFF_VECTOR_INDEX_MATCH_METHOD") {
            self.session.vector_index_match_method = v;
        }
    }
}
