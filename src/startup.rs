//! Process bootstrap: config resolution and logging.
//!
//! The library itself never installs a tracing subscriber; only binaries
//! call `init_logging`.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Resolve the configuration file path.
///
/// Priority:
/// 1. `SKIFF_CONFIG` environment variable
/// 2. `./skiff.toml` if it exists
/// 3. None (use defaults)
pub fn resolve_config_path() -> Option<String> {
    std::env::var("SKIFF_CONFIG").ok().or_else(|| {
        let default = "skiff.toml";
        std::path::Path::new(default)
            .exists()
            .then(|| default.to_string())
    })
}

/// Initialize the tracing subscriber from logging config.
///
/// Supports JSON and plain text formats. Uses `RUST_LOG` if set, otherwise
/// falls back to `config.logging.level`.
pub fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
