//! CLI utilities for binaries
//!
//! Resolves the configuration path from arguments, the environment or a
//! default, in that order.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Market maker configuration (configs/config.yaml)
    MarketMaker,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::MarketMaker => "configs/config.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        "MM_CONFIG_PATH"
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use darkpool_mm::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::MarketMaker);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    std::env::var(config_type.env_var_name())
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| config_type.default_path().to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// `--config <path>`, `-config <path>` or the `=` forms of either
pub fn config_path_from_args(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-config" => return iter.next().map(PathBuf::from),
            other => {
                if let Some(path) = other
                    .strip_prefix("--config=")
                    .or_else(|| other.strip_prefix("-config="))
                {
                    return Some(PathBuf::from(path));
                }
            }
        }
    }
    None
}

/// Arguments win over `MM_CONFIG_PATH`, which wins over the default
pub fn resolve_config_path(args: &[String]) -> PathBuf {
    config_path_from_args(args).unwrap_or_else(|| load_config_from_env(ConfigType::MarketMaker))
}
