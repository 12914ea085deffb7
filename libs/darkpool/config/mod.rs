pub mod duration;

use crate::signer::{DomainRegistry, WrappedTokens};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Market maker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub signer: SignerConfig,
    pub websocket: WebSocketConfig,
    #[serde(default)]
    pub eip712_domains: Vec<DomainConfig>,
    #[serde(default)]
    pub quote: QuoteConfig,
    #[serde(default)]
    pub depth: DepthConfig,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
    /// Merged over the built-in wrapped native tokens
    #[serde(default)]
    pub wrapped_native_tokens: HashMap<u64, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_app_name() -> String {
    "mm-example".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Private key inline (wins) or via an environment variable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub private_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(with = "duration", default = "default_reconnect_interval")]
    pub reconnect_interval: Duration,
    /// 0 = unlimited
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    #[serde(with = "duration", default = "default_heartbeat_interval")]
    pub heartbeat_interval: Duration,
    #[serde(with = "duration", default = "default_read_timeout")]
    pub read_timeout: Duration,
    #[serde(with = "duration", default = "default_write_timeout")]
    pub write_timeout: Duration,
    #[serde(with = "duration", default = "default_handshake_timeout")]
    pub handshake_timeout: Duration,
}

fn default_reconnect_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(90)
}

fn default_write_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_handshake_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub chain_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub verifying_contract: String,
}

impl DomainConfig {
    pub fn verifying_address(&self) -> Result<Address> {
        parse_address(&self.verifying_contract, "verifying_contract")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    #[serde(with = "duration", default = "default_valid_duration")]
    pub valid_duration: Duration,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            valid_duration: default_valid_duration(),
        }
    }
}

fn default_valid_duration() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(with = "duration", default = "default_push_interval")]
    pub push_interval: Duration,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            push_interval: default_push_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_push_interval() -> Duration {
    Duration::from_secs(3)
}

/// A tradable pair on one chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    pub chain_id: u64,
    pub pair_id: String,
    #[serde(default)]
    pub pool_address: String,
    pub base_token: String,
    pub quote_token: String,
    #[serde(default = "default_decimals")]
    pub base_token_decimals: u32,
    #[serde(default = "default_decimals")]
    pub quote_token_decimals: u32,
    /// Basis points
    #[serde(default)]
    pub fee_rate: u32,
}

fn default_decimals() -> u32 {
    18
}

/// Largest token precision a pair may declare; native amounts must fit U256
pub const MAX_TOKEN_DECIMALS: u32 = 36;

impl PairConfig {
    pub fn base_address(&self) -> Result<Address> {
        parse_address(&self.base_token, "base_token")
    }

    pub fn quote_address(&self) -> Result<Address> {
        parse_address(&self.quote_token, "quote_token")
    }

    /// Matches the pair in either order, ignoring case
    pub fn matches(&self, token_a: &str, token_b: &str) -> bool {
        let base = &self.base_token;
        let quote = &self.quote_token;
        (base.eq_ignore_ascii_case(token_a) && quote.eq_ignore_ascii_case(token_b))
            || (quote.eq_ignore_ascii_case(token_a) && base.eq_ignore_ascii_case(token_b))
    }
}

fn parse_address(value: &str, field: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| ConfigError::ValidationError(format!("{} '{}' is not a valid address", field, value)))
}

impl Config {
    /// Load configuration from a YAML file, `.env` and `MM_*` overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok(); // Don't fail if .env doesn't exist

        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml_str(&yaml_content)?;

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse without touching the environment or validating
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `MM_SERVER_URL`, `MM_API_TOKEN` and `MM_LOG_LEVEL`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("MM_SERVER_URL") {
            self.websocket.server_url = url;
        }
        if let Some(token) = lookup("MM_API_TOKEN") {
            self.websocket.api_token = token;
        }
        if let Some(level) = lookup("MM_LOG_LEVEL") {
            self.app.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.websocket.server_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "websocket.server_url is required".to_string(),
            ));
        }
        if self.websocket.api_token.is_empty() {
            return Err(ConfigError::ValidationError(
                "websocket.api_token is required".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.app.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "app.log_level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.app.log_level
            )));
        }

        if self.eip712_domains.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one eip712_domains entry is required".to_string(),
            ));
        }
        for (i, domain) in self.eip712_domains.iter().enumerate() {
            if domain.chain_id == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "eip712_domains[{}].chain_id is required",
                    i
                )));
            }
            domain.verifying_address()?;
        }

        for pair in &self.pairs {
            if pair.chain_id == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "pair {} has no chain_id",
                    pair.pair_id
                )));
            }
            let base = pair.base_address()?;
            let quote = pair.quote_address()?;
            if base == quote {
                return Err(ConfigError::ValidationError(format!(
                    "pair {} has identical base and quote tokens",
                    pair.pair_id
                )));
            }
            for (name, decimals) in [
                ("base_token_decimals", pair.base_token_decimals),
                ("quote_token_decimals", pair.quote_token_decimals),
            ] {
                if decimals > MAX_TOKEN_DECIMALS {
                    return Err(ConfigError::ValidationError(format!(
                        "pair {} {} must be at most {}, got {}",
                        pair.pair_id, name, MAX_TOKEN_DECIMALS, decimals
                    )));
                }
            }
        }

        for (chain_id, token) in &self.wrapped_native_tokens {
            parse_address(token, &format!("wrapped_native_tokens[{}]", chain_id))?;
        }

        let ws = &self.websocket;
        let durations = [
            ("websocket.reconnect_interval", ws.reconnect_interval),
            ("websocket.heartbeat_interval", ws.heartbeat_interval),
            ("websocket.read_timeout", ws.read_timeout),
            ("websocket.write_timeout", ws.write_timeout),
            ("websocket.handshake_timeout", ws.handshake_timeout),
            ("quote.valid_duration", self.quote.valid_duration),
            ("depth.push_interval", self.depth.push_interval),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn domain_for_chain(&self, chain_id: u64) -> Option<&DomainConfig> {
        self.eip712_domains.iter().find(|d| d.chain_id == chain_id)
    }

    pub fn pair_for_tokens(&self, chain_id: u64, token_a: &str, token_b: &str) -> Option<&PairConfig> {
        self.pairs
            .iter()
            .filter(|p| p.chain_id == chain_id)
            .find(|p| p.matches(token_a, token_b))
    }

    /// Inline key wins over the environment variable
    pub fn resolve_private_key(&self) -> Result<String> {
        if let Some(key) = self.signer.private_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        match self.signer.private_key_env.as_deref() {
            Some(var) if !var.is_empty() => std::env::var(var)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .ok_or_else(|| ConfigError::EnvVarMissing(var.to_string())),
            _ => Err(ConfigError::ValidationError(
                "neither signer.private_key nor signer.private_key_env is configured".to_string(),
            )),
        }
    }

    /// Registry with one domain per configured chain
    pub fn domain_registry(&self) -> Result<DomainRegistry> {
        let mut registry = DomainRegistry::new();
        for domain in &self.eip712_domains {
            registry.register(
                domain.chain_id,
                &domain.name,
                &domain.version,
                domain.verifying_address()?,
            );
        }
        Ok(registry)
    }

    /// Built-in wrapped tokens with configured entries on top
    pub fn wrapped_tokens(&self) -> Result<WrappedTokens> {
        let mut wrapped = WrappedTokens::default();
        for (chain_id, token) in &self.wrapped_native_tokens {
            wrapped.insert(
                *chain_id,
                parse_address(token, &format!("wrapped_native_tokens[{}]", chain_id))?,
            );
        }
        Ok(wrapped)
    }
}
