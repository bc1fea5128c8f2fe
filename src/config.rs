//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Loading never fails on missing ledger settings; validation into
//! [`ContractSettings`] and [`WalletSettings`] does, so a server can refuse
//! to start before it serves a single request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ledger::{Address, ContractSettings, LedgerError};
use crate::records::DEFAULT_FETCH_CONCURRENCY;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Per-request timeout; 0 disables it
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Ledger network the contract is deployed on
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Sepolia,
    Mainnet,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Sepolia => 11_155_111,
            Network::Mainnet => 1,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Sepolia => write!(f, "sepolia"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sepolia" => Ok(Network::Sepolia),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!("Unknown network: {other}. Use sepolia or mainnet")),
        }
    }
}

/// Ledger endpoint and contract location
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub network: Network,

    /// JSON-RPC endpoint URL (e.g. an Alchemy or Infura URL)
    pub rpc_url: Option<String>,

    /// Deployed `DentalRecords` contract address on `network`
    pub contract_address: Option<String>,

    #[serde(default = "default_rpc_timeout")]
    pub request_timeout_ms: u64,
}

fn default_rpc_timeout() -> u64 {
    10_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_url: None,
            contract_address: None,
            request_timeout_ms: default_rpc_timeout(),
        }
    }
}

impl LedgerConfig {
    /// Validate into contract settings
    pub fn settings(&self) -> Result<ContractSettings, LedgerError> {
        let rpc_url = required(&self.rpc_url, "ledger.rpc_url", "DENTALCHAIN_RPC_URL")?;
        let parsed = reqwest::Url::parse(rpc_url).map_err(|e| {
            LedgerError::NotConfigured(format!("ledger.rpc_url {rpc_url:?} is not a valid URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LedgerError::NotConfigured(format!(
                "ledger.rpc_url must use http or https, got {}",
                parsed.scheme()
            )));
        }

        let contract = required(
            &self.contract_address,
            "ledger.contract_address",
            "DENTALCHAIN_CONTRACT_ADDRESS",
        )?;
        let contract_address: Address = contract.parse().map_err(|e| {
            LedgerError::NotConfigured(format!("ledger.contract_address: {e}"))
        })?;

        Ok(ContractSettings {
            rpc_url: rpc_url.to_string(),
            contract_address,
            chain_id: self.network.chain_id(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        })
    }
}

/// Wallet-connector settings handed to browser clients
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Wallet-connector project identifier
    pub project_id: Option<String>,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_app_description")]
    pub app_description: String,

    #[serde(default = "default_app_url")]
    pub app_url: String,
}

fn default_app_name() -> String {
    "DentalChain".to_string()
}

fn default_app_description() -> String {
    "Secure Dental Records on the Blockchain".to_string()
}

fn default_app_url() -> String {
    "https://dentalchain.vercel.app".to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            app_name: default_app_name(),
            app_description: default_app_description(),
            app_url: default_app_url(),
        }
    }
}

/// Validated wallet-connector settings
#[derive(Debug, Clone, Serialize)]
pub struct WalletSettings {
    pub project_id: String,
    pub app_name: String,
    pub app_description: String,
    pub app_url: String,
}

impl WalletConfig {
    pub fn settings(&self) -> Result<WalletSettings, LedgerError> {
        let project_id = required(
            &self.project_id,
            "wallet.project_id",
            "DENTALCHAIN_WALLET_PROJECT_ID",
        )?;
        Ok(WalletSettings {
            project_id: project_id.to_string(),
            app_name: self.app_name.clone(),
            app_description: self.app_description.clone(),
            app_url: self.app_url.clone(),
        })
    }
}

/// Record aggregation and submission behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsConfig {
    /// Wait after a submission before re-listing
    #[serde(default = "default_settle_interval")]
    pub settle_interval_ms: u64,

    /// Maximum record fetches in flight during aggregation
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_settle_interval() -> u64 {
    2000
}

fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            settle_interval_ms: default_settle_interval(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl RecordsConfig {
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    key: &str,
    env: &str,
) -> Result<&'a str, LedgerError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(LedgerError::NotConfigured(format!(
            "{key} is not set (config file or {env})"
        ))),
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `DENTALCHAIN_CONFIG`, default locations, or environment
    pub fn load_default() -> Result<Self, ConfigError> {
        // An explicitly named file must load
        if let Ok(path) = std::env::var("DENTALCHAIN_CONFIG") {
            let path = PathBuf::from(path);
            tracing::info!("Loading config from {:?}", path);
            return Self::load_with_env(&path);
        }

        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("dentalchain").join("config.toml")),
            Some(PathBuf::from("/etc/dentalchain/config.toml")),
            Some(PathBuf::from("./dentalchain.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        match Self::load_first(&config_paths)? {
            Some(config) => Ok(config),
            None => {
                tracing::info!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    /// Load the first of `paths` that exists
    ///
    /// A file that exists but fails to load is an error; later paths are
    /// not tried.
    fn load_first(paths: &[PathBuf]) -> Result<Option<Self>, ConfigError> {
        for path in paths {
            if path.exists() {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                return Ok(Some(config));
            }
        }
        Ok(None)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment in production)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("DENTALCHAIN_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("DENTALCHAIN_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid DENTALCHAIN_API_PORT {:?}", port),
            }
        }

        // Ledger overrides
        if let Some(network) = lookup("DENTALCHAIN_NETWORK") {
            match network.parse() {
                Ok(n) => self.ledger.network = n,
                Err(e) => tracing::warn!("Ignoring DENTALCHAIN_NETWORK: {}", e),
            }
        }
        if let Some(url) = lookup("DENTALCHAIN_RPC_URL") {
            self.ledger.rpc_url = Some(url);
        }
        if let Some(address) = lookup("DENTALCHAIN_CONTRACT_ADDRESS") {
            self.ledger.contract_address = Some(address);
        }

        // Wallet overrides
        if let Some(project_id) = lookup("DENTALCHAIN_WALLET_PROJECT_ID") {
            self.wallet.project_id = Some(project_id);
        }

        // Records overrides
        if let Some(ms) = lookup("DENTALCHAIN_SETTLE_INTERVAL_MS") {
            if let Ok(ms) = ms.parse() {
                self.records.settle_interval_ms = ms;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("DENTALCHAIN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DENTALCHAIN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# DentalChain Configuration
#
# Environment variables override these settings:
# - DENTALCHAIN_API_HOST
# - DENTALCHAIN_API_PORT
# - DENTALCHAIN_NETWORK
# - DENTALCHAIN_RPC_URL
# - DENTALCHAIN_CONTRACT_ADDRESS
# - DENTALCHAIN_WALLET_PROJECT_ID
# - DENTALCHAIN_SETTLE_INTERVAL_MS
# - DENTALCHAIN_LOG_LEVEL
# - DENTALCHAIN_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins (empty list allows any origin)
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds (0 disables the timeout)
request_timeout_secs = 30

[ledger]
# Network the contract is deployed on: sepolia or mainnet
network = "sepolia"

# JSON-RPC endpoint (required)
# rpc_url = "https://eth-sepolia.g.alchemy.com/v2/<key>"

# Deployed DentalRecords contract address (required)
# contract_address = "0x0000000000000000000000000000000000000000"

# Per-request timeout for ledger calls (ms)
request_timeout_ms = 10000

[wallet]
# Wallet-connector project id (required by the API server)
# project_id = ""

app_name = "DentalChain"
app_description = "Secure Dental Records on the Blockchain"
app_url = "https://dentalchain.vercel.app"

[records]
# Wait after submitting a record before listing again (ms)
settle_interval_ms = 2000

# Maximum record fetches in flight while aggregating
fetch_concurrency = 32

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const CONTRACT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn ledger(rpc_url: Option<&str>, contract: Option<&str>) -> LedgerConfig {
        LedgerConfig {
            rpc_url: rpc_url.map(String::from),
            contract_address: contract.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.ledger.network, Network::Sepolia);
        assert_eq!(config.records.settle_interval(), Duration::from_secs(2));
        assert_eq!(config.records.fetch_concurrency, 32);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.records.settle_interval_ms, 2000);
        assert!(config.ledger.rpc_url.is_none());
        assert_eq!(config.wallet.app_name, "DentalChain");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[ledger]
network = "mainnet"
rpc_url = "https://rpc.example.org"
contract_address = "{CONTRACT}"

[records]
settle_interval_ms = 500
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ledger.network, Network::Mainnet);
        assert_eq!(config.records.settle_interval_ms, 500);
        assert_eq!(config.records.fetch_concurrency, 32);

        let settings = config.ledger.settings().unwrap();
        assert_eq!(settings.chain_id, 1);
        assert_eq!(settings.contract_address.to_string(), CONTRACT.to_lowercase());
    }

    #[test]
    fn test_api_section_keeps_default_cors_origins() {
        let config: Config = toml::from_str("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.cors_origins, ApiConfig::default().cors_origins);

        let config: Config = toml::from_str("[api]\ncors_origins = []\n").unwrap();
        assert!(config.api.cors_origins.is_empty());
    }

    #[test]
    fn test_zero_request_timeout_disables_timeout() {
        let mut api = ApiConfig::default();
        assert_eq!(api.request_timeout(), Some(Duration::from_secs(30)));

        api.request_timeout_secs = 0;
        assert_eq!(api.request_timeout(), None);
    }

    #[test]
    fn test_malformed_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let broken = dir.path().join("broken.toml");
        let valid = dir.path().join("valid.toml");
        std::fs::write(&broken, "[ledger\nrpc_url = ").unwrap();
        std::fs::write(&valid, "[records]\nsettle_interval_ms = 750\n").unwrap();

        let err = Config::load_first(&[missing.clone(), broken, valid.clone()]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let config = Config::load_first(&[missing.clone(), valid]).unwrap().unwrap();
        assert_eq!(config.records.settle_interval_ms, 750);

        assert!(Config::load_first(&[missing]).unwrap().is_none());
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/dentalchain.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = \"not a number\"").unwrap();
        assert!(matches!(
            Config::load(file.path()).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_missing_ledger_settings_not_configured() {
        let err = ledger(None, Some(CONTRACT)).settings().unwrap_err();
        assert!(matches!(err, LedgerError::NotConfigured(ref m) if m.contains("rpc_url")));

        let err = ledger(Some("https://rpc.example.org"), None).settings().unwrap_err();
        assert!(matches!(err, LedgerError::NotConfigured(ref m) if m.contains("contract_address")));

        let err = ledger(Some("  "), Some(CONTRACT)).settings().unwrap_err();
        assert!(matches!(err, LedgerError::NotConfigured(_)));
    }

    #[test]
    fn test_malformed_ledger_settings_not_configured() {
        let err = ledger(Some("not a url"), Some(CONTRACT)).settings().unwrap_err();
        assert!(matches!(err, LedgerError::NotConfigured(_)));

        let err = ledger(Some("ftp://rpc.example.org"), Some(CONTRACT)).settings().unwrap_err();
        assert!(matches!(err, LedgerError::NotConfigured(_)));

        let err = ledger(Some("https://rpc.example.org"), Some("0x1234")).settings().unwrap_err();
        assert!(matches!(err, LedgerError::NotConfigured(_)));
    }

    #[test]
    fn test_wallet_settings_require_project_id() {
        assert!(matches!(
            WalletConfig::default().settings(),
            Err(LedgerError::NotConfigured(_))
        ));

        let wallet = WalletConfig {
            project_id: Some("abc123".to_string()),
            ..Default::default()
        };
        assert_eq!(wallet.settings().unwrap().project_id, "abc123");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DENTALCHAIN_API_PORT", "9000"),
            ("DENTALCHAIN_NETWORK", "mainnet"),
            ("DENTALCHAIN_RPC_URL", "https://rpc.example.org"),
            ("DENTALCHAIN_CONTRACT_ADDRESS", CONTRACT),
            ("DENTALCHAIN_SETTLE_INTERVAL_MS", "250"),
            ("DENTALCHAIN_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.ledger.network, Network::Mainnet);
        assert_eq!(config.records.settle_interval_ms, 250);
        assert_eq!(config.logging.format, "json");
        assert!(config.ledger.settings().is_ok());
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "DENTALCHAIN_API_PORT" => Some("eighty".to_string()),
            "DENTALCHAIN_NETWORK" => Some("ropsten".to_string()),
            _ => None,
        });
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.ledger.network, Network::Sepolia);
    }
}
