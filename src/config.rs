//! Configuration management for the aichainx CLI and library

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::cli::ConfigCommand;
use crate::error::{MarketError, Result};
use crate::store::SessionStoreConfig;
use crate::ui::UI;

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x358AA13c52544ECCEF6B0ADD0f801012ADAD5eE3";
pub const DEFAULT_EXPLORER_URL: &str = "https://primordial.bdagscan.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub identity_endpoint: String,
    #[serde(default)]
    pub identity_api_key: Option<String>,
    /// JSON-RPC endpoint of the wallet; `None` means no wallet is installed
    #[serde(default)]
    pub wallet_rpc_url: Option<String>,
    pub contract_address: String,
    pub explorer_url: String,
    pub chain_name: String,
    pub currency: String,
    pub receipt_poll_interval_ms: u64,
    /// Per-request HTTP timeout in seconds
    pub timeout: u64,
    pub verbose: bool,
    pub storage_dir: PathBuf,
    pub session_storage_enabled: bool,
    /// Obfuscates the stored session file when set
    #[serde(default)]
    pub session_encryption_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            identity_api_key: None,
            wallet_rpc_url: None,
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            chain_name: "BlockDAG Primordial Testnet".to_string(),
            currency: "BDAG".to_string(),
            receipt_poll_interval_ms: 2000,
            timeout: 30,
            verbose: false,
            storage_dir: default_storage_dir(),
            session_storage_enabled: true,
            session_encryption_key: None,
        }
    }
}

impl Config {
    /// Load from the default location, see [`Config::load_from`]
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };
        Self::load_from(&config_file).await
    }

    /// Read the JSON file, writing defaults when it is missing or unparsable,
    /// then overlay `AICHAINX_*` environment variables.
    pub async fn load_from(config_file: &Path) -> Result<Self> {
        let base = if config_file.exists() {
            let content = fs::read_to_string(config_file).await?;

            match serde_json::from_str::<Self>(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Unreadable config at {}: {}", config_file.display(), e);
                    let config = Self::default();
                    config.save(config_file).await?;
                    config
                }
            }
        } else {
            let config = Self::default();
            config.save(config_file).await?;
            config
        };

        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).await?;
        Ok(())
    }

    fn with_env_overrides(self) -> Result<Self> {
        let json = serde_json::to_string(&self)?;

        let merged = config::Config::builder()
            .add_source(File::from_str(&json, FileFormat::Json))
            .add_source(Environment::with_prefix("AICHAINX").try_parsing(true))
            .build()?;

        Ok(merged.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        validate_url(&self.identity_endpoint)?;
        validate_url(&self.explorer_url)?;
        if let Some(url) = &self.wallet_rpc_url {
            validate_url(url)?;
        }
        validate_address(&self.contract_address)?;

        if self.timeout == 0 {
            return Err(MarketError::invalid_input("Timeout must be greater than zero"));
        }
        if self.receipt_poll_interval_ms == 0 {
            return Err(MarketError::invalid_input(
                "Receipt poll interval must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Block explorer link for a transaction hash
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }

    /// Identity REST endpoint for an `accounts:<action>` call
    pub fn identity_url(&self, action: &str) -> String {
        format!(
            "{}/accounts:{}",
            self.identity_endpoint.trim_end_matches('/'),
            action
        )
    }

    pub fn session_store_config(&self) -> SessionStoreConfig {
        SessionStoreConfig {
            enabled: self.session_storage_enabled,
            storage_path: Some(self.storage_dir.join("session.json")),
            encryption_key: self.session_encryption_key.clone(),
        }
    }
}

pub fn validate_url(url: &str) -> Result<()> {
    let ok = (url.starts_with("http://") || url.starts_with("https://"))
        && url.split_once("://").is_some_and(|(_, host)| !host.is_empty());
    if ok {
        Ok(())
    } else {
        Err(MarketError::invalid_endpoint(url))
    }
}

/// `0x` followed by exactly 40 hex digits
pub fn validate_address(address: &str) -> Result<()> {
    match address.strip_prefix("0x") {
        Some(hex) if hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()) => Ok(()),
        _ => Err(MarketError::invalid_address(address)),
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aichainx")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aichainx")
}

/// Backs the `config` subcommands
pub struct ConfigService {
    config: Config,
    config_path: PathBuf,
    ui: UI,
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self::with_config_path(config, default_config_path())
    }

    pub fn with_config_path(config: Config, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
            ui: UI::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn handle_config(&mut self, command: ConfigCommand) -> Result<()> {
        match command {
            ConfigCommand::Show => {
                self.show();
                return Ok(());
            }
            ConfigCommand::SetWalletRpc { url } => {
                validate_url(&url)?;
                self.ui.success(&format!("Wallet RPC set to {}", url));
                self.config.wallet_rpc_url = Some(url);
            }
            ConfigCommand::ClearWalletRpc => {
                self.config.wallet_rpc_url = None;
                self.ui.success("Wallet RPC cleared");
            }
            ConfigCommand::SetContract { address } => {
                validate_address(&address)?;
                self.ui.success(&format!("Contract address set to {}", address));
                self.config.contract_address = address;
            }
            ConfigCommand::SetExplorer { url } => {
                validate_url(&url)?;
                self.ui.success(&format!("Explorer set to {}", url));
                self.config.explorer_url = url;
            }
            ConfigCommand::SetTimeout { seconds } => {
                if seconds == 0 {
                    return Err(MarketError::invalid_input("Timeout must be greater than zero"));
                }
                self.config.timeout = seconds;
                self.ui.success(&format!("Timeout set to {}s", seconds));
            }
            ConfigCommand::SetVerbose { enabled } => {
                let enabled = parse_bool(&enabled)?;
                self.config.verbose = enabled;
                self.ui.success(&format!("Verbose output {}", if enabled { "enabled" } else { "disabled" }));
            }
            ConfigCommand::Reset => {
                self.config = Config::default();
                self.ui.success("Configuration reset to defaults");
            }
        }

        tracing::debug!("Saving configuration to {}", self.config_path.display());
        self.config.save(&self.config_path).await
    }

    fn show(&self) {
        let c = &self.config;
        self.ui.card(
            "Configuration",
            vec![
                ("Config file", self.config_path.display().to_string()),
                ("Identity endpoint", c.identity_endpoint.clone()),
                (
                    "Identity API key",
                    if c.identity_api_key.is_some() { "set" } else { "not set" }.to_string(),
                ),
                (
                    "Wallet RPC",
                    c.wallet_rpc_url.clone().unwrap_or_else(|| "none".to_string()),
                ),
                ("Chain", c.chain_name.clone()),
                ("Contract", c.contract_address.clone()),
                ("Explorer", c.explorer_url.clone()),
                ("Currency", c.currency.clone()),
                ("Timeout", format!("{}s", c.timeout)),
                ("Verbose", c.verbose.to_string()),
                ("Storage", c.storage_dir.display().to_string()),
                (
                    "Session key",
                    if c.session_encryption_key.is_some() { "set" } else { "not set" }.to_string(),
                ),
            ],
        );
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(MarketError::invalid_input(format!(
            "Expected true/false, got '{}'",
            other
        ))),
    }
}
