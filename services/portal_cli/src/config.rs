//! Configuration for the portal front-end

use anyhow::{Context, Result};
use gif_portal::{
    load_keypair, parse_commitment, write_keypair, Cluster, PortalConfig, ProgramInterface,
    StorageConfig, StorageMode,
};
use serde::Deserialize;
use solana_sdk::{signature::Keypair, signer::Signer};
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Cluster name or RPC URL
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Commitment level for reads and confirmations
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Program interface description (IDL) file
    #[serde(default = "default_idl_path")]
    pub idl_path: String,

    /// Keypair file identifying the storage account
    #[serde(default = "default_storage_keypair_path")]
    pub storage_keypair_path: String,

    /// `existing` or `deploy`
    #[serde(default = "default_storage_mode")]
    pub storage_mode: String,

    #[serde(default)]
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Keypair file acting as the wallet; no wallet is injected when it is absent
    #[serde(default = "default_wallet_keypair_path")]
    pub keypair_path: String,

    /// Identities the wallet has approved for silent reconnects
    #[serde(default = "default_trust_file")]
    pub trust_file: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_wallet_keypair_path(),
            trust_file: default_trust_file(),
        }
    }
}

impl Config {
    /// Load configuration from file or environment variables
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("Could not load .env file: {}", e);
        }

        if let Some(path) = config_path {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {path}"))?;
            Self::parse(&content).with_context(|| format!("Failed to parse config file: {path}"))
        } else {
            Ok(Self::from_env())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from environment variables, falling back to defaults
    fn from_env() -> Self {
        let var = |name: &str, default: fn() -> String| std::env::var(name).unwrap_or_else(|_| default());

        Config {
            cluster: var("PORTAL_CLUSTER", default_cluster),
            commitment: var("PORTAL_COMMITMENT", default_commitment),
            idl_path: var("PORTAL_IDL_PATH", default_idl_path),
            storage_keypair_path: var("PORTAL_STORAGE_KEYPAIR", default_storage_keypair_path),
            storage_mode: var("PORTAL_STORAGE_MODE", default_storage_mode),
            wallet: WalletConfig {
                keypair_path: var("PORTAL_WALLET_KEYPAIR", default_wallet_keypair_path),
                trust_file: var("PORTAL_WALLET_TRUST_FILE", default_trust_file),
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self, fresh_storage_keypair: bool) -> Result<()> {
        self.cluster.parse::<Cluster>()?;
        parse_commitment(&self.commitment)?;
        let mode = self.storage_mode()?;

        if !expand(&self.idl_path).exists() {
            anyhow::bail!("Program interface file does not exist: {}", self.idl_path);
        }

        if fresh_storage_keypair {
            if mode != StorageMode::DeployNew {
                anyhow::bail!("A fresh storage keypair can only be generated in deploy mode");
            }
        } else if !expand(&self.storage_keypair_path).exists() {
            anyhow::bail!(
                "Storage keypair file does not exist: {}",
                self.storage_keypair_path
            );
        }

        Ok(())
    }

    pub fn storage_mode(&self) -> Result<StorageMode> {
        Ok(self.storage_mode.parse()?)
    }

    /// Resolve into the portal's configuration, loading the static assets
    pub fn portal_config(&self, fresh_storage_keypair: bool) -> Result<PortalConfig> {
        let interface = ProgramInterface::load(expand(&self.idl_path))
            .with_context(|| format!("Failed to load program interface: {}", self.idl_path))?;
        if interface.is_placeholder() {
            anyhow::bail!(
                "Program interface {} carries the placeholder address {}; supply the IDL of your deployed program",
                self.idl_path,
                interface.address
            );
        }

        let storage_path = expand(&self.storage_keypair_path);
        let keypair = if fresh_storage_keypair {
            let keypair = Keypair::new();
            write_keypair(&storage_path, &keypair)?;
            info!(
                "Generated storage keypair {} at {}",
                keypair.pubkey(),
                storage_path.display()
            );
            keypair
        } else {
            load_keypair(&storage_path)?
        };

        Ok(PortalConfig::new(
            interface.address,
            StorageConfig::new(keypair, self.storage_mode()?),
        )
        .with_cluster(self.cluster.parse()?)
        .with_commitment(parse_commitment(&self.commitment)?))
    }
}

/// Expand `~` and environment variables in a configured path
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(
        shellexpand::full(path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| path.to_string()),
    )
}

// Default values
fn default_cluster() -> String { "devnet".to_string() }
fn default_commitment() -> String { "processed".to_string() }
fn default_idl_path() -> String { "assets/idl.json".to_string() }
fn default_storage_keypair_path() -> String { "assets/storage_keypair.json".to_string() }
fn default_storage_mode() -> String { "existing".to_string() }
fn default_wallet_keypair_path() -> String { "~/.config/solana/id.json".to_string() }
fn default_trust_file() -> String { "~/.config/gif-portal/trusted".to_string() }
