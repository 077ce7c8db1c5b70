//! Core portal types: configuration and error handling

use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;

use crate::wallet::WalletError;

// ================================
// Configuration Types
// ================================

/// Cluster the portal talks to, resolved to a JSON-RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    Mainnet,
    Localnet,
    Custom(String),
}

impl Cluster {
    /// RPC URL for this cluster
    pub fn url(&self) -> &str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
            Cluster::Custom(url) => url,
        }
    }
}

impl FromStr for Cluster {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" | "d" => Ok(Cluster::Devnet),
            "testnet" | "t" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" | "m" => Ok(Cluster::Mainnet),
            "localnet" | "localhost" | "l" => Ok(Cluster::Localnet),
            _ if s.starts_with("http://") || s.starts_with("https://") => {
                Ok(Cluster::Custom(s.to_string()))
            }
            _ => Err(PortalError::InvalidConfiguration(format!(
                "unknown cluster: {s}"
            ))),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::Devnet => write!(f, "devnet"),
            Cluster::Testnet => write!(f, "testnet"),
            Cluster::Mainnet => write!(f, "mainnet"),
            Cluster::Localnet => write!(f, "localnet"),
            Cluster::Custom(url) => write!(f, "{url}"),
        }
    }
}

/// Parse a commitment level name
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig> {
    match level.to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(PortalError::InvalidConfiguration(format!(
            "unknown commitment level: {other}"
        ))),
    }
}

/// Whether this deployment may create the storage account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// The storage account was provisioned earlier; initialization is refused
    #[default]
    UseExisting,
    /// This session may create the storage account from the configured keypair
    DeployNew,
}

impl FromStr for StorageMode {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "existing" | "use-existing" => Ok(StorageMode::UseExisting),
            "deploy" | "deploy-new" => Ok(StorageMode::DeployNew),
            other => Err(PortalError::InvalidConfiguration(format!(
                "unknown storage mode: {other}"
            ))),
        }
    }
}

/// The storage account keypair and how it may be used
#[derive(Debug, Clone)]
pub struct StorageConfig {
    keypair: Arc<Keypair>,
    mode: StorageMode,
}

impl StorageConfig {
    pub fn new(keypair: Keypair, mode: StorageMode) -> Self {
        Self {
            keypair: Arc::new(keypair),
            mode,
        }
    }

    /// Address of the storage account
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Keypair co-signing the account creation
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }
}

/// Portal configuration, fixed for the lifetime of the application
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Cluster serving reads and writes
    pub cluster: Cluster,

    /// Commitment level for reads, preflight and confirmation
    pub commitment: CommitmentConfig,

    /// Address of the GIF portal program
    pub program_id: Pubkey,

    /// Storage account holding the GIF list
    pub storage: StorageConfig,
}

impl PortalConfig {
    /// Configuration on devnet at `processed` commitment
    pub fn new(program_id: Pubkey, storage: StorageConfig) -> Self {
        Self {
            cluster: Cluster::Devnet,
            commitment: CommitmentConfig::processed(),
            program_id,
            storage,
        }
    }

    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn storage_address(&self) -> Pubkey {
        self.storage.address()
    }
}

// ================================
// Error Types
// ================================

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("RPC error: {0}")]
    Rpc(Box<solana_client::client_error::ClientError>),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("No wallet provider injected")]
    WalletNotInjected,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("Account {account} is owned by {owner}, expected {expected}")]
    InvalidAccountOwner {
        account: Pubkey,
        owner: Pubkey,
        expected: Pubkey,
    },

    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Storage account already initialized: {0}")]
    StorageAlreadyInitialized(Pubkey),

    #[error("Storage account initialization is disabled for existing storage")]
    InitializeDisabled,

    #[error("No gif link given")]
    EmptyGifLink,

    #[error("Another operation is in progress")]
    OperationInProgress,

    #[error("Portal is already started")]
    AlreadyStarted,

    #[error("Invalid program interface: {0}")]
    InvalidProgramInterface(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<solana_client::client_error::ClientError> for PortalError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Self::Rpc(Box::new(err))
    }
}

impl From<solana_sdk::signer::SignerError> for PortalError {
    fn from(err: solana_sdk::signer::SignerError) -> Self {
        Self::Signing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_urls() {
        assert_eq!(Cluster::Devnet.url(), "https://api.devnet.solana.com");
        assert_eq!(
            "mainnet-beta".parse::<Cluster>().unwrap().url(),
            "https://api.mainnet-beta.solana.com"
        );
        assert_eq!("localnet".parse::<Cluster>().unwrap().url(), "http://127.0.0.1:8899");

        assert_eq!(Cluster::default(), Cluster::Devnet);

        let custom: Cluster = "http://10.0.0.5:8899".parse().unwrap();
        assert_eq!(custom.url(), "http://10.0.0.5:8899");
        assert!("moonnet".parse::<Cluster>().is_err());
    }

    #[test]
    fn test_commitment_parsing() {
        assert_eq!(parse_commitment("processed").unwrap(), CommitmentConfig::processed());
        assert_eq!(parse_commitment("Finalized").unwrap(), CommitmentConfig::finalized());
        assert!(parse_commitment("eventually").is_err());
    }

    #[test]
    fn test_portal_config_defaults() {
        let storage = StorageConfig::new(Keypair::new(), StorageMode::DeployNew);
        let address = storage.address();
        let config = PortalConfig::new(Pubkey::new_unique(), storage);

        assert_eq!(config.cluster, Cluster::Devnet);
        assert_eq!(config.commitment, CommitmentConfig::processed());
        assert_eq!(config.storage_address(), address);
        assert_eq!(config.storage.mode(), StorageMode::DeployNew);
    }

    #[test]
    fn test_storage_mode_parsing() {
        assert_eq!("existing".parse::<StorageMode>().unwrap(), StorageMode::UseExisting);
        assert_eq!("deploy".parse::<StorageMode>().unwrap(), StorageMode::DeployNew);
        assert!("sometimes".parse::<StorageMode>().is_err());
    }
}
