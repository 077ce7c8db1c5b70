//! Wallet provider interface and session adapter
//!
//! The wallet is an injected capability: the host supplies a [`WalletProvider`]
//! (or nothing, when no wallet is installed) and the [`WalletSessionAdapter`]
//! turns it into an [`Identity`].

use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, transaction::Transaction};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{types::Identity, Result};

/// Notice shown when no compatible wallet is available
pub const WALLET_MISSING_NOTICE: &str = "Solana wallet not found! Get a Phantom Wallet 👻";

/// Options for a connection request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Only succeed if the user approved this application before; never prompt
    pub only_if_trusted: bool,
}

impl ConnectOptions {
    pub fn trusted_only() -> Self {
        Self {
            only_if_trusted: true,
        }
    }
}

/// Successful connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    pub public_key: Pubkey,
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Application is not trusted by the wallet")]
    NotTrusted,

    #[error("User rejected the request: {0}")]
    Rejected(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Wallet unavailable: {0}")]
    Unavailable(String),
}

/// Wallet capability injected by the host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Compatibility flag of the provider
    fn is_phantom(&self) -> bool;

    /// Public key of the connected account, if any
    fn public_key(&self) -> Option<Pubkey>;

    async fn connect(&self, options: ConnectOptions) -> std::result::Result<ConnectResponse, WalletError>;

    /// Add the wallet's signature to a transaction whose blockhash is already set
    async fn sign_transaction(&self, transaction: Transaction) -> std::result::Result<Transaction, WalletError>;
}

/// User-facing notices (the browser's `alert`)
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Turns the injected wallet into a session identity
#[derive(Clone)]
pub struct WalletSessionAdapter {
    provider: Option<Arc<dyn WalletProvider>>,
    notifier: Arc<dyn Notifier>,
}

impl WalletSessionAdapter {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, notifier: Arc<dyn Notifier>) -> Self {
        Self { provider, notifier }
    }

    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    /// Silently restore a previously trusted session. Never prompts.
    pub async fn try_restore_session(&self) -> Option<Identity> {
        let provider = match &self.provider {
            Some(provider) if provider.is_phantom() => provider,
            _ => {
                self.notifier.alert(WALLET_MISSING_NOTICE);
                return None;
            }
        };

        debug!("Compatible wallet found, attempting trusted connect");
        match provider.connect(ConnectOptions::trusted_only()).await {
            Ok(response) => {
                info!("Connected with Public Key: {}", response.public_key);
                Some(Identity::from(response.public_key))
            }
            Err(WalletError::NotTrusted) => {
                debug!("Wallet present but application not trusted yet");
                None
            }
            Err(e) => {
                warn!("Trusted connect failed: {}", e);
                None
            }
        }
    }

    /// Explicit, user-initiated connect. Prompts the wallet.
    ///
    /// Returns `Ok(None)` when no compatible wallet is injected; rejection is
    /// returned as an error.
    pub async fn request_session(&self) -> Result<Option<Identity>> {
        let provider = match &self.provider {
            Some(provider) if provider.is_phantom() => provider,
            Some(_) => {
                warn!("Connect requested but the injected wallet is not compatible");
                self.notifier.alert(WALLET_MISSING_NOTICE);
                return Ok(None);
            }
            None => {
                warn!("Connect requested but no wallet is injected");
                return Ok(None);
            }
        };

        let response = provider.connect(ConnectOptions::default()).await?;
        info!("Connected with Public Key: {}", response.public_key);
        Ok(Some(Identity::from(response.public_key)))
    }
}
