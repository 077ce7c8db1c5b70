//! Chain client factory

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    program::GifPortalProgram, wallet::WalletProvider, PortalConfig, PortalError, Result,
};

/// RPC operations the portal needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Fetch an account; `None` when it does not exist
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    async fn latest_blockhash(&self) -> Result<Hash>;

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature>;
}

/// [`ChainRpc`] over the nonblocking JSON-RPC client
pub struct RpcChain {
    rpc: RpcClient,
}

impl RpcChain {
    pub fn new(url: String, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(url, commitment),
        }
    }
}

#[async_trait]
impl ChainRpc for RpcChain {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        Ok(response.value)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        Ok(self.rpc.send_and_confirm_transaction(transaction).await?)
    }
}

/// Opens connections to an endpoint
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str, commitment: CommitmentConfig) -> Arc<dyn ChainRpc>;
}

/// Connector producing [`RpcChain`] connections
#[derive(Debug, Default, Clone, Copy)]
pub struct RpcConnector;

impl Connector for RpcConnector {
    fn connect(&self, url: &str, commitment: CommitmentConfig) -> Arc<dyn ChainRpc> {
        Arc::new(RpcChain::new(url.to_string(), commitment))
    }
}

/// Connection plus wallet signer plus confirmation policy
#[derive(Clone)]
pub struct ChainClient {
    rpc: Arc<dyn ChainRpc>,
    wallet: Arc<dyn WalletProvider>,
    commitment: CommitmentConfig,
    program: GifPortalProgram,
}

impl ChainClient {
    pub fn rpc(&self) -> &Arc<dyn ChainRpc> {
        &self.rpc
    }

    pub fn wallet(&self) -> &Arc<dyn WalletProvider> {
        &self.wallet
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    pub fn program(&self) -> &GifPortalProgram {
        &self.program
    }

    /// Public key of the connected wallet, paying for and signing submissions
    pub fn payer(&self) -> Result<Pubkey> {
        self.wallet.public_key().ok_or(PortalError::NotConnected)
    }
}

/// Builds a fresh [`ChainClient`] per call
#[derive(Clone)]
pub struct ChainClientFactory {
    config: Arc<PortalConfig>,
    wallet: Option<Arc<dyn WalletProvider>>,
    connector: Arc<dyn Connector>,
}

impl ChainClientFactory {
    pub fn new(config: Arc<PortalConfig>, wallet: Option<Arc<dyn WalletProvider>>) -> Self {
        Self::with_connector(config, wallet, Arc::new(RpcConnector))
    }

    pub fn with_connector(
        config: Arc<PortalConfig>,
        wallet: Option<Arc<dyn WalletProvider>>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config,
            wallet,
            connector,
        }
    }

    pub fn get_client(&self) -> Result<ChainClient> {
        let wallet = self.wallet.clone().ok_or(PortalError::WalletNotInjected)?;

        debug!(
            "Connecting to {} at {:?} commitment",
            self.config.cluster, self.config.commitment.commitment
        );
        let rpc = self
            .connector
            .connect(self.config.cluster.url(), self.config.commitment);

        Ok(ChainClient {
            rpc,
            wallet,
            commitment: self.config.commitment,
            program: GifPortalProgram::new(self.config.program_id),
        })
    }
}
