//! Keypair-file wallet standing in for the browser extension
//!
//! Trust is remembered in a plain file listing approved public keys, one per
//! line. A trusted-only connect succeeds only for listed keys; an explicit
//! connect records the key.

use async_trait::async_trait;
use gif_portal::{load_keypair, ConnectOptions, ConnectResponse, WalletError, WalletProvider};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer, transaction::Transaction};
use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

pub struct KeypairWallet {
    keypair: Keypair,
    trust_file: PathBuf,
    connected: AtomicBool,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair, trust_file: impl Into<PathBuf>) -> Self {
        Self {
            keypair,
            trust_file: trust_file.into(),
            connected: AtomicBool::new(false),
        }
    }

    pub fn load(keypair_path: &Path, trust_file: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let keypair = load_keypair(keypair_path)?;
        debug!("Loaded wallet keypair {}", keypair.pubkey());
        Ok(Self::new(keypair, trust_file))
    }

    async fn is_trusted(&self) -> bool {
        let key = self.keypair.pubkey().to_string();
        fs::read_to_string(&self.trust_file)
            .await
            .map(|content| content.lines().any(|line| line.trim() == key))
            .unwrap_or(false)
    }

    async fn record_trust(&self) -> std::io::Result<()> {
        if self.is_trusted().await {
            return Ok(());
        }
        if let Some(parent) = self.trust_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.trust_file)
            .await?;
        file.write_all(format!("{}\n", self.keypair.pubkey()).as_bytes())
            .await?;
        file.flush().await
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    fn is_phantom(&self) -> bool {
        true
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| self.keypair.pubkey())
    }

    async fn connect(&self, options: ConnectOptions) -> Result<ConnectResponse, WalletError> {
        if options.only_if_trusted {
            if !self.is_trusted().await {
                return Err(WalletError::NotTrusted);
            }
        } else {
            self.record_trust()
                .await
                .map_err(|e| WalletError::Unavailable(format!("cannot record trust: {e}")))?;
            info!("Approved portal for {}", self.keypair.pubkey());
        }

        self.connected.store(true, Ordering::SeqCst);
        Ok(ConnectResponse {
            public_key: self.keypair.pubkey(),
        })
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletError::NotConnected);
        }
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(transaction)
    }
}
