//! Transaction construction and submission for the two portal operations

use solana_sdk::{
    instruction::Instruction,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::{debug, info};

use crate::{
    client::ChainClient, PortalError, Result, StorageConfig, StorageMode,
};

/// Submits `startStuffOff` and `addGif`
#[derive(Debug, Clone)]
pub struct TransactionSubmitter {
    storage: StorageConfig,
}

impl TransactionSubmitter {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    /// Create the storage account. Single-shot: fails once the account exists.
    pub async fn initialize_storage_account(&self, client: &ChainClient) -> Result<Signature> {
        if self.storage.mode() == StorageMode::UseExisting {
            return Err(PortalError::InitializeDisabled);
        }

        let address = self.storage.address();
        if client.rpc().get_account(&address).await?.is_some() {
            return Err(PortalError::StorageAlreadyInitialized(address));
        }

        let user = client.payer()?;
        let instruction = client.program().start_stuff_off(address, user)?;
        let signature = submit(client, instruction, Some(self.storage.keypair())).await?;

        info!("Created a new BaseAccount w/ address: {}", address);
        Ok(signature)
    }

    /// Append a GIF link to the storage account
    pub async fn append_gif(&self, client: &ChainClient, gif_link: &str) -> Result<Signature> {
        let gif_link = gif_link.trim();
        if gif_link.is_empty() {
            return Err(PortalError::EmptyGifLink);
        }

        let user = client.payer()?;
        let instruction = client
            .program()
            .add_gif(self.storage.address(), user, gif_link)?;
        let signature = submit(client, instruction, None).await?;

        info!("GIF successfully sent to program: {}", gif_link);
        Ok(signature)
    }
}

/// Build, co-sign, wallet-sign and send a single-instruction transaction
async fn submit(
    client: &ChainClient,
    instruction: Instruction,
    co_signer: Option<&Keypair>,
) -> Result<Signature> {
    let payer = client.payer()?;
    let recent_blockhash = client.rpc().latest_blockhash().await?;

    let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer));
    transaction.message.recent_blockhash = recent_blockhash;

    if let Some(keypair) = co_signer {
        debug!("Co-signing with {}", keypair.pubkey());
        transaction.try_partial_sign(&[keypair], recent_blockhash)?;
    }

    let transaction = client.wallet().sign_transaction(transaction).await?;
    if !transaction.is_signed() {
        return Err(PortalError::Signing(
            "transaction is missing required signatures".to_string(),
        ));
    }

    let signature = client.rpc().send_and_confirm(&transaction).await?;
    debug!("Transaction confirmed: {}", signature);
    Ok(signature)
}
