//! Storage account reads

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use crate::{
    client::ChainClient,
    program::decode_base_account,
    types::{BaseAccount, GifList},
    PortalError, Result,
};

/// Reads the GIF list from the configured storage account
#[derive(Debug, Clone, Copy)]
pub struct AccountReader {
    storage_address: Pubkey,
}

impl AccountReader {
    pub fn new(storage_address: Pubkey) -> Self {
        Self { storage_address }
    }

    pub fn storage_address(&self) -> Pubkey {
        self.storage_address
    }

    pub async fn fetch_gif_list(&self, client: &ChainClient) -> GifList {
        fetch_gif_list(client, &self.storage_address).await
    }
}

/// Fetch and decode the storage account. Any failure yields [`GifList::Uninitialized`].
pub async fn fetch_gif_list(client: &ChainClient, storage_address: &Pubkey) -> GifList {
    match fetch_base_account(client, storage_address).await {
        Ok(account) => {
            info!(
                "Got the account {} with {} gifs",
                storage_address, account.total_gifs
            );
            GifList::Loaded(account.entries())
        }
        Err(PortalError::AccountNotFound(address)) => {
            debug!("Storage account {} does not exist yet", address);
            GifList::Uninitialized
        }
        Err(e) => {
            warn!("Error fetching gif list: {}", e);
            GifList::Uninitialized
        }
    }
}

/// Fetch and decode the storage account, surfacing failures
pub async fn fetch_base_account(client: &ChainClient, storage_address: &Pubkey) -> Result<BaseAccount> {
    let account = client
        .rpc()
        .get_account(storage_address)
        .await?
        .ok_or(PortalError::AccountNotFound(*storage_address))?;

    let expected = client.program().program_id();
    if account.owner != expected {
        return Err(PortalError::InvalidAccountOwner {
            account: *storage_address,
            owner: account.owner,
            expected,
        });
    }

    decode_base_account(&account.data)
}
