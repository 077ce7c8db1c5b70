//! Common types for the GIF portal

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{fmt, str::FromStr};

use crate::{PortalError, Result};

/// Textual public key of the connected wallet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the identity back into a public key
    pub fn to_pubkey(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.0)
            .map_err(|e| PortalError::InvalidConfiguration(format!("invalid identity {}: {e}", self.0)))
    }
}

impl From<Pubkey> for Identity {
    fn from(pubkey: Pubkey) -> Self {
        Self(pubkey.to_string())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored GIF record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GifEntry {
    pub gif_link: String,
    pub user_address: Pubkey,
}

/// GIF list as last read from the storage account
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GifList {
    /// Not fetched yet, or the storage account could not be read
    #[default]
    Uninitialized,
    /// Fetched; may be empty
    Loaded(Vec<GifEntry>),
}

impl GifList {
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, GifList::Uninitialized)
    }

    pub fn entries(&self) -> Option<&[GifEntry]> {
        match self {
            GifList::Uninitialized => None,
            GifList::Loaded(entries) => Some(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().map_or(0, <[GifEntry]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ================================
// On-chain layout
// ================================

/// Item as serialized inside the storage account
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StoredGif {
    pub gif_link: String,
    pub user_address: [u8; 32],
}

/// Storage account body (after the 8-byte discriminator)
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BaseAccount {
    pub total_gifs: u64,
    pub gif_list: Vec<StoredGif>,
}

impl BaseAccount {
    /// Entries in append order
    pub fn entries(&self) -> Vec<GifEntry> {
        self.gif_list
            .iter()
            .map(|item| GifEntry {
                gif_link: item.gif_link.clone(),
                user_address: Pubkey::new_from_array(item.user_address),
            })
            .collect()
    }

    /// Append a record the way the program does
    pub fn push(&mut self, gif_link: String, user: &Pubkey) {
        self.gif_list.push(StoredGif {
            gif_link,
            user_address: user.to_bytes(),
        });
        self.total_gifs += 1;
    }
}
