//! Instruction and account encoding for the GIF portal program

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{types::BaseAccount, PortalError, Result};

pub const START_STUFF_OFF: &str = "start_stuff_off";
pub const ADD_GIF: &str = "add_gif";
pub const BASE_ACCOUNT: &str = "BaseAccount";

/// Space the program allocates for the storage account
pub const BASE_ACCOUNT_SPACE: usize = 9000;

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

/// Discriminator prefixed to instruction data
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

/// Discriminator prefixed to account data
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

/// Instructions exposed by the program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalInstruction {
    StartStuffOff,
    AddGif { gif_link: String },
}

impl PortalInstruction {
    pub fn pack(&self) -> Result<Vec<u8>> {
        match self {
            PortalInstruction::StartStuffOff => Ok(instruction_discriminator(START_STUFF_OFF).to_vec()),
            PortalInstruction::AddGif { gif_link } => {
                let mut data = instruction_discriminator(ADD_GIF).to_vec();
                gif_link
                    .serialize(&mut data)
                    .map_err(|e| PortalError::InvalidAccountData(e.to_string()))?;
                Ok(data)
            }
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < 8 {
            return Err(PortalError::InvalidAccountData(
                "instruction data shorter than discriminator".to_string(),
            ));
        }
        let (tag, mut rest) = data.split_at(8);

        if tag == instruction_discriminator(START_STUFF_OFF) {
            Ok(PortalInstruction::StartStuffOff)
        } else if tag == instruction_discriminator(ADD_GIF) {
            let gif_link = String::deserialize(&mut rest)
                .map_err(|e| PortalError::InvalidAccountData(e.to_string()))?;
            Ok(PortalInstruction::AddGif { gif_link })
        } else {
            Err(PortalError::InvalidAccountData("unknown instruction".to_string()))
        }
    }
}

/// Instruction builders bound to a deployed program
#[derive(Debug, Clone, Copy)]
pub struct GifPortalProgram {
    program_id: Pubkey,
}

impl GifPortalProgram {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Allocate and initialize the storage account
    pub fn start_stuff_off(&self, base_account: Pubkey, user: Pubkey) -> Result<Instruction> {
        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(base_account, true),
                AccountMeta::new(user, true),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: PortalInstruction::StartStuffOff.pack()?,
        })
    }

    /// Append a GIF link to the storage account
    pub fn add_gif(&self, base_account: Pubkey, user: Pubkey, gif_link: &str) -> Result<Instruction> {
        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(base_account, false),
                AccountMeta::new(user, true),
            ],
            data: PortalInstruction::AddGif {
                gif_link: gif_link.to_string(),
            }
            .pack()?,
        })
    }
}

/// Decode storage account data; bytes past the encoded body are allocation padding
pub fn decode_base_account(data: &[u8]) -> Result<BaseAccount> {
    if data.len() < 8 {
        return Err(PortalError::InvalidAccountData(
            "account data shorter than discriminator".to_string(),
        ));
    }
    let (tag, mut body) = data.split_at(8);
    if tag != account_discriminator(BASE_ACCOUNT) {
        return Err(PortalError::InvalidAccountData(
            "account discriminator mismatch".to_string(),
        ));
    }

    BaseAccount::deserialize(&mut body).map_err(|e| PortalError::InvalidAccountData(e.to_string()))
}

/// Encode storage account data, padded to the allocated space
pub fn encode_base_account(account: &BaseAccount) -> Result<Vec<u8>> {
    let mut data = account_discriminator(BASE_ACCOUNT).to_vec();
    account
        .serialize(&mut data)
        .map_err(|e| PortalError::InvalidAccountData(e.to_string()))?;
    if data.len() < BASE_ACCOUNT_SPACE {
        data.resize(BASE_ACCOUNT_SPACE, 0);
    }
    Ok(data)
}
