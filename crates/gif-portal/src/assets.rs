//! Static configuration assets: the program interface description and the
//! storage account keypair file

use serde::Deserialize;
use serde_json::Value;
use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use std::{collections::BTreeMap, fs, path::Path, str::FromStr};
use tracing::debug;

use crate::{PortalError, Result};

/// Instructions the portal calls, as named in the interface description
pub const REQUIRED_INSTRUCTIONS: [&str; 2] = ["startStuffOff", "addGif"];

/// Address carried by interface files that do not point at a deployed program
pub const PLACEHOLDER_PROGRAM_ADDRESS: &str = "GifPortaProgram1111111111111111111111111111";

#[derive(Debug, Deserialize)]
struct IdlDocument {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    instructions: Vec<IdlInstruction>,
    #[serde(default)]
    metadata: Option<IdlMetadata>,
}

#[derive(Debug, Deserialize)]
struct IdlInstruction {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IdlMetadata {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Program address and name taken from the interface description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInterface {
    pub name: Option<String>,
    pub address: Pubkey,
}

impl ProgramInterface {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("Loaded program interface from {}", path.display());
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let idl: IdlDocument = serde_json::from_str(content)?;

        let address = idl
            .metadata
            .as_ref()
            .and_then(|m| m.address.clone())
            .or(idl.address)
            .ok_or_else(|| PortalError::InvalidProgramInterface("missing program address".to_string()))?;
        let address = Pubkey::from_str(&address)
            .map_err(|e| PortalError::InvalidProgramInterface(format!("bad program address {address}: {e}")))?;

        for required in REQUIRED_INSTRUCTIONS {
            let snake = to_snake_case(required);
            if !idl
                .instructions
                .iter()
                .any(|ix| ix.name == required || ix.name == snake)
            {
                return Err(PortalError::InvalidProgramInterface(format!(
                    "missing instruction {required}"
                )));
            }
        }

        Ok(Self {
            name: idl.metadata.and_then(|m| m.name).or(idl.name),
            address,
        })
    }

    /// Whether the address is the placeholder rather than a deployed program
    pub fn is_placeholder(&self) -> bool {
        self.address.to_string() == PLACEHOLDER_PROGRAM_ADDRESS
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Load a keypair file.
///
/// Accepts the CLI format (a JSON array of 64 bytes) and the web3 export format
/// (`{"_keypair": {"secretKey": ...}}` with the secret key as an array or as an
/// object keyed by index).
pub fn load_keypair(path: impl AsRef<Path>) -> Result<Keypair> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse_keypair(&content)
        .map_err(|e| PortalError::InvalidKeypair(format!("{}: {e}", path.display())))
}

pub fn parse_keypair(content: &str) -> Result<Keypair> {
    let value: Value = serde_json::from_str(content)?;

    let secret = match &value {
        Value::Array(_) => &value,
        Value::Object(map) => map
            .get("_keypair")
            .and_then(|kp| kp.get("secretKey"))
            .or_else(|| map.get("secretKey"))
            .ok_or_else(|| PortalError::InvalidKeypair("missing secretKey".to_string()))?,
        _ => return Err(PortalError::InvalidKeypair("unsupported keypair format".to_string())),
    };

    let bytes = secret_key_bytes(secret)?;
    Keypair::from_bytes(&bytes).map_err(|e| PortalError::InvalidKeypair(e.to_string()))
}

fn secret_key_bytes(secret: &Value) -> Result<Vec<u8>> {
    let bytes: Vec<u8> = match secret {
        Value::Array(items) => items.iter().map(byte).collect::<Result<_>>()?,
        Value::Object(map) => {
            let mut indexed = BTreeMap::new();
            for (key, item) in map {
                let index: usize = key
                    .parse()
                    .map_err(|_| PortalError::InvalidKeypair(format!("bad secretKey index {key}")))?;
                indexed.insert(index, byte(item)?);
            }
            if indexed.keys().copied().ne(0..indexed.len()) {
                return Err(PortalError::InvalidKeypair("secretKey indices are not contiguous".to_string()));
            }
            indexed.into_values().collect()
        }
        _ => return Err(PortalError::InvalidKeypair("secretKey must be an array or object".to_string())),
    };

    if bytes.len() != 64 {
        return Err(PortalError::InvalidKeypair(format!(
            "secretKey must be 64 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn byte(value: &Value) -> Result<u8> {
    value
        .as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| PortalError::InvalidKeypair(format!("not a byte: {value}")))
}

/// Write a keypair in CLI format. Refuses to overwrite an existing file.
pub fn write_keypair(path: impl AsRef<Path>, keypair: &Keypair) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(PortalError::InvalidConfiguration(format!(
            "refusing to overwrite keypair file {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(&keypair.to_bytes().to_vec())?;
    fs::write(path, json)?;
    Ok(())
}
