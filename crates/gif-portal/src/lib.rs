//! GIF Portal
//!
//! Client for the GIF portal program: connects a wallet, reads the GIF list
//! stored in a single on-chain account and appends new links to it.

// ================================
// Module Declarations
// ================================

pub mod core;
pub mod types;

// Static assets: program interface description and keypair files
pub mod assets;

// Wallet capability and session adapter
pub mod wallet;

// Chain client factory and RPC seam
pub mod client;

// Program encoding, reads and submissions
pub mod program;
pub mod reader;
pub mod submitter;

// View state and the application controller
pub mod view;
pub mod app;

// ================================
// Public API Re-exports
// ================================

// Configuration and errors
pub use self::core::{
    parse_commitment, Cluster, PortalConfig, PortalError, Result, StorageConfig, StorageMode,
};

pub use assets::{load_keypair, write_keypair, ProgramInterface};
pub use wallet::{
    ConnectOptions, ConnectResponse, LogNotifier, Notifier, WalletError, WalletProvider,
    WalletSessionAdapter,
};
pub use client::{ChainClient, ChainClientFactory, ChainRpc, Connector, RpcConnector};
pub use program::GifPortalProgram;
pub use reader::{fetch_gif_list, AccountReader};
pub use submitter::TransactionSubmitter;
pub use view::{Body, Phase, Screen, ViewState};
pub use app::Portal;

// Common types
pub use types::{GifEntry, GifList, Identity};
