//! GIF Portal
//!
//! Terminal front-end: connects a keypair wallet, shows the GIF list stored
//! on-chain and submits new links to it.

use anyhow::Result;
use clap::Parser;
use gif_portal::{Portal, StorageMode, WalletProvider};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    signal,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;
mod wallet;

use config::{expand, Config};
use terminal::{draw, Command, TerminalNotifier, HELP};
use wallet::KeypairWallet;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Cluster name or RPC URL, overrides the configuration
    #[arg(long)]
    cluster: Option<String>,

    /// Allow this session to create the storage account
    #[arg(long)]
    deploy_new_storage: bool,

    /// Generate a new storage keypair at the configured path
    #[arg(long, requires = "deploy_new_storage")]
    fresh_storage_keypair: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(cluster) = args.cluster {
        config.cluster = cluster;
    }
    if args.deploy_new_storage {
        config.storage_mode = "deploy".to_string();
    }
    config.validate(args.fresh_storage_keypair)?;
    let portal_config = config.portal_config(args.fresh_storage_keypair)?;

    info!(
        "Using cluster {} with program {} and storage account {}",
        portal_config.cluster,
        portal_config.program_id,
        portal_config.storage_address()
    );
    if portal_config.storage.mode() == StorageMode::DeployNew {
        info!("Storage account creation enabled for this session");
    }

    let wallet_path = expand(&config.wallet.keypair_path);
    let wallet: Option<Arc<dyn WalletProvider>> = if wallet_path.exists() {
        let wallet = KeypairWallet::load(&wallet_path, expand(&config.wallet.trust_file))?;
        Some(Arc::new(wallet))
    } else {
        warn!("No wallet keypair at {}", wallet_path.display());
        None
    };

    let portal = Portal::new(portal_config, wallet, Arc::new(TerminalNotifier));
    portal.start().await?;
    portal.ready().await;
    println!("{}", draw(&portal.render().await, portal.is_busy()));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = dispatch(&portal, command).await {
            error!("{}", e);
            println!("! {e}");
        }
        println!("{}", draw(&portal.render().await, portal.is_busy()));
    }

    portal.stop().await;
    info!("GIF portal stopped");
    Ok(())
}

async fn dispatch(portal: &Portal, command: Command) -> gif_portal::Result<()> {
    match command {
        Command::Connect => portal.connect().await?,
        Command::Initialize => {
            let signature = portal.initialize().await?;
            println!("Created a new BaseAccount w/ address: {}", portal.config().storage_address());
            println!("Signature: {signature}");
        }
        Command::Add(link) => match portal.submit_gif(&link).await? {
            Some(signature) => {
                println!("GIF successfully sent to program");
                println!("Signature: {signature}");
            }
            None => println!("Empty input. Try again."),
        },
        Command::Refresh => portal.refresh().await?,
        Command::Disconnect => portal.disconnect().await,
        Command::Help => println!("{HELP}"),
        Command::Unknown(word) => println!("Unknown command `{word}`. Type `help` for commands."),
        Command::Quit => {}
    }
    Ok(())
}
