//! Portal controller: wires the wallet session, chain client, reader and
//! submitter to the view state

use solana_sdk::signature::Signature;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::{
    sync::{broadcast, Mutex, RwLock},
    task::JoinHandle,
};
use tracing::{debug, error, info};

use crate::{
    client::{ChainClientFactory, Connector, RpcConnector},
    reader::AccountReader,
    submitter::TransactionSubmitter,
    types::{GifList, Identity},
    view::{Screen, ViewState},
    wallet::{Notifier, WalletProvider, WalletSessionAdapter},
    PortalConfig, PortalError, Result,
};

/// Clears the busy flag when an operation ends
struct OperationGuard<'a>(&'a AtomicBool);

impl<'a> OperationGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PortalError::OperationInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The GIF portal application
#[derive(Clone)]
pub struct Portal {
    config: Arc<PortalConfig>,
    sessions: WalletSessionAdapter,
    factory: ChainClientFactory,
    reader: AccountReader,
    submitter: TransactionSubmitter,
    state: Arc<RwLock<ViewState>>,
    busy: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    load_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    started: Arc<AtomicBool>,
}

impl Portal {
    pub fn new(
        config: PortalConfig,
        wallet: Option<Arc<dyn WalletProvider>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_connector(config, wallet, notifier, Arc::new(RpcConnector))
    }

    pub fn with_connector(
        config: PortalConfig,
        wallet: Option<Arc<dyn WalletProvider>>,
        notifier: Arc<dyn Notifier>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let config = Arc::new(config);
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Self {
            sessions: WalletSessionAdapter::new(wallet.clone(), notifier),
            factory: ChainClientFactory::with_connector(config.clone(), wallet, connector),
            reader: AccountReader::new(config.storage_address()),
            submitter: TransactionSubmitter::new(config.storage.clone()),
            state: Arc::new(RwLock::new(ViewState::default())),
            busy: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            load_handle: Arc::new(Mutex::new(None)),
            started: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    // ================================
    // Lifecycle
    // ================================

    /// Startup routine: runs the silent session restore once
    pub async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(PortalError::AlreadyStarted);
        }
        info!("Starting GIF portal");

        let portal = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Session restore cancelled by shutdown");
                    portal.state.write().await.restore_cancelled();
                }
                () = portal.restore_session() => {}
            }
        });

        *self.load_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Wait for the startup restore to finish
    pub async fn ready(&self) {
        if let Some(handle) = self.load_handle.lock().await.take() {
            let _ = handle.await;
        }
    }

    /// Teardown routine: cancels a pending restore
    pub async fn stop(&self) {
        info!("Stopping GIF portal");
        let _ = self.shutdown_tx.send(());
        self.ready().await;
    }

    // ================================
    // Operations
    // ================================

    async fn restore_session(&self) {
        self.state.write().await.begin_connecting();
        match self.sessions.try_restore_session().await {
            Some(identity) => self.on_identity(identity).await,
            None => self.state.write().await.connection_failed(),
        }
    }

    /// Explicit connect
    pub async fn connect(&self) -> Result<()> {
        if self.state.read().await.is_connected() {
            return Ok(());
        }

        self.state.write().await.begin_connecting();
        match self.sessions.request_session().await {
            Ok(Some(identity)) => {
                self.on_identity(identity).await;
                Ok(())
            }
            Ok(None) => {
                self.state.write().await.connection_failed();
                Ok(())
            }
            Err(e) => {
                error!("Wallet connect failed: {}", e);
                self.state.write().await.connection_failed();
                Err(e)
            }
        }
    }

    pub async fn disconnect(&self) {
        info!("Disconnecting wallet session");
        self.state.write().await.disconnect();
    }

    async fn on_identity(&self, identity: Identity) {
        if self.state.write().await.connected(identity) {
            info!("Fetching GIF list...");
            if let Err(e) = self.refresh().await {
                error!("Initial fetch failed: {}", e);
                self.state.write().await.apply_gif_list(GifList::Uninitialized);
            }
        }
    }

    /// Re-read the storage account and replace the list
    pub async fn refresh(&self) -> Result<()> {
        self.require_identity().await?;
        let client = self.factory.get_client()?;
        let gif_list = self.reader.fetch_gif_list(&client).await;
        self.state.write().await.apply_gif_list(gif_list);
        Ok(())
    }

    /// One-time creation of the storage account
    pub async fn initialize(&self) -> Result<Signature> {
        self.require_identity().await?;
        let _guard = OperationGuard::acquire(&self.busy)?;

        let client = self.factory.get_client()?;
        match self.submitter.initialize_storage_account(&client).await {
            Ok(signature) => {
                self.refresh().await?;
                Ok(signature)
            }
            Err(e) => {
                error!("Error creating BaseAccount account: {}", e);
                Err(e)
            }
        }
    }

    /// Submit the form input. Empty input makes no submission and returns `None`.
    pub async fn submit_gif(&self, input: &str) -> Result<Option<Signature>> {
        if input.trim().is_empty() {
            info!("No gif link given!");
            return Ok(None);
        }
        self.require_identity().await?;
        let _guard = OperationGuard::acquire(&self.busy)?;

        info!("Gif link: {}", input.trim());
        let client = self.factory.get_client()?;
        match self.submitter.append_gif(&client, input).await {
            Ok(signature) => {
                self.refresh().await?;
                Ok(Some(signature))
            }
            Err(e) => {
                error!("Error sending GIF: {}", e);
                Err(e)
            }
        }
    }

    async fn require_identity(&self) -> Result<()> {
        if self.state.read().await.is_connected() {
            Ok(())
        } else {
            Err(PortalError::NotConnected)
        }
    }

    // ================================
    // View
    // ================================

    /// Snapshot of the view state
    pub async fn view(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub async fn render(&self) -> Screen {
        self.state
            .read()
            .await
            .render(self.config.storage.mode(), self.config.storage_address())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
