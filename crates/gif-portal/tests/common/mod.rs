//! Test doubles: an in-memory ledger running the portal program, a keypair
//! wallet and a recording notifier

#![allow(dead_code)]

use async_trait::async_trait;
use gif_portal::{
    program::{decode_base_account, encode_base_account, PortalInstruction},
    types::BaseAccount,
    ChainRpc, ConnectOptions, ConnectResponse, Connector, Notifier, Portal, PortalConfig,
    PortalError, Result, StorageConfig, StorageMode, WalletError, WalletProvider,
};
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

fn rpc_error(message: &str) -> PortalError {
    PortalError::from(ClientError::from(ClientErrorKind::Custom(message.to_string())))
}

/// In-memory ledger executing the two portal instructions
pub struct FakeLedger {
    program_id: Pubkey,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    pub reads: AtomicUsize,
    pub sends: AtomicUsize,
    pub fail_next_send: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl FakeLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: Mutex::new(HashMap::new()),
            reads: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            fail_next_send: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn stored(&self, address: &Pubkey) -> Option<BaseAccount> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .get(address)
            .map(|account| decode_base_account(&account.data).unwrap())
    }

    fn execute(&self, tx: &Transaction) -> Result<()> {
        tx.verify().map_err(|e| rpc_error(&e.to_string()))?;
        let keys = &tx.message.account_keys;
        let mut accounts = self.accounts.lock().unwrap();

        for ix in &tx.message.instructions {
            if keys[ix.program_id_index as usize] != self.program_id {
                return Err(rpc_error("unexpected program"));
            }
            let base = keys[ix.accounts[0] as usize];
            let user = keys[ix.accounts[1] as usize];

            match PortalInstruction::unpack(&ix.data)? {
                PortalInstruction::StartStuffOff => {
                    if !tx.message.is_signer(ix.accounts[0] as usize) {
                        return Err(rpc_error("base account must sign"));
                    }
                    if accounts.contains_key(&base) {
                        return Err(rpc_error("account already in use"));
                    }
                    accounts.insert(
                        base,
                        Account {
                            lamports: 63_530_880,
                            data: encode_base_account(&BaseAccount::default())?,
                            owner: self.program_id,
                            executable: false,
                            rent_epoch: 0,
                        },
                    );
                }
                PortalInstruction::AddGif { gif_link } => {
                    let account = accounts
                        .get_mut(&base)
                        .ok_or_else(|| rpc_error("AccountNotInitialized"))?;
                    let mut state = decode_base_account(&account.data)?;
                    state.push(gif_link, &user);
                    account.data = encode_base_account(&state)?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for FakeLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(rpc_error("connection refused"));
        }
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(rpc_error("blockhash not found"));
        }
        self.execute(transaction)?;
        Ok(transaction.signatures[0])
    }
}

/// Hands out the shared ledger and counts connections
pub struct LedgerConnector {
    pub ledger: Arc<FakeLedger>,
    pub connects: AtomicUsize,
}

impl Connector for LedgerConnector {
    fn connect(&self, _url: &str, _commitment: CommitmentConfig) -> Arc<dyn ChainRpc> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.ledger.clone()
    }
}

/// Keypair-backed wallet with a trust flag
pub struct FakeWallet {
    keypair: Keypair,
    phantom: bool,
    pub trusted: AtomicBool,
    pub approve: AtomicBool,
    /// Connection requests never resolve
    pub hang: AtomicBool,
    connected: AtomicBool,
}

impl FakeWallet {
    pub fn new(trusted: bool) -> Self {
        Self {
            keypair: Keypair::new(),
            phantom: true,
            trusted: AtomicBool::new(trusted),
            approve: AtomicBool::new(true),
            hang: AtomicBool::new(false),
            connected: AtomicBool::new(false),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    fn is_phantom(&self) -> bool {
        self.phantom
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| self.keypair.pubkey())
    }

    async fn connect(&self, options: ConnectOptions) -> std::result::Result<ConnectResponse, WalletError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if options.only_if_trusted {
            if !self.trusted.load(Ordering::SeqCst) {
                return Err(WalletError::NotTrusted);
            }
        } else if !self.approve.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        self.trusted.store(true, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
        Ok(ConnectResponse {
            public_key: self.keypair.pubkey(),
        })
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> std::result::Result<Transaction, WalletError> {
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

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

pub struct TestContext {
    pub portal: Portal,
    pub ledger: Arc<FakeLedger>,
    pub connector: Arc<LedgerConnector>,
    pub wallet: Option<Arc<FakeWallet>>,
    pub notifier: Arc<RecordingNotifier>,
    pub storage_address: Pubkey,
}

impl TestContext {
    pub fn new(wallet: Option<FakeWallet>, mode: StorageMode) -> Self {
        let program_id = Pubkey::new_unique();
        let storage = StorageConfig::new(Keypair::new(), mode);
        let storage_address = storage.address();
        let config = PortalConfig::new(program_id, storage);

        let ledger = Arc::new(FakeLedger::new(program_id));
        let connector = Arc::new(LedgerConnector {
            ledger: ledger.clone(),
            connects: AtomicUsize::new(0),
        });
        let wallet = wallet.map(Arc::new);
        let notifier = Arc::new(RecordingNotifier::default());

        let portal = Portal::with_connector(
            config,
            wallet.clone().map(|w| w as Arc<dyn WalletProvider>),
            notifier.clone(),
            connector.clone(),
        );

        Self {
            portal,
            ledger,
            connector,
            wallet,
            notifier,
            storage_address,
        }
    }

    /// Portal with a trusted wallet, started and restored
    pub async fn connected(mode: StorageMode) -> Self {
        let ctx = Self::new(Some(FakeWallet::new(true)), mode);
        ctx.portal.start().await.unwrap();
        ctx.portal.ready().await;
        ctx
    }

    pub fn sends(&self) -> usize {
        self.ledger.sends.load(Ordering::SeqCst)
    }
}
