//! Scripted in-memory [`ChainClient`] for tests.
//!
//! Every call is recorded so tests can assert exactly which chain
//! operations ran. Results are popped from per-operation queues; when a
//! queue is empty the configured default is returned.

use super::client::{ChainClient, ChainClientFactory, ChainError, ChainResult};
use crate::domain::entities::{TransactionRecord, TxHash};
use crate::domain::services::NetworkConfig;
use crate::domain::value_objects::{FeeEstimate, Network, Wei};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub(crate) const DEPOSIT: &str = "0x00000000000000000000000000000000000000d0";

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MockCall {
    Balance(String),
    Fee,
    Submit {
        destination: String,
        amount: Wei,
        fee: FeeEstimate,
    },
    Confirm(TxHash),
}

#[derive(Debug)]
pub(crate) struct MockChainClient {
    network: Network,
    balance: Wei,
    fee: FeeEstimate,
    balances: Mutex<VecDeque<ChainResult<Wei>>>,
    fees: Mutex<VecDeque<ChainResult<FeeEstimate>>>,
    submits: Mutex<VecDeque<ChainResult<TxHash>>>,
    confirmations: Mutex<VecDeque<ChainResult<TransactionRecord>>>,
    calls: Mutex<Vec<MockCall>>,
    balance_gate: Option<Arc<Semaphore>>,
    panic_on_balance: bool,
}

impl MockChainClient {
    pub(crate) fn new(network: Network) -> Self {
        Self {
            network,
            balance: Wei::ZERO,
            fee: FeeEstimate::plain_transfer(20_000_000_000),
            balances: Mutex::new(VecDeque::new()),
            fees: Mutex::new(VecDeque::new()),
            submits: Mutex::new(VecDeque::new()),
            confirmations: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            balance_gate: None,
            panic_on_balance: false,
        }
    }

    pub(crate) fn with_balance(mut self, balance: Wei) -> Self {
        self.balance = balance;
        self
    }

    pub(crate) fn with_fee(mut self, fee: FeeEstimate) -> Self {
        self.fee = fee;
        self
    }

    /// Every balance call waits for a permit on `gate` before answering.
    pub(crate) fn with_balance_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.balance_gate = Some(gate);
        self
    }

    pub(crate) fn panicking(mut self) -> Self {
        self.panic_on_balance = true;
        self
    }

    pub(crate) fn push_balance(self, result: ChainResult<Wei>) -> Self {
        lock(&self.balances).push_back(result);
        self
    }

    pub(crate) fn push_fee(self, result: ChainResult<FeeEstimate>) -> Self {
        lock(&self.fees).push_back(result);
        self
    }

    pub(crate) fn push_submit(self, result: ChainResult<TxHash>) -> Self {
        lock(&self.submits).push_back(result);
        self
    }

    pub(crate) fn push_confirmation(self, result: ChainResult<TransactionRecord>) -> Self {
        lock(&self.confirmations).push_back(result);
        self
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub(crate) fn submit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Submit { .. }))
            .count()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn network(&self) -> Network {
        self.network
    }

    fn deposit_address(&self) -> String {
        DEPOSIT.to_string()
    }

    #[allow(clippy::panic)]
    async fn get_balance(&self, address: &str) -> ChainResult<Wei> {
        self.record(MockCall::Balance(address.to_string()));
        if let Some(gate) = &self.balance_gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| ChainError::connection("gate closed"))?;
            permit.forget();
        }
        if self.panic_on_balance {
            panic!("mock client exploded");
        }
        lock(&self.balances)
            .pop_front()
            .unwrap_or(Ok(self.balance))
    }

    async fn get_fee_estimate(&self) -> ChainResult<FeeEstimate> {
        self.record(MockCall::Fee);
        lock(&self.fees).pop_front().unwrap_or(Ok(self.fee))
    }

    async fn submit(&self, destination: &str, amount: Wei, fee: FeeEstimate) -> ChainResult<TxHash> {
        self.record(MockCall::Submit {
            destination: destination.to_string(),
            amount,
            fee,
        });
        lock(&self.submits)
            .pop_front()
            .unwrap_or_else(|| Ok(TxHash::new(format!("0x{}", self.network))))
    }

    async fn await_confirmation(&self, tx_hash: &TxHash) -> ChainResult<TransactionRecord> {
        self.record(MockCall::Confirm(tx_hash.clone()));
        lock(&self.confirmations)
            .pop_front()
            .unwrap_or_else(|| Ok(TransactionRecord::confirmed(tx_hash.clone(), 100)))
    }
}

/// Hands out pre-built mock clients by network.
#[derive(Debug, Default)]
pub(crate) struct MockChainFactory {
    clients: HashMap<Network, Arc<MockChainClient>>,
    connects: AtomicUsize,
}

impl MockChainFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_client(mut self, client: Arc<MockChainClient>) -> Self {
        self.clients.insert(client.network(), client);
        self
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Total chain calls made across every client.
    pub(crate) fn total_calls(&self) -> usize {
        self.clients.values().map(|c| c.calls().len()).sum()
    }
}

impl ChainClientFactory for MockChainFactory {
    fn deposit_address(&self) -> String {
        DEPOSIT.to_string()
    }

    fn connect(&self, config: &NetworkConfig) -> ChainResult<Arc<dyn ChainClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.clients
            .get(&config.network)
            .cloned()
            .map(|client| client as Arc<dyn ChainClient>)
            .ok_or_else(|| ChainError::connection(format!("no mock for {}", config.network)))
    }
}
