//! An in-memory node for exercising the benchmark without a chain.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, TxHash};
use alloy::transports::TransportErrorKind;
use async_trait::async_trait;

use crate::rpc::{SharedVerifierRpc, VerifierRpc, VerifierRpcError, VerifierRpcResult};
use crate::tx_factory::SignedVerification;

pub const SYNTHETIC_CHAIN_ID: u64 = 1337;

pub const SYNTHETIC_CONTRACT: Address = Address::repeat_byte(0xc0);

pub const SYNTHETIC_DEPLOYER: Address = Address::repeat_byte(0xde);

/// Acknowledges raw transactions after a configurable delay and records everything it receives.
#[derive(Default)]
pub struct SyntheticRpc {
    ack_delay: Duration,
    delays: HashMap<Bytes, Duration>,
    rejected: HashSet<Bytes>,
    stalled: HashSet<Bytes>,
    gas_estimate: Option<u64>,
    deployments: Mutex<Vec<Bytes>>,
    transactions: Mutex<Vec<(Address, Bytes)>>,
    submissions: Mutex<Vec<Bytes>>,
}

impl SyntheticRpc {
    pub fn new(ack_delay: Duration) -> Self {
        Self { ack_delay, gas_estimate: Some(1_000_000), ..Default::default() }
    }

    pub fn with_delay_for(mut self, raw: &Bytes, delay: Duration) -> Self {
        self.delays.insert(raw.clone(), delay);
        self
    }

    pub fn rejecting(mut self, raw: &Bytes) -> Self {
        self.rejected.insert(raw.clone());
        self
    }

    /// Never acknowledges `raw`.
    pub fn stalling(mut self, raw: &Bytes) -> Self {
        self.stalled.insert(raw.clone());
        self
    }

    pub fn with_gas_estimate(mut self, gas_estimate: Option<u64>) -> Self {
        self.gas_estimate = gas_estimate;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn deployments(&self) -> Vec<Bytes> {
        self.deployments.lock().expect("Lock poisoned.").clone()
    }

    /// Calls sent from the deployer, excluding deployments.
    pub fn transactions(&self) -> Vec<(Address, Bytes)> {
        self.transactions.lock().expect("Lock poisoned.").clone()
    }

    /// Raw transactions in the order they were received.
    pub fn submissions(&self) -> Vec<Bytes> {
        self.submissions.lock().expect("Lock poisoned.").clone()
    }
}

#[async_trait]
impl VerifierRpc for SyntheticRpc {
    fn deployer(&self) -> Address {
        SYNTHETIC_DEPLOYER
    }

    async fn chain_id(&self) -> VerifierRpcResult<u64> {
        Ok(SYNTHETIC_CHAIN_ID)
    }

    async fn deploy(&self, deploy_code: Bytes) -> VerifierRpcResult<Address> {
        self.deployments.lock().expect("Lock poisoned.").push(deploy_code);
        Ok(SYNTHETIC_CONTRACT)
    }

    async fn transact(&self, to: Address, input: Bytes) -> VerifierRpcResult<TxHash> {
        let tx_hash = keccak256(&input);
        self.transactions.lock().expect("Lock poisoned.").push((to, input));
        Ok(tx_hash)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> VerifierRpcResult<TxHash> {
        self.submissions.lock().expect("Lock poisoned.").push(raw.clone());
        if self.stalled.contains(&raw) {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.delays.get(&raw).copied().unwrap_or(self.ack_delay)).await;
        if self.rejected.contains(&raw) {
            return Err(VerifierRpcError::Transport(TransportErrorKind::custom_str(
                "nonce too low",
            )));
        }
        Ok(keccak256(&raw))
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> VerifierRpcResult<Option<bool>> {
        let submitted = self
            .submissions
            .lock()
            .expect("Lock poisoned.")
            .iter()
            .any(|raw| keccak256(raw) == tx_hash);
        Ok(submitted.then_some(true))
    }

    async fn estimate_gas(
        &self,
        _from: Address,
        _to: Address,
        _input: Bytes,
    ) -> VerifierRpcResult<u64> {
        self.gas_estimate.ok_or_else(|| {
            VerifierRpcError::Transport(TransportErrorKind::custom_str("execution reverted"))
        })
    }
}

/// Coerces a synthetic node into the handle the benchmark consumes.
pub fn shared_rpc(rpc: &Arc<SyntheticRpc>) -> SharedVerifierRpc {
    rpc.clone()
}

/// Distinct unsigned placeholders; enough for exercising the broadcaster.
pub fn placeholder_transactions(n_transactions: usize) -> Vec<SignedVerification> {
    (0..n_transactions)
        .map(|index| {
            let raw = Bytes::from(index.to_be_bytes().to_vec());
            SignedVerification {
                sender: Address::left_padding_from(&index.to_be_bytes()),
                tx_hash: keccak256(&raw),
                raw,
            }
        })
        .collect()
}
