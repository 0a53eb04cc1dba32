use std::fmt::{self, Display};

use alloy::primitives::{Address, Bytes};
use cplink_artifacts::batch::BatchSize;
use cplink_artifacts::inputs::VerifierInputs;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::broadcaster::{BroadcastOutcome, Broadcaster};
use crate::config::BenchConfig;
use crate::contract::{deploy_code, init_calldata, verify_calldata};
use crate::errors::{BenchResult, GasEstimationError};
use crate::rpc::SharedVerifierRpc;
use crate::tx_factory::{IdentitySource, TxFactory, VerificationCall};

#[cfg(test)]
#[path = "bench_test.rs"]
mod bench_test;

/// Result of benchmarking one batch size.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BenchReport {
    pub batch_size: BatchSize,
    pub contract: Address,
    pub submitted: usize,
    pub accepted: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
    pub tps: f64,
    pub failure_rate: f64,
    /// Gas of a single verify call; absent when the node could not estimate it.
    pub gas_estimate: Option<u64>,
    /// Accepted transactions with a successful receipt, when receipts were audited.
    pub confirmed: Option<usize>,
}

impl BenchReport {
    fn new(
        batch_size: BatchSize,
        contract: Address,
        outcome: &BroadcastOutcome,
        gas_estimate: Option<u64>,
        confirmed: Option<usize>,
    ) -> Self {
        Self {
            batch_size,
            contract,
            submitted: outcome.submissions.len(),
            accepted: outcome.n_accepted(),
            failed: outcome.n_failed(),
            elapsed_seconds: outcome.elapsed.as_secs_f64(),
            tps: outcome.tps(),
            failure_rate: outcome.failure_rate(),
            gas_estimate,
            confirmed,
        }
    }
}

impl Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Size: {}", self.batch_size)?;
        writeln!(f, "TPS: {:.2}", self.tps)?;
        match self.gas_estimate {
            Some(gas) => writeln!(f, "Gas: {gas}")?,
            None => writeln!(f, "Gas: unavailable")?,
        }
        write!(
            f,
            "Accepted: {}/{} ({:.2}% failed) in {:.3}s",
            self.accepted,
            self.submitted,
            self.failure_rate * 100.0,
            self.elapsed_seconds
        )?;
        if let Some(confirmed) = self.confirmed {
            write!(f, "\nConfirmed: {confirmed}/{}", self.accepted)?;
        }
        Ok(())
    }
}

/// Deploys a verifier per batch size and measures how fast the node accepts verify calls to it.
pub struct VerifierBench {
    rpc: SharedVerifierRpc,
    config: BenchConfig,
    inputs: VerifierInputs,
    bytecode: Bytes,
}

impl VerifierBench {
    pub fn new(
        rpc: SharedVerifierRpc,
        config: BenchConfig,
        inputs: VerifierInputs,
        bytecode: Bytes,
    ) -> Self {
        Self { rpc, config, inputs, bytecode }
    }

    /// Runs every configured batch size in order, each against a freshly deployed contract.
    pub async fn sweep(&self) -> BenchResult<Vec<BenchReport>> {
        let chain_id = self.chain_id().await?;
        let mut reports = Vec::with_capacity(self.config.batch_sizes.len());
        for &batch_size in &self.config.batch_sizes {
            let report = self.run_on_chain(batch_size, chain_id).await?;
            println!("{report}");
            reports.push(report);
        }
        Ok(reports)
    }

    pub async fn run(&self, batch_size: BatchSize) -> BenchResult<BenchReport> {
        let chain_id = self.chain_id().await?;
        self.run_on_chain(batch_size, chain_id).await
    }

    /// Deploys the verifier for `batch_size` and, if configured, initializes it.
    pub async fn deploy(&self, batch_size: BatchSize) -> BenchResult<Address> {
        let code = deploy_code(&self.bytecode, self.inputs.constructor_args(batch_size));
        let contract = self.rpc.deploy(code).await?;
        info!(
            "Deployed {} verifier for batch size {batch_size} at {contract}.",
            self.inputs.variant()
        );
        if self.config.call_init {
            let tx_hash = self.rpc.transact(contract, init_calldata()).await?;
            debug!("Initialized {contract} in {tx_hash}.");
        }
        Ok(contract)
    }

    async fn chain_id(&self) -> BenchResult<u64> {
        match self.config.chain_id {
            Some(chain_id) => Ok(chain_id),
            None => Ok(self.rpc.chain_id().await?),
        }
    }

    async fn run_on_chain(
        &self,
        batch_size: BatchSize,
        chain_id: u64,
    ) -> BenchResult<BenchReport> {
        info!("Benchmarking batch size {batch_size} with {} clients.", self.config.n_clients);
        let contract = self.deploy(batch_size).await?;
        let payload = verify_calldata(self.inputs.verify_args(batch_size));
        let call = VerificationCall { contract, payload };

        let factory = TxFactory::new(
            chain_id,
            self.config.gas_limit,
            self.config.gas_price,
            self.identity_source(batch_size),
        );
        let transactions = factory.sign_all(&call, self.config.n_clients).await?;

        let outcome = Broadcaster::new(self.rpc.clone(), self.config.broadcast.clone())
            .broadcast(&transactions)
            .await?;

        let gas_estimate = match self.estimate_gas(&call).await {
            Ok(gas) => Some(gas),
            Err(e) => {
                warn!("{e}");
                None
            }
        };
        let confirmed = if self.config.audit_receipts {
            Some(self.count_confirmed(&outcome).await)
        } else {
            None
        };

        Ok(BenchReport::new(batch_size, contract, &outcome, gas_estimate, confirmed))
    }

    // Each batch size gets its own keys so that a seeded sweep never reuses a nonce.
    fn identity_source(&self, batch_size: BatchSize) -> IdentitySource {
        match self.config.identity_seed {
            Some(seed) => IdentitySource::Seeded(seed.wrapping_add(u64::from(batch_size.log2()))),
            None => IdentitySource::Random,
        }
    }

    async fn estimate_gas(&self, call: &VerificationCall) -> Result<u64, GasEstimationError> {
        Ok(self.rpc.estimate_gas(self.rpc.deployer(), call.contract, call.payload.clone()).await?)
    }

    async fn count_confirmed(&self, outcome: &BroadcastOutcome) -> usize {
        let statuses =
            join_all(outcome.accepted().map(|tx_hash| self.rpc.transaction_status(*tx_hash))).await;
        statuses
            .into_iter()
            .filter(|status| match status {
                Ok(status) => *status == Some(true),
                Err(e) => {
                    debug!("Failed to fetch receipt: {e}");
                    false
                }
            })
            .count()
    }
}
