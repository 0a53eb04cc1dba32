//! Timed concurrent submission of pre-signed transactions.

use std::time::Duration;

use alloy::primitives::TxHash;
use futures::{stream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::BroadcastConfig;
use crate::errors::BroadcastError;
use crate::rpc::SharedVerifierRpc;
use crate::tx_factory::SignedVerification;

#[cfg(test)]
#[path = "broadcaster_test.rs"]
mod broadcaster_test;

pub type SubmissionResult = Result<TxHash, BroadcastError>;

#[derive(Debug)]
pub struct BroadcastOutcome {
    /// From the first submission until every submission resolved.
    pub elapsed: Duration,
    /// One entry per transaction, in transaction order.
    pub submissions: Vec<SubmissionResult>,
}

impl BroadcastOutcome {
    pub fn accepted(&self) -> impl Iterator<Item = &TxHash> {
        self.submissions.iter().filter_map(|submission| submission.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &BroadcastError> {
        self.submissions.iter().filter_map(|submission| submission.as_ref().err())
    }

    pub fn n_accepted(&self) -> usize {
        self.accepted().count()
    }

    pub fn n_failed(&self) -> usize {
        self.submissions.len() - self.n_accepted()
    }

    /// Accepted submissions per second of wall time.
    pub fn tps(&self) -> f64 {
        let n_accepted = self.n_accepted();
        if n_accepted == 0 || self.elapsed.is_zero() {
            return 0.0;
        }
        lossy_f64(n_accepted) / self.elapsed.as_secs_f64()
    }

    pub fn failure_rate(&self) -> f64 {
        if self.submissions.is_empty() {
            return 0.0;
        }
        lossy_f64(self.n_failed()) / lossy_f64(self.submissions.len())
    }
}

#[allow(clippy::as_conversions)]
pub(crate) fn lossy_f64(count: usize) -> f64 {
    count as f64
}

pub struct Broadcaster {
    rpc: SharedVerifierRpc,
    config: BroadcastConfig,
}

impl Broadcaster {
    pub fn new(rpc: SharedVerifierRpc, config: BroadcastConfig) -> Self {
        Self { rpc, config }
    }

    /// Submits every transaction and measures the time until all of them are acknowledged.
    ///
    /// Dropping the returned future cancels the outstanding submissions. Failures are reported
    /// per transaction unless `fail_fast` is set, in which case the first one is returned.
    pub async fn broadcast(
        &self,
        transactions: &[SignedVerification],
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let timeout = Duration::from_millis(self.config.submission_timeout_millis);
        info!(
            "Broadcasting {} transactions, at most {} in flight.",
            transactions.len(),
            self.config.max_in_flight
        );

        // A slot frees as soon as its submission resolves, whatever its position.
        let mut resolved = stream::iter(transactions.iter().enumerate())
            .map(|(index, transaction)| async move {
                (index, self.submit(index, transaction, timeout).await)
            })
            .buffer_unordered(self.config.max_in_flight);

        let start = Instant::now();
        let mut slots: Vec<Option<SubmissionResult>> =
            std::iter::repeat_with(|| None).take(transactions.len()).collect();
        while let Some((index, submission)) = resolved.next().await {
            match submission {
                Err(error) if self.config.fail_fast => {
                    warn!("Aborting broadcast: {error}");
                    return Err(error);
                }
                submission => slots[index] = Some(submission),
            }
        }
        let submissions: Vec<SubmissionResult> = slots.into_iter().flatten().collect();
        let outcome = BroadcastOutcome { elapsed: start.elapsed(), submissions };

        info!(
            "Broadcast finished in {:?}: {} accepted, {} failed.",
            outcome.elapsed,
            outcome.n_accepted(),
            outcome.n_failed()
        );
        Ok(outcome)
    }

    async fn submit(
        &self,
        index: usize,
        transaction: &SignedVerification,
        timeout: Duration,
    ) -> SubmissionResult {
        match tokio::time::timeout(timeout, self.rpc.send_raw_transaction(transaction.raw.clone()))
            .await
        {
            Ok(Ok(tx_hash)) => Ok(tx_hash),
            Ok(Err(source)) => {
                debug!("Submission {index} from {} rejected: {source}", transaction.sender);
                Err(BroadcastError::Rejected { index, source })
            }
            Err(_) => {
                debug!("Submission {index} from {} timed out.", transaction.sender);
                Err(BroadcastError::TimedOut { index, timeout })
            }
        }
    }
}
