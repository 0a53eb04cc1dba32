use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::keccak256;
use alloy::transports::TransportErrorKind;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::broadcaster::{BroadcastOutcome, Broadcaster};
use crate::config::BroadcastConfig;
use crate::errors::BroadcastError;
use crate::rpc::{MockVerifierRpc, VerifierRpcError};
use crate::test_utils::{placeholder_transactions, shared_rpc, SyntheticRpc};

const ACK_DELAY: Duration = Duration::from_millis(250);
const N_TRANSACTIONS: usize = 100;

fn config(max_in_flight: usize) -> BroadcastConfig {
    BroadcastConfig { max_in_flight, ..Default::default() }
}

// The paused clock may round timer deadlines up to the next millisecond.
fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(5),
        "Elapsed {actual:?}, expected {expected:?}."
    );
}

fn assert_tps(actual: f64, expected: f64) {
    assert!((actual - expected).abs() / expected < 0.01, "TPS {actual}, expected {expected}.");
}

#[rstest]
#[case::all_at_once(N_TRANSACTIONS, 1)]
#[case::ten_waves(10, 10)]
#[tokio::test(start_paused = true)]
async fn tps_is_transactions_over_wall_time(
    #[case] max_in_flight: usize,
    #[case] n_waves: u32,
) {
    let rpc = SyntheticRpc::new(ACK_DELAY).shared();
    let broadcaster = Broadcaster::new(shared_rpc(&rpc), config(max_in_flight));

    let outcome = broadcaster.broadcast(&placeholder_transactions(N_TRANSACTIONS)).await.unwrap();

    let expected_elapsed = ACK_DELAY * n_waves;
    assert_elapsed(outcome.elapsed, expected_elapsed);
    assert_eq!(outcome.n_accepted(), N_TRANSACTIONS);
    assert_tps(outcome.tps(), 100.0 / expected_elapsed.as_secs_f64());
    assert_eq!(outcome.failure_rate(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn results_follow_transaction_order() {
    let transactions = placeholder_transactions(4);
    // The first transaction is acknowledged last.
    let rpc = SyntheticRpc::new(Duration::from_millis(10))
        .with_delay_for(&transactions[0].raw, Duration::from_secs(1))
        .shared();
    let broadcaster = Broadcaster::new(shared_rpc(&rpc), config(4));

    let outcome = broadcaster.broadcast(&transactions).await.unwrap();

    let tx_hashes: Vec<_> = outcome.accepted().copied().collect();
    let expected: Vec<_> = transactions.iter().map(|transaction| transaction.tx_hash).collect();
    assert_eq!(tx_hashes, expected);
    assert_elapsed(outcome.elapsed, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_is_isolated() {
    let transactions = placeholder_transactions(N_TRANSACTIONS);
    let rpc = SyntheticRpc::new(ACK_DELAY).rejecting(&transactions[3].raw).shared();
    let broadcaster = Broadcaster::new(shared_rpc(&rpc), config(N_TRANSACTIONS));

    let outcome = broadcaster.broadcast(&transactions).await.unwrap();

    assert_eq!(outcome.n_accepted(), N_TRANSACTIONS - 1);
    assert_eq!(outcome.n_failed(), 1);
    assert_eq!(outcome.failure_rate(), 0.01);
    assert_matches!(&outcome.submissions[3], Err(BroadcastError::Rejected { index: 3, .. }));
    assert_tps(outcome.tps(), 99.0 / ACK_DELAY.as_secs_f64());
}

#[tokio::test(start_paused = true)]
async fn fail_fast_aborts_on_first_rejection() {
    let transactions = placeholder_transactions(N_TRANSACTIONS);
    let rpc = SyntheticRpc::new(ACK_DELAY).rejecting(&transactions[3].raw).shared();
    let config = BroadcastConfig { fail_fast: true, ..config(N_TRANSACTIONS) };
    let broadcaster = Broadcaster::new(shared_rpc(&rpc), config);

    let error = broadcaster.broadcast(&transactions).await.unwrap_err();

    assert_matches!(error, BroadcastError::Rejected { index: 3, .. });
}

#[tokio::test(start_paused = true)]
async fn stalled_submission_times_out_at_its_index() {
    let timeout = Duration::from_secs(5);
    let transactions = placeholder_transactions(10);
    let rpc = SyntheticRpc::new(ACK_DELAY).stalling(&transactions[5].raw).shared();
    let config = BroadcastConfig {
        submission_timeout_millis: timeout.as_millis().try_into().unwrap(),
        ..config(10)
    };
    let broadcaster = Broadcaster::new(shared_rpc(&rpc), config);

    let outcome = broadcaster.broadcast(&transactions).await.unwrap();

    assert_eq!(outcome.n_accepted(), 9);
    assert_elapsed(outcome.elapsed, timeout);
    assert_matches!(
        &outcome.submissions[5],
        Err(BroadcastError::TimedOut { index: 5, timeout: t }) if *t == timeout
    );
    assert_eq!(outcome.failures().map(BroadcastError::index).collect::<Vec<_>>(), vec![5]);
}

#[tokio::test]
async fn every_transaction_reaches_the_node_once() {
    let transactions = placeholder_transactions(8);
    let mut rpc = MockVerifierRpc::new();
    rpc.expect_send_raw_transaction()
        .times(transactions.len())
        .returning(|raw| Ok(keccak256(&raw)));
    let broadcaster = Broadcaster::new(Arc::new(rpc), config(2));

    let outcome = broadcaster.broadcast(&transactions).await.unwrap();

    assert_eq!(outcome.n_accepted(), transactions.len());
}

#[tokio::test]
async fn every_rejection_yields_zero_tps() {
    let mut rpc = MockVerifierRpc::new();
    rpc.expect_send_raw_transaction().returning(|_| {
        Err(VerifierRpcError::Transport(TransportErrorKind::custom_str("insufficient funds")))
    });
    let broadcaster = Broadcaster::new(Arc::new(rpc), config(4));

    let outcome = broadcaster.broadcast(&placeholder_transactions(4)).await.unwrap();

    assert_eq!(outcome.tps(), 0.0);
    assert_eq!(outcome.failure_rate(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn stalled_submission_does_not_hold_back_the_queue() {
    let timeout = Duration::from_secs(5);
    let transactions = placeholder_transactions(10);
    let rpc = SyntheticRpc::new(ACK_DELAY).stalling(&transactions[0].raw).shared();
    let config = BroadcastConfig {
        submission_timeout_millis: timeout.as_millis().try_into().unwrap(),
        ..config(2)
    };
    let broadcaster = Broadcaster::new(shared_rpc(&rpc), config);

    let outcome = broadcaster.broadcast(&transactions).await.unwrap();

    // The other nine drain through the second slot long before the head times out.
    assert_elapsed(outcome.elapsed, timeout);
    assert_eq!(outcome.n_accepted(), 9);
    assert_matches!(&outcome.submissions[0], Err(BroadcastError::TimedOut { index: 0, .. }));
    let tx_hashes: Vec<_> = outcome.accepted().copied().collect();
    let expected: Vec<_> =
        transactions[1..].iter().map(|transaction| transaction.tx_hash).collect();
    assert_eq!(tx_hashes, expected);
    assert_tps(outcome.tps(), 9.0 / timeout.as_secs_f64());
}

#[test]
fn zero_elapsed_yields_zero_tps() {
    let outcome =
        BroadcastOutcome { elapsed: Duration::ZERO, submissions: vec![Ok(keccak256([0x01]))] };

    assert_eq!(outcome.tps(), 0.0);
    assert!(serde_json::to_value(outcome.tps()).unwrap().is_number());
}
