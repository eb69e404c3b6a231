use std::sync::Arc;

use relay_config::{HealthCheckConfig, VerifierConfig};
use relay_rpc_client::ContractEvents;
use relay_store::{traits::ChainStore, Store};
use relay_types::H256;
use relay_verifier::{FraudDetector, HealthChecker, HealthStatus, Verdict};

use crate::testing_tool::chain::{enqueue_address, state_commitment_address, MockL1, MockL2};

fn chain_with_txs(chain: MockL2, count: u8) -> Arc<MockL2> {
    for i in 0..count {
        chain.push_sequencer_tx(100, 7, &[i]);
    }
    Arc::new(chain)
}

/// Commit the sequencer's roots for heights `1..=tip` on L1, `batch_size`
/// roots per batch.
fn commit_state_batches(l1: &MockL1, sequencer: &MockL2, batch_size: usize) {
    let roots: Vec<H256> = sequencer.blocks()[1..]
        .iter()
        .map(|block| block.state_root)
        .collect();
    for (batch_index, chunk) in roots.chunks(batch_size).enumerate() {
        let prev_total = (batch_index * batch_size) as u64;
        l1.append_state_batch(batch_index as u64, prev_total, chunk);
    }
}

fn fraud_detector(store: &Store, l1: &Arc<MockL1>, replica: &Arc<MockL2>) -> FraudDetector {
    let events = ContractEvents::new(l1.clone(), enqueue_address(), state_commitment_address());
    FraudDetector::new(
        store.clone(),
        Arc::new(events),
        replica.clone(),
        VerifierConfig {
            enabled: true,
            ..Default::default()
        },
    )
}

fn health_checker(store: &Store, sequencer: &Arc<MockL2>, replica: &Arc<MockL2>) -> HealthChecker {
    HealthChecker::new(
        store.clone(),
        sequencer.clone(),
        replica.clone(),
        HealthCheckConfig {
            enabled: true,
            divergence_cooldown_secs: 60,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_verify_committed_batches() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let sequencer = chain_with_txs(MockL2::default(), 9);
    commit_state_batches(&l1, &sequencer, 3);

    // the replica replays the same transactions but lags behind
    let replica = chain_with_txs(MockL2::default(), 5);
    let mut detector = fraud_detector(&store, &l1, &replica);
    assert_eq!(
        detector.check_next().await.unwrap(),
        Verdict::Verified { batch_index: 0 }
    );
    assert_eq!(detector.check_next().await.unwrap(), Verdict::Waiting);

    for i in 5..9 {
        replica.push_sequencer_tx(100, 7, &[i]);
    }
    for batch_index in 1..3 {
        assert_eq!(
            detector.check_next().await.unwrap(),
            Verdict::Verified { batch_index }
        );
    }
    // batch 3 is not committed yet
    assert_eq!(detector.check_next().await.unwrap(), Verdict::Waiting);
    assert_eq!(
        store.get_verifier_cursor().unwrap().highest_checked_index,
        Some(2)
    );
}

#[tokio::test]
async fn test_detect_fraudulent_root() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let sequencer = chain_with_txs(MockL2::default(), 9);
    commit_state_batches(&l1, &sequencer, 3);

    let replica = chain_with_txs(MockL2::forked(1, 5), 9);
    let mut detector = fraud_detector(&store, &l1, &replica);
    assert_eq!(
        detector.check_next().await.unwrap(),
        Verdict::Verified { batch_index: 0 }
    );
    let fraud = Verdict::Fraud {
        batch_index: 1,
        position: 1,
        height: 5,
    };
    assert_eq!(detector.check_next().await.unwrap(), fraud);
    // the cursor stays on the last verified batch
    assert_eq!(detector.check_next().await.unwrap(), fraud);
    assert_eq!(
        store.get_verifier_cursor().unwrap().highest_checked_index,
        Some(0)
    );
}

#[tokio::test]
async fn test_health_check() {
    let store = Store::open_tmp().unwrap();
    let sequencer = chain_with_txs(MockL2::default(), 9);

    let healthy = chain_with_txs(MockL2::default(), 6);
    let checker = health_checker(&store, &sequencer, &healthy);
    assert_eq!(
        checker.check(1_000).await.unwrap(),
        HealthStatus::Healthy { height: 6 }
    );

    let forked = chain_with_txs(MockL2::forked(1, 5), 9);
    let checker = health_checker(&store, &sequencer, &forked);
    let record = match checker.check(1_000).await.unwrap() {
        HealthStatus::Diverged(record) => record,
        status => panic!("unexpected {:?}", status),
    };
    assert_eq!(record.height, 5);
    assert_eq!(record.latest_common_height, 9);
    assert!(!record.suspicious);
    assert_eq!(store.get_latest_divergence().unwrap(), Some(record));

    assert_eq!(
        checker.check(1_030).await.unwrap(),
        HealthStatus::Cooling { until: 1_060 }
    );
    assert!(matches!(
        checker.check(1_060).await.unwrap(),
        HealthStatus::Diverged(record) if record.height == 5 && record.detected_at == 1_060
    ));
}
