use std::sync::Arc;

use relay_batch_submitter::{submission_queue, BatchProducer, BatchSubmitter};
use relay_codec::decode;
use relay_config::{BatchSubmitterConfig, L1Config};
use relay_store::{traits::ChainStore, Store};
use relay_types::{batch::Batch, submission::SubmissionStatus};

use crate::testing_tool::{
    chain::{canonical_chain_address, MockL1, MockL2},
    common::{l1_config, queue_config, submitter_config, wait_until},
};

const NOW: u64 = 10_000;

struct Relay {
    producer: BatchProducer,
    submitter: BatchSubmitter,
}

fn start_relay(
    store: &Store,
    l1: &Arc<MockL1>,
    l2: &Arc<MockL2>,
    l1_config: L1Config,
    config: BatchSubmitterConfig,
) -> Relay {
    let (queue, notify) = submission_queue(store, &config, &queue_config(), None);
    queue.start().unwrap();
    let producer = BatchProducer::new(store.clone(), l2.clone(), queue.clone(), config.clone());
    let submitter = BatchSubmitter::new(store.clone(), queue, notify, l1.clone(), l1_config, config);
    Relay {
        producer,
        submitter,
    }
}

/// Wait for the queue to deliver `batch_number`, then run the submitter
/// until it stops making progress.
async fn submit(store: &Store, submitter: &BatchSubmitter, batch_number: u64) -> SubmissionStatus {
    wait_until(|| {
        store
            .get_submission_state(batch_number)
            .unwrap()
            .is_some()
    })
    .await;
    submitter.run_task().await.unwrap().unwrap()
}

fn sent_batches(l1: &MockL1) -> Vec<Batch> {
    l1.sent()
        .iter()
        .map(|tx| {
            assert_eq!(tx.to, canonical_chain_address());
            decode(&tx.data[4..]).unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_ship_l2_history() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let l2 = Arc::new(MockL2::default());
    for i in 0..10u8 {
        l2.push_sequencer_tx(100 + i as u64 / 4, 7, &[i]);
    }

    let relay = start_relay(&store, &l1, &l2, l1_config(), submitter_config(4));
    let mut produced = vec![];
    while let Some(batch_number) = relay.producer.produce(NOW).await.unwrap() {
        produced.push(batch_number);
    }
    assert_eq!(produced, vec![0, 1, 2]);
    // genesis is empty, so the cursor passed it too
    assert_eq!(relay.producer.cursor().unwrap(), (11, 3));

    for batch_number in produced {
        let status = submit(&store, &relay.submitter, batch_number).await;
        assert_eq!(status, SubmissionStatus::Finalized);
    }

    let batches = sent_batches(&l1);
    let shape: Vec<_> = batches
        .iter()
        .map(|b| (b.should_start_at_element, b.total_elements_to_append))
        .collect();
    assert_eq!(shape, vec![(0, 4), (4, 4), (8, 2)]);
    for (i, batch) in batches.iter().enumerate() {
        assert_eq!(batch.contexts.len(), 1);
        let context = batch.contexts[0];
        assert_eq!(context.timestamp, 100 + i as u64);
        assert_eq!(context.block_number, 7);
        assert_eq!(context.num_queued, 0);
    }
    let raw: Vec<u8> = batches
        .iter()
        .flat_map(|b| b.transactions.iter().map(|tx| tx.as_bytes()[0]))
        .collect();
    assert_eq!(raw, (0..10).collect::<Vec<u8>>());

    // nothing left once the queue drained
    assert_eq!(relay.submitter.run_task().await.unwrap(), None);
    let state = store.get_submission_state(2).unwrap().unwrap();
    assert_eq!(state.status, SubmissionStatus::Finalized);
    assert_eq!(state.submission_tx_hash, Some(l1.sent()[2].hash));
}

#[tokio::test]
async fn test_wait_for_confirmations() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let l2 = Arc::new(MockL2::default());
    l2.push_sequencer_tx(100, 7, &[1]);

    let l1_config = L1Config {
        confirmations: 3,
        ..l1_config()
    };
    let relay = start_relay(&store, &l1, &l2, l1_config, submitter_config(4));
    assert_eq!(relay.producer.produce(NOW).await.unwrap(), Some(0));

    assert_eq!(
        submit(&store, &relay.submitter, 0).await,
        SubmissionStatus::Sent
    );
    l1.mine(1);
    assert_eq!(
        relay.submitter.run_task().await.unwrap(),
        Some(SubmissionStatus::Sent)
    );
    l1.mine(1);
    assert_eq!(
        relay.submitter.run_task().await.unwrap(),
        Some(SubmissionStatus::Finalized)
    );
    // confirmed without being sent again
    assert_eq!(l1.sent().len(), 1);
}

#[tokio::test]
async fn test_hold_batch_above_gas_ceiling() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let l2 = Arc::new(MockL2::default());
    l2.push_sequencer_tx(100, 7, &[1]);

    let config = BatchSubmitterConfig {
        max_gas_price_gwei: 1,
        ..submitter_config(4)
    };
    let relay = start_relay(&store, &l1, &l2, l1_config(), config);
    relay.producer.produce(NOW).await.unwrap();

    l1.set_gas_price(2_000_000_000);
    assert_eq!(
        submit(&store, &relay.submitter, 0).await,
        SubmissionStatus::Queued
    );
    assert!(l1.sent().is_empty());

    l1.set_gas_price(1_000_000_000);
    assert_eq!(
        relay.submitter.run_task().await.unwrap(),
        Some(SubmissionStatus::Finalized)
    );
    assert_eq!(l1.sent().len(), 1);
}

#[tokio::test]
async fn test_resume_after_restart() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let l2 = Arc::new(MockL2::default());
    for i in 0..6u8 {
        l2.push_sequencer_tx(100, 7, &[i]);
    }

    {
        let relay = start_relay(&store, &l1, &l2, l1_config(), submitter_config(2));
        assert_eq!(relay.producer.produce(NOW).await.unwrap(), Some(0));
        assert_eq!(relay.producer.produce(NOW).await.unwrap(), Some(1));
        assert_eq!(
            submit(&store, &relay.submitter, 0).await,
            SubmissionStatus::Finalized
        );
    }

    let relay = start_relay(&store, &l1, &l2, l1_config(), submitter_config(2));
    assert_eq!(relay.producer.cursor().unwrap(), (5, 2));
    assert_eq!(relay.producer.produce(NOW).await.unwrap(), Some(2));
    assert_eq!(relay.producer.produce(NOW).await.unwrap(), None);
    for batch_number in 1..3 {
        assert_eq!(
            submit(&store, &relay.submitter, batch_number).await,
            SubmissionStatus::Finalized
        );
    }

    let starts: Vec<_> = sent_batches(&l1)
        .iter()
        .map(|b| b.should_start_at_element)
        .collect();
    assert_eq!(starts, vec![0, 2, 4]);
}
