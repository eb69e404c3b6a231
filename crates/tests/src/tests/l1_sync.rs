use std::{sync::Arc, time::Duration};

use relay_batch_submitter::{submission_queue, BatchProducer, BatchSubmitter};
use relay_codec::decode;
use relay_l1_sync::{enqueue_queue, L1Ingestor, ENQUEUE_QUEUE};
use relay_queue::FatalError;
use relay_rpc_client::ContractEvents;
use relay_store::{traits::ChainStore, Store};
use relay_types::chain::QueueOrigin;
use tokio::sync::mpsc;

use crate::testing_tool::{
    chain::{enqueue_address, state_commitment_address, MockL1, MockL2},
    common::{l1_config, l1_sync_config, queue_config, submitter_config, wait_until},
};

fn start_ingestor(
    store: &Store,
    l1: &Arc<MockL1>,
    l2: &Arc<MockL2>,
) -> (L1Ingestor, mpsc::UnboundedReceiver<FatalError>) {
    let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
    let config = l1_sync_config();
    let queue = enqueue_queue(store, l2.clone(), &config, &queue_config(), fatal_tx);
    queue.start().unwrap();
    let events = ContractEvents::new(l1.clone(), enqueue_address(), state_commitment_address());
    let ingestor = L1Ingestor::new(
        store.clone(),
        l1.clone(),
        Arc::new(events),
        queue,
        l1_config().confirmations,
        config,
    );
    (ingestor, fatal_rx)
}

#[tokio::test]
async fn test_relay_enqueued_and_batch_them() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let l2 = Arc::new(MockL2::default());
    l1.enqueue(0, 500, b"a");
    l1.enqueue(1, 500, b"b");
    l1.enqueue(2, 501, b"c");

    let (ingestor, _fatal_rx) = start_ingestor(&store, &l1, &l2);
    assert_eq!(ingestor.scan().await.unwrap(), 3);
    // nothing new on a rescan
    assert_eq!(ingestor.scan().await.unwrap(), 0);

    wait_until(|| l2.blocks().len() == 4).await;
    let relayed: Vec<_> = l2.blocks()[1..]
        .iter()
        .map(|block| {
            let tx = &block.transactions[0];
            assert_eq!(tx.queue_origin, QueueOrigin::L1);
            (tx.queue_index, tx.l1_block_number, tx.raw.as_bytes().to_vec())
        })
        .collect();
    assert_eq!(
        relayed,
        vec![
            (Some(0), 1, b"a".to_vec()),
            (Some(1), 2, b"b".to_vec()),
            (Some(2), 3, b"c".to_vec()),
        ]
    );
    wait_until(|| store.get_queue_cursor(ENQUEUE_QUEUE).unwrap() == Some(2)).await;

    // the relayed transactions are batched back to L1 without their bodies
    let config = submitter_config(10);
    let (queue, notify) = submission_queue(&store, &config, &queue_config(), None);
    queue.start().unwrap();
    let producer = BatchProducer::new(store.clone(), l2.clone(), queue.clone(), config.clone());
    let submitter = BatchSubmitter::new(store.clone(), queue, notify, l1.clone(), l1_config(), config);
    assert_eq!(producer.produce(10_000).await.unwrap(), Some(0));
    wait_until(|| store.get_submission_state(0).unwrap().is_some()).await;
    submitter.run_task().await.unwrap();

    let sent = l1.sent();
    assert_eq!(sent.len(), 1);
    let batch = decode(&sent[0].data[4..]).unwrap();
    assert_eq!(batch.total_elements_to_append, 3);
    assert!(batch.transactions.is_empty());
    let contexts: Vec<_> = batch
        .contexts
        .iter()
        .map(|c| (c.num_sequenced, c.num_queued, c.timestamp, c.block_number))
        .collect();
    assert_eq!(contexts, vec![(0, 1, 500, 1), (0, 1, 500, 2), (0, 1, 501, 3)]);
}

#[tokio::test]
async fn test_wait_for_confirmed_blocks() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let l2 = Arc::new(MockL2::default());
    let (fatal_tx, _fatal_rx) = mpsc::unbounded_channel();
    let config = l1_sync_config();
    let queue = enqueue_queue(&store, l2.clone(), &config, &queue_config(), fatal_tx);
    queue.start().unwrap();
    let events = ContractEvents::new(l1.clone(), enqueue_address(), state_commitment_address());
    let ingestor = L1Ingestor::new(store.clone(), l1.clone(), Arc::new(events), queue, 3, config);

    l1.enqueue(0, 500, b"a");
    assert_eq!(ingestor.scan().await.unwrap(), 0);
    l1.mine(1);
    assert_eq!(ingestor.scan().await.unwrap(), 0);
    l1.mine(1);
    assert_eq!(ingestor.scan().await.unwrap(), 1);
    wait_until(|| l2.blocks().len() == 2).await;
}

#[tokio::test]
async fn test_relay_failure_is_fatal() {
    let store = Store::open_tmp().unwrap();
    let l1 = Arc::new(MockL1::default());
    let l2 = Arc::new(MockL2::default());
    l2.set_fail_enqueued(true);
    l1.enqueue(0, 500, b"a");

    let (ingestor, mut fatal_rx) = start_ingestor(&store, &l1, &l2);
    assert_eq!(ingestor.scan().await.unwrap(), 1);

    let fatal = tokio::time::timeout(Duration::from_secs(10), fatal_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fatal.namespace, ENQUEUE_QUEUE);
    assert_eq!(fatal.index, 0);
    assert_eq!(fatal.attempts, 3);
    assert_eq!(l2.blocks().len(), 1);
    assert_eq!(store.get_queue_cursor(ENQUEUE_QUEUE).unwrap(), None);
}
