use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use relay_batch_submitter::{submission_queue, BatchProducer, BatchSubmitter};
use relay_config::Config;
use relay_l1_sync::{enqueue_queue, L1Ingestor};
use relay_queue::{FatalError, QueueCloser};
use relay_rpc_client::{ContractEvents, EthRpcClient};
use relay_store::Store;
use relay_utils::AbortOnDropHandle;
use relay_verifier::{FraudDetector, HealthChecker};
use tokio::sync::{broadcast, mpsc};

use crate::metrics_server::start_metrics_server;

struct Clients {
    l1: Arc<EthRpcClient>,
    l2: Arc<EthRpcClient>,
    replica: Arc<EthRpcClient>,
    events: Arc<ContractEvents>,
}

impl Clients {
    fn new(config: &Config) -> Result<Self> {
        let l1 = EthRpcClient::with_url(&config.l1.rpc_url, "l1", config.l1.sender)
            .context("create L1 client")?;
        let l2 = EthRpcClient::with_url(&config.l2.rpc_url, "l2", Default::default())
            .context("create L2 client")?;
        let replica = EthRpcClient::with_url(&config.l2.replica_url, "replica", Default::default())
            .context("create replica client")?;
        let l1 = Arc::new(l1);
        let events = ContractEvents::new(
            l1.clone(),
            config.l1.enqueue_address,
            config.l1.state_commitment_address,
        );
        Ok(Clients {
            l1,
            l2: Arc::new(l2),
            replica: Arc::new(replica),
            events: Arc::new(events),
        })
    }
}

/// Run every enabled component until SIGINT/SIGTERM, or until a queue
/// reports a [`FatalError`], which is returned as an error.
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;
    let store = Store::open(&config.store)?;
    let clients = Clients::new(&config)?;

    // Broadcast shutdown event.
    let (shutdown_event, _) = broadcast::channel(1);
    let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel::<FatalError>();
    let mut tasks: Vec<(&'static str, AbortOnDropHandle<()>)> = Vec::new();
    let mut queues: Vec<QueueCloser> = Vec::new();

    if config.batch_submitter.enabled {
        let (queue, notify) = submission_queue(
            &store,
            &config.batch_submitter,
            &config.queue,
            Some(fatal_tx.clone()),
        );
        queue.start()?;
        queues.push(queue.closer());
        let producer = BatchProducer::new(
            store.clone(),
            clients.l2.clone(),
            queue.clone(),
            config.batch_submitter.clone(),
        );
        let submitter = BatchSubmitter::new(
            store.clone(),
            queue,
            notify,
            clients.l1.clone(),
            config.l1.clone(),
            config.batch_submitter.clone(),
        );
        log::info!("batch submitter enabled");
        tasks.push((
            "batch producer",
            AbortOnDropHandle::spawn(producer.run(shutdown_event.subscribe())),
        ));
        tasks.push((
            "batch submitter",
            AbortOnDropHandle::spawn(submitter.run(shutdown_event.subscribe())),
        ));
    }

    if config.l1_sync.enabled {
        let queue = enqueue_queue(
            &store,
            clients.l2.clone(),
            &config.l1_sync,
            &config.queue,
            fatal_tx.clone(),
        );
        queue.start()?;
        queues.push(queue.closer());
        let ingestor = L1Ingestor::new(
            store.clone(),
            clients.l1.clone(),
            clients.events.clone(),
            queue,
            config.l1.confirmations,
            config.l1_sync.clone(),
        );
        log::info!("l1 sync enabled");
        tasks.push((
            "l1 ingestor",
            AbortOnDropHandle::spawn(ingestor.run(shutdown_event.subscribe())),
        ));
    }

    if config.verifier.enabled {
        let detector = FraudDetector::new(
            store.clone(),
            clients.events.clone(),
            clients.replica.clone(),
            config.verifier.clone(),
        );
        log::info!("fraud detector enabled");
        tasks.push((
            "fraud detector",
            AbortOnDropHandle::spawn(detector.run(shutdown_event.subscribe())),
        ));
    }

    if config.health_check.enabled {
        let checker = HealthChecker::new(
            store.clone(),
            clients.l2.clone(),
            clients.replica.clone(),
            config.health_check.clone(),
        );
        log::info!("health checker enabled");
        tasks.push((
            "health checker",
            AbortOnDropHandle::spawn(checker.run(shutdown_event.subscribe())),
        ));
    }

    if let Some(listen) = config.metrics_listen {
        let shutdown = shutdown_event.subscribe();
        tasks.push((
            "metrics server",
            AbortOnDropHandle::spawn(async move {
                if let Err(err) = start_metrics_server(listen, shutdown).await {
                    log::error!("metrics server: {:#}", err);
                }
            }),
        ));
    }

    if tasks.is_empty() {
        log::warn!("no component enabled");
    }
    // Only the queues keep senders now.
    drop(fatal_tx);

    let result = tokio::select! {
        _ = sigint_or_sigterm() => Ok(()),
        Some(fatal) = fatal_rx.recv() => Err(anyhow!(fatal).context("relay stopped to keep ordering")),
    };

    log::info!("send shutdown event");
    if let Err(err) = shutdown_event.send(()) {
        log::error!("Failed to broadcast shutdown event: {:?}", err);
    }
    // Every loop finishes its current iteration first.
    for (name, task) in tasks {
        if let Err(err) = task.await {
            log::error!("{} task failed: {}", name, err);
        }
    }
    // Deliveries in flight finish before the runtime goes away.
    for queue in queues {
        queue.shutdown().await;
    }
    log::info!("Exiting...");
    result
}

async fn sigint_or_sigterm() {
    let int = tokio::signal::ctrl_c();
    #[cfg(unix)]
    let mut term =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(term) => term,
            Err(err) => {
                log::error!("creating SIGTERM stream: {}", err);
                let _ = int.await;
                log::info!("received sigint, shutting down");
                return;
            }
        };
    #[cfg(unix)]
    tokio::select! {
        _ = int => {}
        _ = term.recv() => {}
    }
    #[cfg(not(unix))]
    let _ = int.await;

    log::info!("received sigint or sigterm, shutting down");
}
