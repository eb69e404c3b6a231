use relay_telemetry::metric::{counter::Counter, gauge::Gauge, registry::Registry, Lazy};

pub static SUBMITTER_METRICS: Lazy<SubmitterMetrics> = Lazy::new(|| {
    let metrics = SubmitterMetrics::default();
    let mut registry = relay_telemetry::metric::global();
    metrics.register(registry.sub_registry_with_prefix("submitter"));
    metrics
});

#[derive(Default)]
pub struct SubmitterMetrics {
    pub batches_created: Counter,
    pub batches_sent: Counter,
    pub batches_finalized: Counter,
    pub send_failures: Counter,
    pub confirm_failures: Counter,
    pub last_finalized_batch: Gauge,
}

impl SubmitterMetrics {
    fn register(&self, registry: &mut Registry) {
        registry.register(
            "batches_created",
            "Number of batches added to the submission queue",
            Box::new(self.batches_created.clone()),
        );
        registry.register(
            "batches_sent",
            "Number of batch transactions sent to L1",
            Box::new(self.batches_sent.clone()),
        );
        registry.register(
            "batches_finalized",
            "Number of batches with enough L1 confirmations",
            Box::new(self.batches_finalized.clone()),
        );
        registry.register(
            "send_failures",
            "Number of failed batch sends",
            Box::new(self.send_failures.clone()),
        );
        registry.register(
            "confirm_failures",
            "Number of failed or reverted confirmation waits",
            Box::new(self.confirm_failures.clone()),
        );
        registry.register(
            "last_finalized_batch",
            "Number of the last finalized batch",
            Box::new(self.last_finalized_batch.clone()),
        );
    }
}
