use relay_telemetry::metric::{counter::Counter, gauge::Gauge, registry::Registry, Lazy};

pub static L1_SYNC_METRICS: Lazy<L1SyncMetrics> = Lazy::new(|| {
    let metrics = L1SyncMetrics::default();
    let mut registry = relay_telemetry::metric::global();
    metrics.register(registry.sub_registry_with_prefix("l1_sync"));
    metrics
});

#[derive(Default)]
pub struct L1SyncMetrics {
    pub enqueued_seen: Counter,
    pub relayed: Counter,
    pub last_scanned_block: Gauge,
}

impl L1SyncMetrics {
    fn register(&self, registry: &mut Registry) {
        registry.register(
            "enqueued_seen",
            "Number of enqueued transactions found on L1",
            Box::new(self.enqueued_seen.clone()),
        );
        registry.register(
            "relayed",
            "Number of enqueued transactions relayed to L2",
            Box::new(self.relayed.clone()),
        );
        registry.register(
            "last_scanned_block",
            "Last L1 block scanned for enqueued transactions",
            Box::new(self.last_scanned_block.clone()),
        );
    }
}
