use relay_telemetry::metric::{counter::Counter, gauge::Gauge, registry::Registry, Lazy};

pub static VERIFIER_METRICS: Lazy<VerifierMetrics> = Lazy::new(|| {
    let metrics = VerifierMetrics::default();
    let mut registry = relay_telemetry::metric::global();
    metrics.register(registry.sub_registry_with_prefix("verifier"));
    metrics
});

#[derive(Default)]
pub struct VerifierMetrics {
    pub highest_checked_batch: Gauge,
    pub fraud_detected: Gauge,
    pub fraud_events: Counter,
    pub diverged: Gauge,
    pub first_divergent_height: Gauge,
}

impl VerifierMetrics {
    fn register(&self, registry: &mut Registry) {
        registry.register(
            "highest_checked_batch",
            "Highest state batch verified against the replica",
            Box::new(self.highest_checked_batch.clone()),
        );
        registry.register(
            "fraud_detected",
            "1 if a committed state batch disagrees with the replica",
            Box::new(self.fraud_detected.clone()),
        );
        registry.register(
            "fraud_events",
            "Number of distinct state root mismatches found",
            Box::new(self.fraud_events.clone()),
        );
        registry.register(
            "diverged",
            "1 if the sequencer and the replica disagree",
            Box::new(self.diverged.clone()),
        );
        registry.register(
            "first_divergent_height",
            "First L2 height at which the sequencer and the replica disagree",
            Box::new(self.first_divergent_height.clone()),
        );
    }
}
