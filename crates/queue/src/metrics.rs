use relay_telemetry::metric::{counter::Counter, family::Family, registry::Registry, Lazy};

type Labels = Vec<(String, String)>;

pub static QUEUE_METRICS: Lazy<QueueMetrics> = Lazy::new(|| {
    let metrics = QueueMetrics::default();
    let mut registry = relay_telemetry::metric::global();
    metrics.register(registry.sub_registry_with_prefix("queue"));
    metrics
});

#[derive(Default)]
pub struct QueueMetrics {
    dispatched: Family<Labels, Counter>,
    retries: Family<Labels, Counter>,
    processed: Family<Labels, Counter>,
}

fn labels(namespace: &str) -> Labels {
    vec![("queue".to_string(), namespace.to_string())]
}

impl QueueMetrics {
    fn register(&self, registry: &mut Registry) {
        registry.register(
            "dispatched",
            "Number of items handed to a queue handler",
            Box::new(self.dispatched.clone()),
        );
        registry.register(
            "retries",
            "Number of failed deliveries scheduled for retry",
            Box::new(self.retries.clone()),
        );
        registry.register(
            "processed",
            "Number of items marked processed",
            Box::new(self.processed.clone()),
        );
    }

    pub fn dispatched(&self, namespace: &str) {
        self.dispatched.get_or_create(&labels(namespace)).inc();
    }

    pub fn retry(&self, namespace: &str) {
        self.retries.get_or_create(&labels(namespace)).inc();
    }

    pub fn processed(&self, namespace: &str) {
        self.processed.get_or_create(&labels(namespace)).inc();
    }
}
