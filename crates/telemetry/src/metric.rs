//! Global metrics registry.
//!
//! ## Convention for metrics in the relayer:
//!
//! Each component defines its metrics in its own `metrics` module and
//! registers them lazily to the global `REGISTRY` under a sub registry named
//! after the component, e.g. `relay_queue_dispatched`.
//!
use std::sync::{RwLock, RwLockWriteGuard};

pub use once_cell::sync::{Lazy, OnceCell};
pub use prometheus_client;
pub use prometheus_client::{encoding, metrics::*, registry};

use encoding::text::SendSyncEncodeMetric;
use registry::Registry;

/// Global metrics registry.
pub static REGISTRY: Lazy<RwLock<Registry<Box<dyn SendSyncEncodeMetric>>>> =
    Lazy::new(|| Registry::with_prefix("relay").into());

pub fn global<'a>() -> RwLockWriteGuard<'a, Registry<Box<dyn SendSyncEncodeMetric>>> {
    REGISTRY.write().unwrap()
}

/// Encode every registered metric in the text exposition format.
pub fn scrape(buf: &mut Vec<u8>) -> Result<(), std::io::Error> {
    buf.reserve(2048);
    encoding::text::encode(buf, &*REGISTRY.read().unwrap())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_registered_counter() {
        let counter: counter::Counter = Default::default();
        global().sub_registry_with_prefix("telemetry_test").register(
            "hits",
            "Test counter",
            Box::new(counter.clone()),
        );
        counter.inc();
        counter.inc();

        let mut buf = Vec::new();
        scrape(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("relay_telemetry_test_hits_total 2"), "{}", text);
    }
}
