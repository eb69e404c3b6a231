use std::future::Future;

use anyhow::Result;

/// First height in `[0, latest_common]` where `mismatch` holds.
///
/// `mismatch(latest_common)` must be true, and mismatch is assumed to be
/// monotonic: once two chains diverge they stay diverged. Takes
/// `O(log latest_common)` probes.
pub async fn locate_first_divergence<F, Fut>(latest_common: u64, mut mismatch: F) -> Result<u64>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let (mut lo, mut hi) = (0, latest_common);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if mismatch(mid).await? {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    async fn search(d: u64, h: u64) -> (u64, u32) {
        let probes = Cell::new(0u32);
        let found = locate_first_divergence(h, |height| {
            probes.set(probes.get() + 1);
            async move { Ok::<_, anyhow::Error>(height >= d) }
        })
        .await
        .unwrap();
        (found, probes.get())
    }

    #[tokio::test]
    async fn test_locate_every_divergence_point() {
        for h in [0u64, 1, 2, 7, 100, 1_000] {
            for d in 0..=h {
                let (found, _) = search(d, h).await;
                assert_eq!(found, d, "d {} h {}", d, h);
            }
        }
    }

    #[tokio::test]
    async fn test_logarithmic_probes() {
        let h = 1_000_000u64;
        // ceil(log2(h + 1))
        let bound = 64 - h.leading_zeros();
        for d in [0, 1, 12_345, 500_000, h - 1, h] {
            let (found, probes) = search(d, h).await;
            assert_eq!(found, d);
            assert!(probes <= bound, "{} probes for d {}", probes, d);
        }
    }

    #[tokio::test]
    async fn test_probe_error() {
        let err = locate_first_divergence(10, |_| async {
            Err::<bool, _>(anyhow::anyhow!("rpc down"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "rpc down");
    }
}
