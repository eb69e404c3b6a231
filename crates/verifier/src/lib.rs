//! Cross-chain state root verification.
//!
//! Two modes:
//! - [`FraudDetector`] checks every state batch committed on L1 against the
//!   roots an independent replica computed.
//! - [`HealthChecker`] polls the latest roots of the sequencer and the
//!   replica and, on disagreement, binary searches the first divergent
//!   height with [`locate_first_divergence`].

mod compare;
mod divergence;
mod error;
mod fraud_detector;
mod health_check;
mod metrics;

pub use compare::compare_roots;
pub use divergence::locate_first_divergence;
pub use error::VerifierError;
pub use fraud_detector::{FraudDetector, Verdict};
pub use health_check::{HealthChecker, HealthStatus};
