pub mod abort_on_drop;
pub mod exponential_backoff;

pub use abort_on_drop::AbortOnDropHandle;
pub use exponential_backoff::ExponentialBackoff;
