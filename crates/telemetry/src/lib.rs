pub mod metric;
pub mod trace;

pub use tracing;
