pub mod metrics_server;
pub mod runner;
