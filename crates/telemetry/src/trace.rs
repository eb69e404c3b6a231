use relay_config::Trace;
use tracing_appender::non_blocking;
use tracing_subscriber::{prelude::*, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum TraceInitError {
    ParseError(#[from] tracing_subscriber::filter::ParseError),
    TryInitError(#[from] tracing_subscriber::util::TryInitError),
}

/// Keep alive for the whole process; dropping it flushes buffered log lines.
pub struct TraceGuard {
    _non_blocking_worker: non_blocking::WorkerGuard,
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. Records emitted through the `log` facade are forwarded.
pub fn init(trace: Option<Trace>) -> Result<TraceGuard, TraceInitError> {
    let env_filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))?;

    let (non_blocking_stdout, non_blocking_worker) = non_blocking(std::io::stdout());
    let registry = tracing_subscriber::registry().with(env_filter_layer);
    match trace {
        Some(Trace::Json) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking_stdout),
            )
            .try_init()?,
        None => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking_stdout),
            )
            .try_init()?,
    }

    Ok(TraceGuard {
        _non_blocking_worker: non_blocking_worker,
    })
}
