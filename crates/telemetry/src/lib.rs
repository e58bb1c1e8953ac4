use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging for the benchmark engine.
///
/// Console output is compact and human readable at INFO (overridable via
/// `RUST_LOG`); a daily-rolling `bench.log` under `log_dir` captures
/// structured JSON at DEBUG through a non-blocking writer. The returned
/// `WorkerGuard` must be held for the process lifetime or trailing log
/// lines are lost on exit.
pub fn init(log_dir: &str) -> WorkerGuard {
    fs::create_dir_all(log_dir).expect("Failed to create log directory");

    let file_appender = tracing_appender::rolling::daily(log_dir, "bench.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
