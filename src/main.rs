//! Entry point for the Ledger Engine binary.
//!
//! Running this binary starts an HTTP server exposing the payroll
//! and profit-and-loss calculators.  The bind address may be set via
//! the `LEDGER_BIND_ADDR` environment variable; log verbosity follows
//! `RUST_LOG` (defaulting to `info`).

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::var("LEDGER_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    ledger_engine::api::serve(&addr).await
}
