//! Felt CLI binary.

use anyhow::Result;
use felt::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the felt CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence of
/// file reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable.
    // Example: RUST_LOG=felt=debug,felt_graph=trace felt ls
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("felt=warn,felt_graph=warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting felt CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Felt CLI completed successfully");
    Ok(())
}
