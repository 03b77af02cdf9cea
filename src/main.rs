//! TransportAudit — hospital patient-transport analytics.
//!
//! Thin binary entry point. All logic lives in the `transport-audit-core`
//! and `transport-audit-cli` crates.

use clap::Parser;
use transport_audit_cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("TransportAudit starting");

    let output = transport_audit_cli::run(&cli)?;
    println!("{output}");
    Ok(())
}
