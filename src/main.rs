//! ossdk CLI
//!
//! Entry point for the ossdk command-line application.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ossdk::cli::output::status;
use ossdk::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run().await {
        eprintln!("{} {e:#}", status::ERROR);
        std::process::exit(1);
    }
}
