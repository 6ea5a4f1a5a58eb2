//! Drugpair CLI - inspect drug-pair datasets and the batches built from them.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drugpair_cli::Cli;

fn main() -> Result<()> {
    // Logs on stderr, command output on stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("drugpair=info".parse()?))
        .init();

    let cli = Cli::parse();

    info!("Drugpair CLI starting...");
    cli.command.run(&cli.dataset)?;
    info!("Drugpair CLI completed successfully");
    Ok(())
}
