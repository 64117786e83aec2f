//! RosterScout CLI: enrich a competition roster with results-database history.
//!
//! Turns a meet roster into per-athlete records by guessing and fetching each
//! athlete's profile on a public results database.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
