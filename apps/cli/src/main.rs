//! eduscol: curriculum document harvester.
//!
//! Crawls the national curriculum portal for official program documents and
//! files extracted texts into a niveau / classe / filiere / matiere tree.

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
