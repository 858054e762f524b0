pub mod ingest;
pub mod query;
pub mod start;
pub mod stop;

use clap::Subcommand;

use crate::error::CliError;
use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest typed records from a file (or '-' for stdin)
    Ingest(ingest::IngestArgs),
    /// Evaluate a query expression against the current index
    Query(query::QueryArgs),
    /// Run the ingest pipeline in the foreground, reading records from stdin
    Start(start::StartArgs),
    /// Stop a process started with `start`
    Stop(stop::StopArgs),
}

pub fn run(cli: &Cli) -> Result<i32, CliError> {
    match &cli.command {
        Commands::Ingest(args) => ingest::run(args, cli),
        Commands::Query(args) => query::run(args, cli),
        Commands::Start(args) => start::run(args, cli),
        Commands::Stop(args) => stop::run(args, cli),
    }
}
