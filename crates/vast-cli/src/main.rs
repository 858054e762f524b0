mod commands;
mod error;
mod record;
mod schema_store;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use commands::Commands;

/// A sharded event index and query engine.
#[derive(Parser)]
#[command(name = "vast", about = "A sharded event index and query engine")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// State root directory (overrides $VAST_DIR)
    #[arg(long = "dir", global = true)]
    dir: Option<PathBuf>,
}

impl Cli {
    /// Resolve the state root: `--dir`, then `$VAST_DIR`, then `./.vast`.
    pub fn root(&self) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| std::env::var_os("VAST_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(".vast"))
    }
}

fn main() {
    let cli = Cli::parse();
    match commands::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("vast: {e}");
            process::exit(code);
        }
    }
}
