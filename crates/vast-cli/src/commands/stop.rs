//! `vast stop`: read the PID file a running `start` process wrote and
//! send it `SIGTERM` via the `kill` binary — the same shortcut
//! `git-cli`'s own commands take when they need another process's
//! behavior (shelling out to `git` itself) rather than pulling in a
//! signal-handling dependency for one best-effort call.

use std::fs;

use clap::Args;

use crate::error::CliError;
use crate::Cli;

#[derive(Args)]
pub struct StopArgs {}

pub fn run(_args: &StopArgs, cli: &Cli) -> Result<i32, CliError> {
    let root = cli.root();
    let pid_path = root.join("vast.pid");

    let pid = match fs::read_to_string(&pid_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("vast: stop: no running process recorded in {}", root.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };
    let pid = pid.trim();

    let status = std::process::Command::new("kill").arg(pid).status()?;
    if status.success() {
        let _ = fs::remove_file(&pid_path);
        Ok(0)
    } else {
        eprintln!("vast: stop: kill {pid} exited with {status}");
        Ok(2)
    }
}
