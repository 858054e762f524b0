//! `vast start`: run the ingest pipeline in the foreground, reading
//! line-format records from stdin until EOF, writing a PID file a
//! later `vast stop` can find. Like `git-cli`'s own `daemon` command,
//! there's no installed signal handler here — a `SIGTERM` just
//! terminates the process under its default disposition.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use clap::Args;
use vast_ingest::{Pipeline, PipelineConfig, RawEvent};
use vast_value::Value;

use crate::error::CliError;
use crate::record::parse_line;
use crate::schema_store;
use crate::Cli;

#[derive(Args)]
pub struct StartArgs {}

pub fn run(_args: &StartArgs, cli: &Cli) -> Result<i32, CliError> {
    let root = cli.root();
    fs::create_dir_all(&root)?;
    let schema_path = root.join("schema");

    let mut pipeline = match schema_store::load(&schema_path)? {
        Some(schema) => Some(Pipeline::start(PipelineConfig::new(root.clone(), schema))?),
        None => None,
    };
    if pipeline.is_some() {
        write_pid_file(&root)?;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_line(&line)?;

        // The first record this process ever sees fixes the schema, if
        // none was already persisted by an earlier `ingest`/`start`.
        if pipeline.is_none() {
            let schema = schema_store::infer(&record);
            schema_store::persist(&schema_path, &schema)?;
            pipeline = Some(Pipeline::start(PipelineConfig::new(root.clone(), schema))?);
            write_pid_file(&root)?;
        }

        let event = RawEvent {
            time: record.time,
            name: record.name,
            data: Value::record(record.fields),
        };
        pipeline.as_ref().expect("just initialized above").submit(vec![event])?;
    }

    remove_pid_file(&root);
    Ok(0)
}

fn write_pid_file(root: &Path) -> Result<(), CliError> {
    fs::write(root.join("vast.pid"), std::process::id().to_string())?;
    Ok(())
}

fn remove_pid_file(root: &Path) {
    let _ = fs::remove_file(root.join("vast.pid"));
}
