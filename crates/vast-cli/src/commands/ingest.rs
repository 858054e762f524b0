//! `vast ingest <source>`: read line-format records from a file (or
//! stdin, given `-`), stamp and index them through a one-shot
//! [`Pipeline`], then shut the pipeline down before returning so every
//! write in the batch is durable by the time this command exits.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Args;
use vast_ingest::{Pipeline, PipelineConfig, RawEvent};
use vast_value::Value;

use crate::error::CliError;
use crate::record::parse_line;
use crate::schema_store;
use crate::Cli;

#[derive(Args)]
pub struct IngestArgs {
    /// Path to a record file, or '-' for stdin
    source: PathBuf,
}

pub fn run(args: &IngestArgs, cli: &Cli) -> Result<i32, CliError> {
    let root = cli.root();
    std::fs::create_dir_all(&root)?;
    let schema_path = root.join("schema");

    let mut records = Vec::new();
    for line in read_lines(&args.source)? {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(&line)?);
    }

    let schema = match schema_store::load(&schema_path)? {
        Some(schema) => schema,
        None => {
            let schema = records.first().map(schema_store::infer).unwrap_or_default();
            schema_store::persist(&schema_path, &schema)?;
            schema
        }
    };

    let count = records.len();
    let batch: Vec<RawEvent> = records
        .into_iter()
        .map(|r| RawEvent {
            time: r.time,
            name: r.name,
            data: Value::record(r.fields),
        })
        .collect();

    {
        let pipeline = Pipeline::start(PipelineConfig::new(root.clone(), schema))?;
        pipeline.submit(batch)?;
        // Dropping the pipeline here joins the importer thread, which in
        // turn shuts down the archive/index pools and joins every
        // worker — every write this batch produced is durable before
        // `run` returns.
    }

    eprintln!("ingested {count} record(s) into {}", root.display());
    Ok(0)
}

fn read_lines(source: &Path) -> Result<Vec<String>, CliError> {
    if source.to_str() == Some("-") {
        io::stdin().lock().lines().collect::<Result<Vec<_>, _>>().map_err(CliError::from)
    } else {
        let file = File::open(source)?;
        BufReader::new(file).lines().collect::<Result<Vec<_>, _>>().map_err(CliError::from)
    }
}
