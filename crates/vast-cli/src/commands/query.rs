//! `vast query <expression>`: compile and evaluate an expression
//! against the schema and archive already persisted in `VAST_DIR`,
//! printing matching event IDs one per line, ascending.

use clap::Args;
use vast_ingest::{Pipeline, PipelineConfig};

use crate::error::CliError;
use crate::schema_store;
use crate::Cli;

#[derive(Args)]
pub struct QueryArgs {
    /// Query expression, per the event/type/tag clause grammar
    expression: String,
}

pub fn run(args: &QueryArgs, cli: &Cli) -> Result<i32, CliError> {
    let root = cli.root();
    let schema_path = root.join("schema");

    let schema = schema_store::load(&schema_path)?.ok_or_else(|| {
        CliError::Record(format!(
            "no schema recorded in {} — ingest something first",
            root.display()
        ))
    })?;

    let pipeline = Pipeline::start(PipelineConfig::new(root.clone(), schema))?;
    let ids = pipeline.query(&args.expression)?;
    for id in ids {
        println!("{}", id.get());
    }
    Ok(0)
}
