//! Error taxonomy for the CLI boundary, mapped to the four exit codes:
//! `0` success, `1` validation error, `2` runtime error, `3` filesystem
//! error.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A malformed ingest record line, or a malformed persisted schema
    /// file — both are validation errors from the CLI's point of view.
    #[error("{0}")]
    Record(String),

    #[error(transparent)]
    Ingest(#[from] vast_ingest::IngestError),

    #[error(transparent)]
    Query(#[from] vast_query::QueryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Record(_) => 1,
            CliError::Query(e) => query_exit_code(e),
            CliError::Ingest(e) => ingest_exit_code(e),
            CliError::Io(_) => 3,
        }
    }
}

fn query_exit_code(err: &vast_query::QueryError) -> i32 {
    use vast_query::QueryError::*;
    match err {
        Parse(_) | Validation(_) => 1,
        Index(_) => 2,
    }
}

fn ingest_exit_code(err: &vast_ingest::IngestError) -> i32 {
    use vast_ingest::IngestError::*;
    match err {
        Filesystem(_) => 3,
        Archive(_) | Index(_) | Meta(_) => 2,
        Query(inner) => query_exit_code(inner),
        Unspecified | IdSpaceExhausted => 2,
    }
}
