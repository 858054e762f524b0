/// The error taxonomy of §7, restricted to the ingest path: parse and
/// validation errors belong to `vast-query` and never reach here.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A present-but-unreadable persisted-state file, or any other I/O
    /// failure on the ingest path. Fatal: the importer actor terminates.
    #[error("filesystem error: {0}")]
    Filesystem(#[from] vast_utils::UtilError),

    #[error("archive error: {0}")]
    Archive(#[from] vast_archive::ArchiveError),

    #[error("index error: {0}")]
    Index(#[from] vast_index::IndexError),

    #[error("meta store error: {0}")]
    Meta(#[from] vast_meta::MetaError),

    #[error("query error: {0}")]
    Query(#[from] vast_query::QueryError),

    /// No meta store actor is reachable to service a replenish request
    /// (§7 "Unspecified" — a missing prerequisite actor).
    #[error("no meta store actor available to service a replenish request")]
    Unspecified,

    /// `available + next` would exceed `EventId::MAX` (§4.5 invariant).
    #[error("event ID space exhausted")]
    IdSpaceExhausted,
}
