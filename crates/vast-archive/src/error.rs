use vast_value::EventId;

/// Errors from archive storage and event encoding.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("lock error: {0}")]
    Lock(#[from] vast_utils::UtilError),

    #[error("corrupt event record {id}: {reason}")]
    Corrupt { id: EventId, reason: String },

    #[error("malformed event encoding: {0}")]
    Malformed(String),

    #[error("invalid value in event record: {0}")]
    Value(#[from] vast_value::ValueError),
}
