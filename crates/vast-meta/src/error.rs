/// Errors from the meta store's counter operations.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Covers both lock contention/IO and a present-but-corrupt counter
    /// file — per §7, neither is recoverable by starting the counter
    /// fresh, both are fatal.
    #[error("meta store filesystem error: {0}")]
    Filesystem(#[from] vast_utils::UtilError),

    #[error("counter '{key}' overflowed incrementing by {n}")]
    Overflow { key: String, n: u64 },
}
