/// Errors produced by the value model: malformed patterns, addresses,
/// subnets, and record-schema resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("invalid pattern '{0}': {1}")]
    InvalidPattern(String, #[source] regex::Error),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid subnet '{0}': {1}")]
    InvalidSubnet(String, String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("unknown field '{0}' in schema")]
    UnknownField(String),

    #[error("field '{0}' is not a record, cannot descend into '{1}'")]
    NotARecord(String, String),
}
