use vast_value::TypeTag;

/// Errors produced by value index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("value of type {actual:?} pushed into a {expected} index")]
    TypeMismatch {
        expected: &'static str,
        actual: Option<TypeTag>,
    },

    #[error("operator not legal for this index")]
    IllegalOperator,

    #[error("positions must be pushed in order: expected {expected}, got {actual}")]
    OutOfOrder { expected: u64, actual: u64 },
}
