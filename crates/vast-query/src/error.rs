//! Error taxonomy for query text that fails the grammar (§7 "Parse
//! error") or fails typed validation (§7 "Validation error"). Both are
//! returned to the submitter and never reach the indexers.

use vast_index::IndexError;
use vast_value::{TypeTag, ValueError};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of query")]
    UnexpectedEof,

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("trailing input after query: {0}")]
    TrailingInput(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("operator {op} not legal between {lhs:?} and {rhs:?}")]
    IllegalOperator {
        op: vast_index::ClauseOp,
        lhs: TypeTag,
        rhs: Option<TypeTag>,
    },

    #[error("no constant result for this expression")]
    UnfoldableExpression,

    #[error(transparent)]
    Schema(#[from] ValueError),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
