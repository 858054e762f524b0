//! Query AST, parser, constant folder, De Morgan normalizer, typed
//! validator, planner, and executor (§4.4).

pub mod ast;
pub mod error;
pub mod exec;
pub mod fold;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod plan;
pub mod validate;

pub use ast::Query;
pub use error::{ParseError, QueryError, ValidationError};
pub use exec::{combine, matching_ids};
pub use normalize::{normalize, NormalizedQuery};
pub use parser::parse;
pub use plan::{plan, LeafQuery, Plan};
pub use validate::{validate, LeafKey, ValidatedQuery};

use vast_value::RecordSchema;

/// Parse, normalize, and validate a query string against a schema in
/// one call — the common path for a caller that just wants a `Plan`.
pub fn compile(input: &str, schema: &RecordSchema) -> Result<Plan, QueryError> {
    let ast = parse(input)?;
    let normalized = normalize(&ast)?;
    let validated = validate(&normalized, schema)?;
    Ok(plan(&validated))
}
