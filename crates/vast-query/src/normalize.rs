//! Constant folding plus De Morgan push-down (§4.4): every leaf ends up
//! carrying its already-negated operator (via `ClauseOp::negate`, the
//! table of §4.4) rather than being wrapped in a `Not` node, so the
//! validator and executor never have to special-case negation.

use vast_value::{TypeTag, Value};

use crate::ast::{BinaryQueryOp, Clause, Query, Tag, UnaryClause};
use crate::error::ValidationError;
use crate::fold::fold;

#[derive(Debug, Clone)]
pub enum NormalizedQuery {
    Leaf(NormalizedLeaf),
    Binary(Box<NormalizedQuery>, BinaryQueryOp, Box<NormalizedQuery>),
}

#[derive(Debug, Clone)]
pub struct NormalizedLeaf {
    pub target: ClauseTarget,
    pub op: vast_index::ClauseOp,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum ClauseTarget {
    Event(String),
    Type(TypeTag),
    Tag(Tag),
}

pub fn normalize(query: &Query) -> Result<NormalizedQuery, ValidationError> {
    normalize_query(query, false)
}

fn normalize_query(query: &Query, negate: bool) -> Result<NormalizedQuery, ValidationError> {
    match query {
        Query::Unary(u) => normalize_unary(u, negate),
        Query::Binary(lhs, op, rhs) => {
            let nl = normalize_query(lhs, negate)?;
            let nr = normalize_query(rhs, negate)?;
            let op = if negate { op.negate() } else { *op };
            Ok(NormalizedQuery::Binary(Box::new(nl), op, Box::new(nr)))
        }
    }
}

fn normalize_unary(unary: &UnaryClause, negate: bool) -> Result<NormalizedQuery, ValidationError> {
    match unary {
        UnaryClause::Not(inner) => normalize_unary(inner, !negate),
        UnaryClause::Group(query) => normalize_query(query, negate),
        UnaryClause::Clause(clause) => normalize_clause(clause, negate),
    }
}

fn normalize_clause(clause: &Clause, negate: bool) -> Result<NormalizedQuery, ValidationError> {
    let (target, op, expr) = match clause {
        Clause::Event { path, op, expr } => (ClauseTarget::Event(path.clone()), *op, expr),
        Clause::Type { type_name, op, expr } => (ClauseTarget::Type(*type_name), *op, expr),
        Clause::Tag { tag, op, expr } => (ClauseTarget::Tag(*tag), *op, expr),
    };
    let value = fold(expr)?;
    let op = if negate { op.negate() } else { op };
    Ok(NormalizedQuery::Leaf(NormalizedLeaf { target, op, value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ArithOp;
    use crate::ast::Expr;
    use crate::parser::parse;
    use vast_index::ClauseOp;

    #[test]
    fn negation_pushes_into_a_leaf_operator() {
        let query = parse("!(a.b == 1)").unwrap();
        let normalized = normalize(&query).unwrap();
        match normalized {
            NormalizedQuery::Leaf(leaf) => assert_eq!(leaf.op, ClauseOp::Ne),
            _ => panic!("expected a single leaf"),
        }
    }

    #[test]
    fn de_morgan_flips_and_to_or_under_negation() {
        let query = parse("!(a.b == 1 && c.d == 2)").unwrap();
        let normalized = normalize(&query).unwrap();
        match normalized {
            NormalizedQuery::Binary(lhs, BinaryQueryOp::Or, rhs) => {
                match *lhs {
                    NormalizedQuery::Leaf(leaf) => assert_eq!(leaf.op, ClauseOp::Ne),
                    _ => panic!("expected leaf"),
                }
                match *rhs {
                    NormalizedQuery::Leaf(leaf) => assert_eq!(leaf.op, ClauseOp::Ne),
                    _ => panic!("expected leaf"),
                }
            }
            _ => panic!("expected Or at the top"),
        }
    }

    #[test]
    fn double_negation_cancels() {
        let query = parse("!!(a.b == 1)").unwrap();
        let normalized = normalize(&query).unwrap();
        match normalized {
            NormalizedQuery::Leaf(leaf) => assert_eq!(leaf.op, ClauseOp::Eq),
            _ => panic!("expected a single leaf"),
        }
    }

    #[test]
    fn folds_arithmetic_expression_in_clause() {
        let query = Query::Unary(UnaryClause::Clause(Clause::Event {
            path: "a.b".into(),
            op: ClauseOp::Eq,
            expr: Expr::Binary(
                Box::new(Expr::Literal(Value::Int(1))),
                ArithOp::Add,
                Box::new(Expr::Literal(Value::Int(1))),
            ),
        }));
        let normalized = normalize(&query).unwrap();
        match normalized {
            NormalizedQuery::Leaf(leaf) => assert_eq!(leaf.value, Value::Int(2)),
            _ => panic!("expected leaf"),
        }
    }
}
