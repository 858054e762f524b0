//! Lowers a validated query into a flat leaf list plus a combination
//! template (§4.4 "Execution"/"Streaming"): leaves dispatch to indexer
//! actors independently and may come back in any order (they are
//! combined commutatively/associatively), so the plan only records
//! *what* each leaf needs, never *when*.

use crate::ast::BinaryQueryOp;
use crate::validate::{LeafKey, ValidatedLeaf, ValidatedQuery};
use vast_index::ClauseOp;
use vast_value::Value;

#[derive(Debug, Clone)]
pub struct LeafQuery {
    pub id: usize,
    pub key: LeafKey,
    pub op: ClauseOp,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum Combinator {
    Leaf(usize),
    Binary(Box<Combinator>, BinaryQueryOp, Box<Combinator>),
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub leaves: Vec<LeafQuery>,
    pub combinator: Combinator,
}

pub fn plan(query: &ValidatedQuery) -> Plan {
    let mut leaves = Vec::new();
    let combinator = build(query, &mut leaves);
    Plan { leaves, combinator }
}

fn build(query: &ValidatedQuery, leaves: &mut Vec<LeafQuery>) -> Combinator {
    match query {
        ValidatedQuery::Leaf(ValidatedLeaf { key, op, value }) => {
            let id = leaves.len();
            leaves.push(LeafQuery {
                id,
                key: key.clone(),
                op: *op,
                value: value.clone(),
            });
            Combinator::Leaf(id)
        }
        ValidatedQuery::Binary(lhs, op, rhs) => {
            let cl = build(lhs, leaves);
            let cr = build(rhs, leaves);
            Combinator::Binary(Box::new(cl), *op, Box::new(cr))
        }
    }
}
