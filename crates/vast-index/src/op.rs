//! Clause-level relational operators (§4.4), the static operator-legality
//! matrix (§4.3), and per-element matching used by container indexes.

use vast_value::{TypeTag, Value};

use crate::error::IndexError;

/// One of the ten clause-level relational operators of §4.4/§6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Match,
    NotMatch,
    In,
    NotIn,
}

impl ClauseOp {
    /// The `negate(op)` table of §4.4, applied verbatim by
    /// `vast-query`'s normalizer to push `!` inward instead of wrapping a
    /// clause.
    pub fn negate(self) -> ClauseOp {
        match self {
            ClauseOp::Eq => ClauseOp::Ne,
            ClauseOp::Ne => ClauseOp::Eq,
            ClauseOp::Lt => ClauseOp::Ge,
            ClauseOp::Le => ClauseOp::Gt,
            ClauseOp::Gt => ClauseOp::Le,
            ClauseOp::Ge => ClauseOp::Lt,
            ClauseOp::Match => ClauseOp::NotMatch,
            ClauseOp::NotMatch => ClauseOp::Match,
            ClauseOp::In => ClauseOp::NotIn,
            ClauseOp::NotIn => ClauseOp::In,
        }
    }

    /// Whether this operator is one of the four order comparisons.
    pub fn is_relational(self) -> bool {
        matches!(self, ClauseOp::Lt | ClauseOp::Le | ClauseOp::Gt | ClauseOp::Ge)
    }
}

impl std::fmt::Display for ClauseOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ClauseOp::Eq => "==",
            ClauseOp::Ne => "!=",
            ClauseOp::Lt => "<",
            ClauseOp::Le => "<=",
            ClauseOp::Gt => ">",
            ClauseOp::Ge => ">=",
            ClauseOp::Match => "~",
            ClauseOp::NotMatch => "!~",
            ClauseOp::In => "in",
            ClauseOp::NotIn => "!in",
        })
    }
}

/// The static legality matrix of §4.3: does `(lhs, op, rhs)` type-check?
///
/// - Same-type relational/equality comparisons are always legal.
/// - `string ~|!~|in|!in pattern` routes to the pattern side.
/// - `address in|!in subnet` is legal.
/// - Everything else fails validation.
pub fn operator_legal(lhs: TypeTag, op: ClauseOp, rhs: TypeTag) -> bool {
    if lhs == rhs && matches!(op, ClauseOp::Eq | ClauseOp::Ne) {
        return true;
    }
    if lhs == rhs && op.is_relational() {
        return !matches!(lhs, TypeTag::Vector | TypeTag::Set | TypeTag::Table | TypeTag::Record);
    }
    match (lhs, op, rhs) {
        (TypeTag::String, ClauseOp::Match | ClauseOp::NotMatch | ClauseOp::In | ClauseOp::NotIn, TypeTag::Pattern) => {
            true
        }
        (TypeTag::Address, ClauseOp::In | ClauseOp::NotIn, TypeTag::Subnet) => true,
        _ => false,
    }
}

/// Evaluate `candidate op target` directly, used by container indexes
/// (§4.3: "position i is set iff any element satisfies the predicate")
/// where the element-per-position fan-out rules out a precomputed
/// bitmap per element.
pub fn value_matches(op: ClauseOp, candidate: &Value, target: &Value) -> Result<bool, IndexError> {
    use std::cmp::Ordering;
    match op {
        ClauseOp::Eq => Ok(candidate == target),
        ClauseOp::Ne => Ok(candidate != target),
        ClauseOp::Lt => Ok(candidate.partial_cmp(target) == Some(Ordering::Less)),
        ClauseOp::Le => Ok(matches!(
            candidate.partial_cmp(target),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )),
        ClauseOp::Gt => Ok(candidate.partial_cmp(target) == Some(Ordering::Greater)),
        ClauseOp::Ge => Ok(matches!(
            candidate.partial_cmp(target),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )),
        ClauseOp::Match | ClauseOp::NotMatch => {
            let is_match = match (candidate, target) {
                (Value::String(s), Value::Pattern(p)) => p.is_match(s),
                _ => return Err(IndexError::IllegalOperator),
            };
            Ok(if op == ClauseOp::Match { is_match } else { !is_match })
        }
        ClauseOp::In | ClauseOp::NotIn => {
            let contains = match (candidate, target) {
                (Value::Address(a), Value::Subnet(s)) => s.contains(a),
                _ => return Err(IndexError::IllegalOperator),
            };
            Ok(if op == ClauseOp::In { contains } else { !contains })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negate_table_is_involutive() {
        for op in [
            ClauseOp::Eq,
            ClauseOp::Ne,
            ClauseOp::Lt,
            ClauseOp::Le,
            ClauseOp::Gt,
            ClauseOp::Ge,
            ClauseOp::Match,
            ClauseOp::NotMatch,
            ClauseOp::In,
            ClauseOp::NotIn,
        ] {
            assert_eq!(op.negate().negate(), op);
        }
    }

    #[test]
    fn same_type_comparisons_are_legal() {
        assert!(operator_legal(TypeTag::Int, ClauseOp::Eq, TypeTag::Int));
        assert!(operator_legal(TypeTag::Duration, ClauseOp::Gt, TypeTag::Duration));
    }

    #[test]
    fn string_pattern_ops_are_legal() {
        assert!(operator_legal(TypeTag::String, ClauseOp::Match, TypeTag::Pattern));
        assert!(operator_legal(TypeTag::String, ClauseOp::NotMatch, TypeTag::Pattern));
    }

    #[test]
    fn address_in_subnet_is_legal() {
        assert!(operator_legal(TypeTag::Address, ClauseOp::In, TypeTag::Subnet));
        assert!(operator_legal(TypeTag::Address, ClauseOp::NotIn, TypeTag::Subnet));
    }

    #[test]
    fn cross_type_is_illegal() {
        assert!(!operator_legal(TypeTag::Int, ClauseOp::Eq, TypeTag::UInt));
        assert!(!operator_legal(TypeTag::String, ClauseOp::Gt, TypeTag::Pattern));
    }

    #[test]
    fn container_types_are_not_relationally_comparable() {
        assert!(!operator_legal(TypeTag::Vector, ClauseOp::Lt, TypeTag::Vector));
        assert!(operator_legal(TypeTag::Vector, ClauseOp::Eq, TypeTag::Vector));
    }
}
