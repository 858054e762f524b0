//! Index over `bool` fields. §4.3 names an index type for every
//! primitive except `bool` itself (arithmetic covers `int`/`uint`/
//! `double`/`duration`/`time_point`, not two-valued fields); this is the
//! equality-only index that fills that gap, built on the same
//! `EqualityIndex` the teacher's `git-odb` prefix lookups and this
//! codebase's `SubnetIndex` both share.

use vast_bitmap::Bitmap;
use vast_value::Value;

use crate::equality_index::EqualityIndex;
use crate::error::IndexError;
use crate::op::ClauseOp;
use crate::value_index::ValueIndex;

pub struct BoolIndex(EqualityIndex<bool>);

impl BoolIndex {
    pub fn new() -> Self {
        Self(EqualityIndex::new())
    }
}

impl Default for BoolIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for BoolIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        let key = match value {
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "bool",
                    actual: other.type_tag(),
                })
            }
            None => None,
        };
        self.0.push(position, key)
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        let Value::Bool(b) = value else {
            return Err(IndexError::IllegalOperator);
        };
        match op {
            ClauseOp::Eq => Ok(self.0.equal_to(b)),
            ClauseOp::Ne => Ok(self.0.not_equal_to(b)),
            _ => Err(IndexError::IllegalOperator),
        }
    }

    fn universe(&self) -> &Bitmap {
        self.0.universe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_on_bool_fields() {
        let mut idx = BoolIndex::new();
        idx.push(0, Some(&Value::Bool(true))).unwrap();
        idx.push(1, Some(&Value::Bool(false))).unwrap();
        idx.push(2, None).unwrap();

        let eq = idx.lookup(ClauseOp::Eq, &Value::Bool(true)).unwrap();
        assert!(eq.get(0) && !eq.get(1) && !eq.get(2));
        let ne = idx.lookup(ClauseOp::Ne, &Value::Bool(true)).unwrap();
        assert!(!ne.get(0) && ne.get(1) && !ne.get(2));
    }
}
