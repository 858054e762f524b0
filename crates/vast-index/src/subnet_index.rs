//! Index over `subnet` fields (rare — subnets usually appear as query
//! literals, not stored field values, but §4.3's "same-type comparisons
//! are always legal" covers `subnet == subnet` too). Equality-only, same
//! `EqualityIndex` backing as [`crate::bool_index::BoolIndex`].

use vast_bitmap::Bitmap;
use vast_value::{Subnet, Value};

use crate::equality_index::EqualityIndex;
use crate::error::IndexError;
use crate::op::ClauseOp;
use crate::value_index::ValueIndex;

pub struct SubnetIndex(EqualityIndex<Subnet>);

impl SubnetIndex {
    pub fn new() -> Self {
        Self(EqualityIndex::new())
    }
}

impl Default for SubnetIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for SubnetIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        let key = match value {
            Some(Value::Subnet(s)) => Some(*s),
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "subnet",
                    actual: other.type_tag(),
                })
            }
            None => None,
        };
        self.0.push(position, key)
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        let Value::Subnet(s) = value else {
            return Err(IndexError::IllegalOperator);
        };
        match op {
            ClauseOp::Eq => Ok(self.0.equal_to(s)),
            ClauseOp::Ne => Ok(self.0.not_equal_to(s)),
            _ => Err(IndexError::IllegalOperator),
        }
    }

    fn universe(&self) -> &Bitmap {
        self.0.universe()
    }
}
