//! Index over fields whose *declared* type is `pattern` itself (§4.3):
//! "Stores compiled regex keys; `~` returns the key's bitmap, `!~`
//! returns its complement masked by universe."

use std::collections::HashMap;

use vast_bitmap::{self as bm, Bitmap};
use vast_value::Value;

use crate::error::IndexError;
use crate::op::ClauseOp;
use crate::value_index::ValueIndex;

pub struct PatternIndex {
    universe: Bitmap,
    by_source: HashMap<String, Bitmap>,
    len: u64,
}

impl PatternIndex {
    pub fn new() -> Self {
        Self {
            universe: Bitmap::new(),
            by_source: HashMap::new(),
            len: 0,
        }
    }
}

impl Default for PatternIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for PatternIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        if position != self.len {
            return Err(IndexError::OutOfOrder {
                expected: self.len,
                actual: position,
            });
        }
        match value {
            Some(Value::Pattern(p)) => {
                self.universe.append_bits(true, 1);
                let source = p.source().to_string();
                for (k, bitmap) in self.by_source.iter_mut() {
                    bitmap.append_bits(*k == source, 1);
                }
                self.by_source
                    .entry(source)
                    .or_insert_with(|| Bitmap::zeros(self.len))
                    .append_bits(true, 1);
            }
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "pattern",
                    actual: other.type_tag(),
                })
            }
            None => {
                self.universe.append_bits(false, 1);
                for bitmap in self.by_source.values_mut() {
                    bitmap.append_bits(false, 1);
                }
            }
        }
        self.len += 1;
        Ok(())
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        let Value::Pattern(p) = value else {
            return Err(IndexError::IllegalOperator);
        };
        let matching = self
            .by_source
            .get(p.source())
            .cloned()
            .unwrap_or_else(|| Bitmap::zeros(self.len));
        match op {
            ClauseOp::Match => Ok(matching),
            ClauseOp::NotMatch => Ok(bm::and(&self.universe, &bm::not(&matching))),
            _ => Err(IndexError::IllegalOperator),
        }
    }

    fn universe(&self) -> &Bitmap {
        &self.universe
    }
}
