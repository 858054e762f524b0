//! String equality and pattern-matched lookups (§4.3).

use std::collections::HashMap;

use vast_bitmap::{self as bm, Bitmap};
use vast_value::Value;

use crate::error::IndexError;
use crate::op::ClauseOp;
use crate::value_index::ValueIndex;

pub struct StringIndex {
    universe: Bitmap,
    equality: HashMap<String, Bitmap>,
    len: u64,
}

impl StringIndex {
    pub fn new() -> Self {
        Self {
            universe: Bitmap::new(),
            equality: HashMap::new(),
            len: 0,
        }
    }

    fn equal_to(&self, key: &str) -> Bitmap {
        self.equality
            .get(key)
            .cloned()
            .unwrap_or_else(|| Bitmap::zeros(self.len))
    }
}

impl Default for StringIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for StringIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        if position != self.len {
            return Err(IndexError::OutOfOrder {
                expected: self.len,
                actual: position,
            });
        }
        match value {
            Some(Value::String(s)) => {
                self.universe.append_bits(true, 1);
                for (k, eq_bm) in self.equality.iter_mut() {
                    eq_bm.append_bits(k == s, 1);
                }
                self.equality
                    .entry(s.clone())
                    .or_insert_with(|| Bitmap::zeros(self.len))
                    .append_bits(true, 1);
            }
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "string",
                    actual: other.type_tag(),
                })
            }
            None => {
                self.universe.append_bits(false, 1);
                for eq_bm in self.equality.values_mut() {
                    eq_bm.append_bits(false, 1);
                }
            }
        }
        self.len += 1;
        Ok(())
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        match (op, value) {
            (ClauseOp::Eq, Value::String(s)) => Ok(self.equal_to(s)),
            (ClauseOp::Ne, Value::String(s)) => {
                Ok(bm::and(&self.universe, &bm::not(&self.equal_to(s))))
            }
            (ClauseOp::Match, Value::Pattern(p)) => Ok(self.scan_matching(p)),
            (ClauseOp::NotMatch, Value::Pattern(p)) => {
                Ok(bm::and(&self.universe, &bm::not(&self.scan_matching(p))))
            }
            _ => Err(IndexError::IllegalOperator),
        }
    }

    fn universe(&self) -> &Bitmap {
        &self.universe
    }
}

impl StringIndex {
    /// Linear scan over distinct keys, OR-ing the bitmaps of keys the
    /// pattern matches (§4.3: "Pattern ... linear scan over keys applying
    /// the regex, ORing their bitmaps").
    fn scan_matching(&self, pattern: &vast_value::Pattern) -> Bitmap {
        let mut result = Bitmap::zeros(self.len);
        for (key, bitmap) in &self.equality {
            if pattern.is_match(key) {
                result = bm::or(&result, bitmap);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_value::Pattern;

    #[test]
    fn scenario_six_from_spec_name_pattern() {
        let mut idx = StringIndex::new();
        for name in ["http_req", "dns", "http_resp"] {
            let i = idx.len;
            idx.push(i, Some(&Value::String(name.to_string()))).unwrap();
        }
        let bitmap = idx
            .lookup(ClauseOp::Match, &Value::Pattern(Pattern::new("http.*").unwrap()))
            .unwrap();
        assert!(bitmap.get(0));
        assert!(!bitmap.get(1));
        assert!(bitmap.get(2));
    }

    #[test]
    fn not_match_is_complement_masked_by_universe() {
        let mut idx = StringIndex::new();
        idx.push(0, Some(&Value::String("http_req".into()))).unwrap();
        idx.push(1, None).unwrap();
        let bitmap = idx
            .lookup(ClauseOp::NotMatch, &Value::Pattern(Pattern::new("http.*").unwrap()))
            .unwrap();
        assert!(!bitmap.get(0));
        assert!(!bitmap.get(1)); // missing value never matches, positive or negated
    }

    #[test]
    fn equality_and_inequality() {
        let mut idx = StringIndex::new();
        idx.push(0, Some(&Value::String("a".into()))).unwrap();
        idx.push(1, Some(&Value::String("b".into()))).unwrap();
        let eq = idx.lookup(ClauseOp::Eq, &Value::String("a".into())).unwrap();
        assert!(eq.get(0) && !eq.get(1));
        let ne = idx.lookup(ClauseOp::Ne, &Value::String("a".into())).unwrap();
        assert!(!ne.get(0) && ne.get(1));
    }
}
