//! Bit-sliced arithmetic index for `int`/`uint`/`double`/`duration`/
//! `time_point` (§4.3).
//!
//! Equality is a `HashMap<u64, Bitmap>` keyed by an order-preserving
//! 64-bit encoding of the value; ranges are answered by a parallel
//! `Vec<Bitmap>`, one bitmap per bit of that encoding (`bits[0]` is the
//! most significant), decomposing an inequality into a single pass over
//! the 64 slices — at most `2 * width` bitmap operations per §4.3.

use std::collections::HashMap;

use vast_bitmap::{self as bm, Bitmap};
use vast_value::{TypeTag, Value};

use crate::error::IndexError;
use crate::op::ClauseOp;
use crate::value_index::ValueIndex;

const WIDTH: u32 = 64;

/// Which primitive numeric type this index was built for; fixes how
/// `Value`s are extracted and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    Int,
    UInt,
    Double,
    Duration,
    TimePoint,
}

impl NumKind {
    fn type_tag(self) -> TypeTag {
        match self {
            NumKind::Int => TypeTag::Int,
            NumKind::UInt => TypeTag::UInt,
            NumKind::Double => TypeTag::Double,
            NumKind::Duration => TypeTag::Duration,
            NumKind::TimePoint => TypeTag::TimePoint,
        }
    }

    /// Order-preserving unsigned encoding: flipping the sign bit for
    /// signed integers and, for floats, flipping all bits when negative
    /// (else just the sign bit) are the standard tricks that make
    /// unsigned-integer bit-slice comparison agree with the type's
    /// native ordering.
    fn encode(self, value: &Value) -> Result<u64, IndexError> {
        let mismatch = || IndexError::TypeMismatch {
            expected: "arithmetic",
            actual: value.type_tag(),
        };
        match (self, value) {
            (NumKind::Int, Value::Int(i)) => Ok((*i as u64) ^ (1u64 << 63)),
            (NumKind::UInt, Value::UInt(u)) => Ok(*u),
            (NumKind::Double, Value::Double(d)) => Ok(encode_f64(*d)),
            (NumKind::Duration, Value::Duration(d)) => Ok((d.as_nanos() as u64) ^ (1u64 << 63)),
            (NumKind::TimePoint, Value::TimePoint(t)) => {
                Ok((t.as_nanos_since_epoch() as u64) ^ (1u64 << 63))
            }
            _ => Err(mismatch()),
        }
    }
}

fn encode_f64(d: f64) -> u64 {
    let bits = d.to_bits();
    if d.is_sign_negative() {
        !bits
    } else {
        bits ^ (1u64 << 63)
    }
}

pub struct ArithmeticIndex {
    kind: NumKind,
    universe: Bitmap,
    equality: HashMap<u64, Bitmap>,
    /// `bits[i]` carries bit `i` (MSB-first) of the encoding, for every
    /// position pushed so far.
    bits: Vec<Bitmap>,
    len: u64,
}

impl ArithmeticIndex {
    pub fn new(kind: NumKind) -> Self {
        Self {
            kind,
            universe: Bitmap::new(),
            equality: HashMap::new(),
            bits: (0..WIDTH).map(|_| Bitmap::new()).collect(),
            len: 0,
        }
    }

    fn bit_of(key: u64, i: u32) -> bool {
        (key >> (WIDTH - 1 - i)) & 1 != 0
    }

    /// `value < key` as a bitmap, via the bit-sliced walk of the module
    /// doc comment. Masked by `universe` by the caller.
    fn less_than(&self, key: u64) -> Bitmap {
        let mut result = Bitmap::zeros(self.len);
        let mut prefix_eq = Bitmap::ones(self.len);
        for i in 0..WIDTH {
            let key_bit = Self::bit_of(key, i);
            let data_bit = &self.bits[i as usize];
            if key_bit {
                let lt_here = bm::and(&prefix_eq, &bm::not(data_bit));
                result = bm::or(&result, &lt_here);
                prefix_eq = bm::and(&prefix_eq, data_bit);
            } else {
                prefix_eq = bm::and(&prefix_eq, &bm::not(data_bit));
            }
        }
        result
    }

    fn equal_to(&self, key: u64) -> Bitmap {
        self.equality
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Bitmap::zeros(self.len))
    }
}

impl ValueIndex for ArithmeticIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        if position != self.len {
            return Err(IndexError::OutOfOrder {
                expected: self.len,
                actual: position,
            });
        }
        match value {
            Some(v) => {
                let key = self.kind.encode(v)?;
                self.universe.append_bits(true, 1);
                for i in 0..WIDTH {
                    self.bits[i as usize].append_bits(Self::bit_of(key, i), 1);
                }
                for (k, eq_bm) in self.equality.iter_mut() {
                    eq_bm.append_bits(*k == key, 1);
                }
                self.equality
                    .entry(key)
                    .or_insert_with(|| Bitmap::zeros(self.len))
                    .append_bits(true, 1);
            }
            None => {
                self.universe.append_bits(false, 1);
                for i in 0..WIDTH {
                    self.bits[i as usize].append_bits(false, 1);
                }
                for eq_bm in self.equality.values_mut() {
                    eq_bm.append_bits(false, 1);
                }
            }
        }
        self.len += 1;
        Ok(())
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        if value.type_tag() != Some(self.kind.type_tag()) {
            return Err(IndexError::TypeMismatch {
                expected: "arithmetic",
                actual: value.type_tag(),
            });
        }
        let key = self.kind.encode(value)?;
        let result = match op {
            ClauseOp::Eq => self.equal_to(key),
            ClauseOp::Ne => bm::and(&self.universe, &bm::not(&self.equal_to(key))),
            ClauseOp::Lt => bm::and(&self.universe, &self.less_than(key)),
            ClauseOp::Le => bm::and(
                &self.universe,
                &bm::or(&self.less_than(key), &self.equal_to(key)),
            ),
            ClauseOp::Gt => {
                let le = bm::or(&self.less_than(key), &self.equal_to(key));
                bm::and(&self.universe, &bm::not(&le))
            }
            ClauseOp::Ge => bm::and(&self.universe, &bm::not(&self.less_than(key))),
            ClauseOp::Match | ClauseOp::NotMatch | ClauseOp::In | ClauseOp::NotIn => {
                return Err(IndexError::IllegalOperator)
            }
        };
        Ok(result)
    }

    fn universe(&self) -> &Bitmap {
        &self.universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(values: &[Option<i64>]) -> ArithmeticIndex {
        let mut idx = ArithmeticIndex::new(NumKind::Int);
        for (i, v) in values.iter().enumerate() {
            idx.push(i as u64, v.map(Value::Int).as_ref()).unwrap();
        }
        idx
    }

    #[test]
    fn equality_lookup() {
        let idx = build(&[Some(1), Some(2), Some(1), None]);
        let eq1 = idx.lookup(ClauseOp::Eq, &Value::Int(1)).unwrap();
        assert_eq!(eq1.count_ones(), 2);
        assert!(eq1.get(0));
        assert!(!eq1.get(1));
        assert!(eq1.get(2));
    }

    #[test]
    fn not_equal_excludes_missing_positions() {
        let idx = build(&[Some(1), Some(2), None]);
        let ne = idx.lookup(ClauseOp::Ne, &Value::Int(1)).unwrap();
        assert!(!ne.get(0));
        assert!(ne.get(1));
        assert!(!ne.get(2)); // missing value never satisfies !=
    }

    #[test]
    fn missing_values_never_satisfy_lt_or_le() {
        // A missing value encodes as all-zero bit slices, which sorts below
        // almost every real key -- without the universe mask it would wrongly
        // read as "less than" anything.
        let idx = build(&[Some(1), None, Some(5)]);
        let lt = idx.lookup(ClauseOp::Lt, &Value::Int(5)).unwrap();
        assert!(lt.get(0));
        assert!(!lt.get(1));
        assert!(!lt.get(2));

        let le = idx.lookup(ClauseOp::Le, &Value::Int(5)).unwrap();
        assert!(le.get(0));
        assert!(!le.get(1));
        assert!(le.get(2));
    }

    #[test]
    fn range_queries_match_native_ordering() {
        let idx = build(&[Some(-5), Some(0), Some(3), Some(10)]);
        let lt = idx.lookup(ClauseOp::Lt, &Value::Int(3)).unwrap();
        assert!(lt.get(0) && lt.get(1) && !lt.get(2) && !lt.get(3));

        let ge = idx.lookup(ClauseOp::Ge, &Value::Int(3)).unwrap();
        assert!(!ge.get(0) && !ge.get(1) && ge.get(2) && ge.get(3));

        let le = idx.lookup(ClauseOp::Le, &Value::Int(3)).unwrap();
        assert!(le.get(0) && le.get(1) && le.get(2) && !le.get(3));

        let gt = idx.lookup(ClauseOp::Gt, &Value::Int(3)).unwrap();
        assert!(!gt.get(0) && !gt.get(1) && !gt.get(2) && gt.get(3));
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let idx = build(&[Some(1)]);
        assert!(idx.lookup(ClauseOp::Eq, &Value::UInt(1)).is_err());
    }

    #[test]
    fn scenario_three_from_spec_durations() {
        use vast_value::Duration;
        let mut idx = ArithmeticIndex::new(NumKind::Duration);
        idx.push(0, Some(&Value::Duration(Duration::from_secs_f64(1.5))))
            .unwrap();
        idx.push(1, Some(&Value::Duration(Duration::from_secs_f64(0.5))))
            .unwrap();
        idx.push(2, Some(&Value::Duration(Duration::from_secs_f64(2.0))))
            .unwrap();

        let gt1s = idx
            .lookup(ClauseOp::Gt, &Value::Duration(Duration::from_secs_f64(1.0)))
            .unwrap();
        assert!(gt1s.get(0));
        assert!(!gt1s.get(1));
        assert!(gt1s.get(2));
    }
}
