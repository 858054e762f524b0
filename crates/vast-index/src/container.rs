//! Indexes over `vector`, `set`, and `table` fields (§4.3).
//!
//! A single outer event position can hold many container elements, so
//! the one-bitmap-per-position model the scalar indexes use does not
//! carry over: `lookup` cannot hand back a precomputed bitmap, since
//! "satisfies the predicate" is a property of the *container*, not of
//! a single indexed value. Instead these indexes keep the raw element
//! values per position and evaluate the predicate against each element
//! directly via [`crate::op::value_matches`] at lookup time, then OR
//! the per-position results together — §4.3's "position i is set iff
//! any element satisfies the predicate", computed on demand rather than
//! precomputed. This trades the bitmap algebra's O(width) lookup cost
//! for an O(containers × elements) scan, which is the deliberate
//! simplification recorded in DESIGN.md.

use vast_bitmap::Bitmap;
use vast_value::Value;

use crate::error::IndexError;
use crate::op::{value_matches, ClauseOp};
use crate::value_index::ValueIndex;

/// Shared machinery for the three container kinds; `extract` picks the
/// element sequence out of the variant each kind stores in.
struct ContainerStore {
    universe: Bitmap,
    elements: Vec<Option<Vec<Value>>>,
}

impl ContainerStore {
    fn new() -> Self {
        Self {
            universe: Bitmap::new(),
            elements: Vec::new(),
        }
    }

    fn push(&mut self, position: u64, elements: Option<Vec<Value>>) -> Result<(), IndexError> {
        let expected = self.elements.len() as u64;
        if position != expected {
            return Err(IndexError::OutOfOrder {
                expected,
                actual: position,
            });
        }
        self.universe.append_bits(elements.is_some(), 1);
        self.elements.push(elements);
        Ok(())
    }

    fn lookup(&self, op: ClauseOp, target: &Value) -> Result<Bitmap, IndexError> {
        let mut result = Bitmap::zeros(self.elements.len() as u64);
        for (i, elements) in self.elements.iter().enumerate() {
            let Some(elements) = elements else { continue };
            let mut hit = false;
            for candidate in elements {
                if value_matches(op, candidate, target)? {
                    hit = true;
                    break;
                }
            }
            if hit {
                result = set_bit(result, i as u64);
            }
        }
        Ok(result)
    }
}

fn set_bit(bitmap: Bitmap, i: u64) -> Bitmap {
    let mut bits: Vec<bool> = (0..bitmap.size()).map(|p| bitmap.get(p)).collect();
    bits[i as usize] = true;
    let mut out = Bitmap::new();
    for b in bits {
        out.append_bits(b, 1);
    }
    out
}

pub struct VectorIndex(ContainerStore);

impl VectorIndex {
    pub fn new() -> Self {
        Self(ContainerStore::new())
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for VectorIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        let elements = match value {
            Some(Value::Vector(items)) => Some(items.clone()),
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "vector",
                    actual: other.type_tag(),
                })
            }
            None => None,
        };
        self.0.push(position, elements)
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        self.0.lookup(op, value)
    }

    fn universe(&self) -> &Bitmap {
        &self.0.universe
    }
}

pub struct SetIndex(ContainerStore);

impl SetIndex {
    pub fn new() -> Self {
        Self(ContainerStore::new())
    }
}

impl Default for SetIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for SetIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        let elements = match value {
            Some(Value::Set(items)) => Some(items.clone()),
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "set",
                    actual: other.type_tag(),
                })
            }
            None => None,
        };
        self.0.push(position, elements)
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        self.0.lookup(op, value)
    }

    fn universe(&self) -> &Bitmap {
        &self.0.universe
    }
}

/// A table's elements are flattened `(key, value)` pairs; `value_matches`
/// is tried against whichever side `target`'s type matches, so `table
/// contains 80/tcp` or `table contains "admin"` both work without the
/// caller distinguishing key from value columns.
pub struct TableIndex(ContainerStore);

impl TableIndex {
    pub fn new() -> Self {
        Self(ContainerStore::new())
    }
}

impl Default for TableIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for TableIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        let elements = match value {
            Some(Value::Table(rows)) => {
                let mut flat = Vec::with_capacity(rows.len() * 2);
                for (k, v) in rows {
                    flat.push(k.clone());
                    flat.push(v.clone());
                }
                Some(flat)
            }
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "table",
                    actual: other.type_tag(),
                })
            }
            None => None,
        };
        self.0.push(position, elements)
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        self.0.lookup(op, value)
    }

    fn universe(&self) -> &Bitmap {
        &self.0.universe
    }
}
