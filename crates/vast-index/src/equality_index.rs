//! Generic key→bitmap equality store, shared by the small indexes that
//! only ever need `==`/`!=` semantics. `StringIndex` and `PatternIndex`
//! carry the same shape plus their own pattern-matching lookups; this is
//! the bare version for types that don't need one.

use std::collections::HashMap;
use std::hash::Hash;

use vast_bitmap::{self as bm, Bitmap};

use crate::error::IndexError;

pub(crate) struct EqualityIndex<K> {
    universe: Bitmap,
    equality: HashMap<K, Bitmap>,
    len: u64,
}

impl<K: Eq + Hash + Clone> EqualityIndex<K> {
    pub(crate) fn new() -> Self {
        Self {
            universe: Bitmap::new(),
            equality: HashMap::new(),
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, position: u64, key: Option<K>) -> Result<(), IndexError> {
        if position != self.len {
            return Err(IndexError::OutOfOrder {
                expected: self.len,
                actual: position,
            });
        }
        match key {
            Some(k) => {
                self.universe.append_bits(true, 1);
                for (existing, bitmap) in self.equality.iter_mut() {
                    bitmap.append_bits(*existing == k, 1);
                }
                self.equality
                    .entry(k)
                    .or_insert_with(|| Bitmap::zeros(self.len))
                    .append_bits(true, 1);
            }
            None => {
                self.universe.append_bits(false, 1);
                for bitmap in self.equality.values_mut() {
                    bitmap.append_bits(false, 1);
                }
            }
        }
        self.len += 1;
        Ok(())
    }

    pub(crate) fn equal_to(&self, key: &K) -> Bitmap {
        self.equality
            .get(key)
            .cloned()
            .unwrap_or_else(|| Bitmap::zeros(self.len))
    }

    pub(crate) fn not_equal_to(&self, key: &K) -> Bitmap {
        bm::and(&self.universe, &bm::not(&self.equal_to(key)))
    }

    pub(crate) fn universe(&self) -> &Bitmap {
        &self.universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_and_not_equal_are_complements_within_universe() {
        let mut idx: EqualityIndex<u8> = EqualityIndex::new();
        idx.push(0, Some(1)).unwrap();
        idx.push(1, Some(2)).unwrap();
        idx.push(2, None).unwrap();

        let eq = idx.equal_to(&1);
        assert!(eq.get(0) && !eq.get(1) && !eq.get(2));
        let ne = idx.not_equal_to(&1);
        assert!(!ne.get(0) && ne.get(1) && !ne.get(2));
    }
}
