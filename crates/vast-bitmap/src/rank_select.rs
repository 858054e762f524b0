//! Rank and select over a whole [`Bitmap`], built on the word-level
//! primitives of [`crate::word`] (§4.1, §4.2). Both take an explicit
//! `bit` so callers can ask for either value, per SPEC_FULL §1.5's
//! `rank(bitmap, i, bit)` / `select(bitmap, i, bit)` contract (needed by
//! §8 invariant 2: `rank<true>(B,i) + rank<false>(B,i) = i + 1`).

use crate::bitmap::Bitmap;
use crate::block::Bits;
use crate::word;

/// Number of bits equal to `bit` in a whole block.
fn block_count(blk: Bits, bit: bool) -> u64 {
    match blk {
        Bits::Fill { value, len } => {
            if value == bit {
                len
            } else {
                0
            }
        }
        Bits::Literal { word, len } => {
            let ones = word::popcount(word::lsb_fill(word, len)) as u64;
            if bit {
                ones
            } else {
                len as u64 - ones
            }
        }
    }
}

/// Number of `bit`-bits in `[0, i]` (inclusive). Asserts `i < bm.size()`
/// (out-of-range rank is a precondition violation, not a recoverable
/// error).
pub fn rank(bm: &Bitmap, i: u64, bit: bool) -> u64 {
    assert!(i < bm.size(), "rank index {i} out of range (size {})", bm.size());

    let mut offset = 0u64;
    let mut count = 0u64;
    for blk in bm.bit_range() {
        let len = blk.len();
        if offset + len <= i {
            count += block_count(blk, bit);
            offset += len;
            continue;
        }

        // The target position falls inside this block.
        let local = i - offset;
        count += match blk {
            Bits::Fill { value, .. } => {
                if value == bit {
                    local + 1
                } else {
                    0
                }
            }
            Bits::Literal { word, .. } => {
                let w = if bit { word } else { !word };
                word::rank(w, local as u32) as u64
            }
        };
        break;
    }
    count
}

/// Absolute position of the `i`-th `bit`-bit (1-based count), or `None`
/// if the bitmap has fewer than `i` such bits. Asserts `i > 0` (select
/// is 1-based by definition; `i == 0` is a precondition violation).
pub fn select(bm: &Bitmap, i: u64, bit: bool) -> Option<u64> {
    assert!(i > 0, "select index must be 1-based (got 0)");

    let mut offset = 0u64;
    let mut remaining = i;
    for blk in bm.bit_range() {
        let len = blk.len();
        let matches_here = block_count(blk, bit);

        if remaining > matches_here {
            remaining -= matches_here;
            offset += len;
            continue;
        }

        return match blk {
            Bits::Fill { .. } => Some(offset + remaining - 1),
            Bits::Literal { word, len } => {
                let w = if bit { word } else { word::lsb_fill(!word, len) };
                let local = word::select(w, remaining as u32);
                if local == word::NPOS {
                    None
                } else {
                    Some(offset + local as u64)
                }
            }
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bitmap {
        let mut bm = Bitmap::new();
        bm.append_bits(true, 2);
        bm.append_bits(false, 6);
        bm.append_bits(true, 1); // position 8: [1,1,0,0,0,0,0,0,1]
        bm
    }

    #[test]
    fn rank_matches_scenario_one() {
        let bm = sample();
        assert_eq!(rank(&bm, 0, true), 1);
        assert_eq!(rank(&bm, 1, true), 2);
        assert_eq!(rank(&bm, 7, true), 2);
        assert_eq!(rank(&bm, 8, true), 3);
    }

    #[test]
    fn select_matches_scenario_one() {
        let bm = sample();
        assert_eq!(select(&bm, 1, true), Some(0));
        assert_eq!(select(&bm, 2, true), Some(1));
        assert_eq!(select(&bm, 3, true), Some(8));
        assert_eq!(select(&bm, 4, true), None);
    }

    #[test]
    fn rank_and_select_over_a_large_fill() {
        let mut bm = Bitmap::new();
        bm.append_bits(true, 1000);
        assert_eq!(rank(&bm, 999, true), 1000);
        assert_eq!(rank(&bm, 0, true), 1);
        assert_eq!(select(&bm, 500, true), Some(499));
        assert_eq!(select(&bm, 1000, true), Some(999));
        assert_eq!(select(&bm, 1001, true), None);
    }

    #[test]
    fn rank_and_select_across_mixed_blocks() {
        let mut bm = Bitmap::new();
        bm.append_bits(false, 100);
        bm.append_block(0b1010, 4);
        bm.append_bits(true, 70);
        // ones at local positions 101, 103 within the literal, then a 70-bit fill.
        assert_eq!(rank(&bm, 100, true), 0);
        assert_eq!(rank(&bm, 101, true), 1);
        assert_eq!(rank(&bm, 103, true), 2);
        assert_eq!(select(&bm, 1, true), Some(101));
        assert_eq!(select(&bm, 2, true), Some(103));
        assert_eq!(select(&bm, 3, true), Some(104));
    }

    #[test]
    fn rank_false_is_the_complement_of_rank_true() {
        // §8 invariant 2: rank<true>(B,i) + rank<false>(B,i) = i + 1.
        let bm = sample();
        for i in 0..bm.size() {
            assert_eq!(rank(&bm, i, true) + rank(&bm, i, false), i + 1);
        }
    }

    #[test]
    fn select_false_finds_zero_bits_across_mixed_blocks() {
        let mut bm = Bitmap::new();
        bm.append_bits(true, 100);
        bm.append_block(0b0101, 4); // zeros at local positions 101, 103
        bm.append_bits(false, 70);
        assert_eq!(select(&bm, 1, false), Some(101));
        assert_eq!(select(&bm, 2, false), Some(103));
        assert_eq!(select(&bm, 3, false), Some(104));
    }

    #[test]
    fn select_false_over_a_large_fill() {
        let bm = Bitmap::zeros(1000);
        assert_eq!(select(&bm, 1, false), Some(0));
        assert_eq!(select(&bm, 1000, false), Some(999));
        assert_eq!(select(&bm, 1001, false), None);
    }

    #[test]
    #[should_panic]
    fn rank_out_of_range_asserts() {
        let bm = Bitmap::zeros(10);
        rank(&bm, 10, true);
    }

    #[test]
    #[should_panic]
    fn select_zero_asserts() {
        let bm = Bitmap::ones(10);
        select(&bm, 0, true);
    }
}
