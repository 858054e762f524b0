//! Bitwise combination of two bitmaps (§4.2 `bitmap_apply`).

use crate::bitmap::Bitmap;
use crate::block::Bits;
use crate::word::{self, WIDTH};

/// A binary bitwise operator, carrying both its word-level and bit-level
/// semantics (the latter used when combining two homogeneous fills, where
/// the combined run must itself be homogeneous).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
    Xor,
    Nand,
    Nor,
}

impl Op {
    #[inline]
    fn apply_word(self, l: u64, r: u64) -> u64 {
        match self {
            Op::And => l & r,
            Op::Or => l | r,
            Op::Xor => l ^ r,
            Op::Nand => !(l & r),
            Op::Nor => !(l | r),
        }
    }

    #[inline]
    fn apply_bit(self, l: bool, r: bool) -> bool {
        match self {
            Op::And => l && r,
            Op::Or => l || r,
            Op::Xor => l ^ r,
            Op::Nand => !(l && r),
            Op::Nor => !(l || r),
        }
    }

    /// `(fill_l, fill_r)` per the binding table in §4.2: whether, when the
    /// named side exhausts first, the *other* side's remaining blocks are
    /// drained into the result verbatim (vs. stopping and letting the
    /// final zero-extension supply implicit zeros).
    #[inline]
    fn fill_flags(self) -> (bool, bool) {
        match self {
            Op::And => (false, false),
            Op::Or => (true, true),
            Op::Xor => (true, true),
            Op::Nand => (true, false),
            Op::Nor => (true, true),
        }
    }
}

/// A block together with how many of its bits remain unconsumed.
struct Cursor<I> {
    iter: I,
    current: Option<Bits>,
    remaining: u64,
}

impl<I: Iterator<Item = Bits>> Cursor<I> {
    fn new(mut iter: I) -> Self {
        let current = iter.next();
        let remaining = current.map(|b| b.len()).unwrap_or(0);
        Self {
            iter,
            current,
            remaining,
        }
    }

    fn reload_if_exhausted(&mut self) {
        if self.remaining == 0 {
            self.current = self.iter.next();
            self.remaining = self.current.map(|b| b.len()).unwrap_or(0);
        }
    }
}

/// Whether a block should be treated as a fill for combination purposes:
/// homogeneous *and* at least one word wide, per §4.2 step 1's guard
/// `homogeneous() && size >= W`.
fn is_fill_like(b: &Bits) -> bool {
    b.homogeneous() && b.len() >= WIDTH as u64
}

/// Combine `lhs` and `rhs` with `op`, per the four-case walk of §4.2.
pub fn bitmap_apply(lhs: &Bitmap, rhs: &Bitmap, op: Op) -> Bitmap {
    let (fill_l, fill_r) = op.fill_flags();
    let mut out = Bitmap::new();

    let mut l = Cursor::new(lhs.bit_range());
    let mut r = Cursor::new(rhs.bit_range());

    loop {
        l.reload_if_exhausted();
        r.reload_if_exhausted();

        match (l.current, r.current) {
            (None, None) => break,
            (Some(_), None) => {
                if fill_r {
                    drain_remainder(&mut out, &mut l);
                }
                break;
            }
            (None, Some(_)) => {
                if fill_l {
                    drain_remainder(&mut out, &mut r);
                }
                break;
            }
            (Some(lb), Some(rb)) => {
                let l_fill = is_fill_like(&lb);
                let r_fill = is_fill_like(&rb);

                if l_fill && r_fill {
                    let take = l.remaining.min(r.remaining);
                    let value = op.apply_bit(lb.uniform_value(), rb.uniform_value());
                    out.append_bits(value, take);
                    l.remaining -= take;
                    r.remaining -= take;
                } else if l_fill || r_fill {
                    let (fill_side, lit_side, fill_val) = if l_fill {
                        (&mut l, &mut r, lb.uniform_value())
                    } else {
                        (&mut r, &mut l, rb.uniform_value())
                    };
                    let lit_block = lit_side.current.unwrap();
                    let lit_full_word = match lit_block {
                        Bits::Literal { word, .. } => word,
                        Bits::Fill { value, .. } => {
                            if value {
                                word::lsb_mask(lit_side.remaining as u32)
                            } else {
                                0
                            }
                        }
                    };
                    // A fill cursor that survived a prior both-fill step may
                    // hold fewer bits than the literal it now meets, so take
                    // only as many bits as the fill side actually has left
                    // rather than assuming the literal's full remaining length.
                    let take = fill_side.remaining.min(lit_side.remaining) as u32;
                    let lit_word = word::lsb_fill(lit_full_word, take);
                    let fill_word = if fill_val { word::lsb_mask(take) } else { 0 };
                    let (word_l, word_r) = if l_fill {
                        (fill_word, lit_word)
                    } else {
                        (lit_word, fill_word)
                    };
                    let result = word::lsb_fill(op.apply_word(word_l, word_r), take);
                    out.append_block(result, take);

                    fill_side.remaining -= take as u64;
                    lit_side.remaining -= take as u64;
                    if lit_side.remaining > 0 {
                        // Bits [0, take) of the literal are consumed; shift
                        // the rest down so next round sees them at position 0.
                        lit_side.current = Some(Bits::Literal {
                            word: lit_full_word >> take,
                            len: lit_side.remaining as u32,
                        });
                    }
                } else {
                    let llen = l.remaining as u32;
                    let rlen = r.remaining as u32;
                    let lword = match lb {
                        Bits::Literal { word, .. } => word,
                        Bits::Fill { .. } => unreachable!("non-fill branch"),
                    };
                    let rword = match rb {
                        Bits::Literal { word, .. } => word,
                        Bits::Fill { .. } => unreachable!("non-fill branch"),
                    };
                    let out_len = llen.max(rlen);
                    let result = word::lsb_fill(op.apply_word(lword, rword), out_len);
                    out.append_block(result, out_len);
                    l.remaining = 0;
                    r.remaining = 0;
                }
            }
        }
    }

    let target = lhs.size().max(rhs.size());
    if out.size() < target {
        out.append_bits(false, target - out.size());
    }
    out
}

fn drain_remainder<I: Iterator<Item = Bits>>(out: &mut Bitmap, cursor: &mut Cursor<I>) {
    loop {
        cursor.reload_if_exhausted();
        let Some(blk) = cursor.current else { break };
        match blk {
            Bits::Fill { value, .. } => out.append_bits(value, cursor.remaining),
            Bits::Literal { word, .. } => out.append_block(word, cursor.remaining as u32),
        }
        cursor.remaining = 0;
    }
}

pub fn and(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    bitmap_apply(lhs, rhs, Op::And)
}

pub fn or(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    bitmap_apply(lhs, rhs, Op::Or)
}

pub fn xor(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    bitmap_apply(lhs, rhs, Op::Xor)
}

pub fn nand(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    bitmap_apply(lhs, rhs, Op::Nand)
}

pub fn nor(lhs: &Bitmap, rhs: &Bitmap) -> Bitmap {
    bitmap_apply(lhs, rhs, Op::Nor)
}

/// Bitwise complement, preserving length. Expressed as a dedicated walk
/// rather than a degenerate binary call (e.g. `nand(a, a)`), since the
/// latter is not obviously a complement to a reader.
pub fn not(bm: &Bitmap) -> Bitmap {
    let mut out = Bitmap::new();
    for blk in bm.bit_range() {
        match blk {
            Bits::Fill { value, len } => out.append_bits(!value, len),
            Bits::Literal { word, len } => {
                out.append_block(word::lsb_fill(!word, len), len);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_two_from_spec() {
        // A = 110^64 times 0, then 00  (i.e. 64 zeros then two zeros == 66 zeros total minus... )
        // Spec: "A = 110^64 times 0" then "00" -- read as: A is a fill of 64 zero-bits, then two
        // literal zero bits, size 66, all zero.
        let mut a = Bitmap::new();
        a.append_bits(false, 64);
        a.append_bits(false, 2);

        // B = 0^64 times 1, then 11 -- a fill of 64 one-bits, then two literal one-bits.
        let mut b = Bitmap::new();
        b.append_bits(true, 64);
        b.append_bits(true, 2);

        let result = or(&a, &b);
        assert_eq!(result.size(), 66);
        assert_eq!(result.count_ones(), 66);
    }

    #[test]
    fn partially_consumed_fill_meeting_a_literal_does_not_underflow() {
        // a: a single 65-bit zero fill.
        let a = Bitmap::zeros(65);

        // b: a 64-bit one-fill followed by a 2-bit literal, so the first
        // both-fill step leaves a's cursor with only 1 bit remaining when
        // it then meets b's trailing literal block.
        let mut b = Bitmap::new();
        b.append_bits(true, 64);
        b.append_block(0b11, 2);

        let result = and(&a, &b);
        assert_eq!(result.size(), 66);
        assert_eq!(result.count_ones(), 0);
    }

    #[test]
    fn and_self_is_identity() {
        let mut a = Bitmap::new();
        a.append_bits(true, 10);
        a.append_bits(false, 200);
        a.append_block(0b1011, 4);
        let aa = and(&a, &a);
        assert_eq!(aa.size(), a.size());
        assert_eq!(aa.count_ones(), a.count_ones());
    }

    #[test]
    fn or_self_is_identity() {
        let mut a = Bitmap::new();
        a.append_bits(true, 5);
        a.append_bits(false, 300);
        let oo = or(&a, &a);
        assert_eq!(oo.count_ones(), a.count_ones());
    }

    #[test]
    fn xor_self_is_zero() {
        let mut a = Bitmap::new();
        a.append_bits(true, 17);
        a.append_bits(false, 500);
        a.append_block(0b1101, 4);
        let xx = xor(&a, &a);
        assert_eq!(xx.count_ones(), 0);
    }

    #[test]
    fn and_with_complement_is_zero() {
        let mut a = Bitmap::new();
        a.append_bits(true, 30);
        a.append_bits(false, 90);
        a.append_block(0b0110, 4);
        let not_a = not(&a);
        let zero = and(&a, &not_a);
        assert_eq!(zero.count_ones(), 0);
    }

    #[test]
    fn or_with_complement_is_all_ones() {
        let mut a = Bitmap::new();
        a.append_bits(true, 30);
        a.append_bits(false, 90);
        let not_a = not(&a);
        let all_ones = or(&a, &not_a);
        assert_eq!(all_ones.count_ones(), all_ones.size());
    }

    #[test]
    fn de_morgan_on_bitmaps() {
        let mut a = Bitmap::new();
        a.append_bits(true, 40);
        a.append_bits(false, 20);
        let mut b = Bitmap::new();
        b.append_bits(false, 10);
        b.append_bits(true, 50);

        let lhs = not(&and(&a, &b));
        let rhs = or(&not(&a), &not(&b));
        for i in 0..lhs.size().min(rhs.size()) {
            assert_eq!(lhs.get(i), rhs.get(i), "mismatch at {i}");
        }
    }

    #[test]
    fn combine_over_mismatched_lengths_zero_extends() {
        let mut a = Bitmap::new();
        a.append_bits(true, 5);
        let b = Bitmap::zeros(0);
        let result = or(&a, &b);
        assert_eq!(result.size(), 5);
        assert_eq!(result.count_ones(), 5);

        let result2 = and(&a, &b);
        assert_eq!(result2.size(), 5);
        assert_eq!(result2.count_ones(), 0);
    }
}
