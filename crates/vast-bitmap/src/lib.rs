//! Word-level bit engine and compressed bitvector.
//!
//! A [`Bitmap`] is an ordered sequence of [`Bits`] blocks: homogeneous
//! fills and literal words. Bitwise combination, rank and select are all
//! defined in terms of a single pass over that block sequence, so none
//! of them ever materialize an uncompressed bit array.

pub mod bitmap;
pub mod block;
pub mod combine;
pub mod rank_select;
pub mod word;

pub use bitmap::Bitmap;
pub use block::Bits;
pub use combine::{and, bitmap_apply, nand, nor, not, or, xor, Op};
pub use rank_select::{rank, select};
