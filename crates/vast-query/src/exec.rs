//! Combination of per-leaf bitmaps into a final result (§4.4
//! "Execution"): `AND`/`OR` over the boolean tree, length-aligned to the
//! current event count (missing positions count as false), enumerated
//! into matching `EventId`s via `select`.

use vast_bitmap::{self as bm, select, Bitmap};
use vast_value::EventId;

use crate::ast::BinaryQueryOp;
use crate::plan::{Combinator, Plan};

/// Combine every leaf's already-resolved bitmap (indexed by
/// [`crate::plan::LeafQuery::id`]) according to `plan`'s combinator.
/// `event_count` is the current number of events in the archive;
/// shorter leaf bitmaps are zero-extended so a field with no value at
/// the tail of the archive reads as "missing" rather than panicking.
pub fn combine(plan: &Plan, results: &[Bitmap], event_count: u64) -> Bitmap {
    combine_node(&plan.combinator, results, event_count)
}

fn combine_node(node: &Combinator, results: &[Bitmap], event_count: u64) -> Bitmap {
    match node {
        Combinator::Leaf(id) => align(&results[*id], event_count),
        Combinator::Binary(lhs, op, rhs) => {
            let l = combine_node(lhs, results, event_count);
            let r = combine_node(rhs, results, event_count);
            match op {
                BinaryQueryOp::And => bm::and(&l, &r),
                BinaryQueryOp::Or => bm::or(&l, &r),
            }
        }
    }
}

fn align(bitmap: &Bitmap, event_count: u64) -> Bitmap {
    if bitmap.size() >= event_count {
        bitmap.clone()
    } else {
        let mut extended = bitmap.clone();
        extended.append_bits(false, event_count - bitmap.size());
        extended
    }
}

/// Enumerate every matching `EventId` in ascending order via repeated
/// `select<true>` (§4.4: "streams matching IDs").
pub fn matching_ids(result: &Bitmap) -> Vec<EventId> {
    let mut ids = Vec::new();
    let mut i = 1;
    while let Some(pos) = select(result, i, true) {
        ids.push(EventId::new(pos));
        i += 1;
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::LeafQuery;
    use vast_index::ClauseOp;
    use vast_value::Value;

    fn leaf(id: usize) -> LeafQuery {
        LeafQuery {
            id,
            key: crate::validate::LeafKey::Tag(crate::ast::Tag::Id),
            op: ClauseOp::Eq,
            value: Value::UInt(0),
        }
    }

    #[test]
    fn combines_two_leaves_with_and() {
        let plan = Plan {
            leaves: vec![leaf(0), leaf(1)],
            combinator: Combinator::Binary(
                Box::new(Combinator::Leaf(0)),
                BinaryQueryOp::And,
                Box::new(Combinator::Leaf(1)),
            ),
        };
        let mut a = Bitmap::new();
        a.append_bits(true, 1);
        a.append_bits(false, 1);
        a.append_bits(true, 1);
        let mut b = Bitmap::new();
        b.append_bits(true, 2);
        b.append_bits(false, 1);

        let result = combine(&plan, &[a, b], 3);
        assert!(result.get(0));
        assert!(!result.get(1));
        assert!(!result.get(2));
    }

    #[test]
    fn scenario_three_from_spec_enumerates_event_zero() {
        let mut bitmap = Bitmap::new();
        bitmap.append_bits(true, 1);
        bitmap.append_bits(false, 2);
        assert_eq!(matching_ids(&bitmap), vec![EventId::new(0)]);
    }

    #[test]
    fn missing_tail_positions_read_as_false() {
        let plan = Plan {
            leaves: vec![leaf(0)],
            combinator: Combinator::Leaf(0),
        };
        let mut short = Bitmap::new();
        short.append_bits(true, 2);
        let result = combine(&plan, &[short], 5);
        assert_eq!(result.size(), 5);
        assert!(!result.get(4));
    }
}
