//! Cross-shard query execution: resolve a compiled [`vast_query::Plan`]
//! against an [`IndexPool`], stitching every shard's locally-addressed
//! bitmap back into the single globally-addressed bitmap
//! `vast_query::exec::combine`/`matching_ids` expect.

use vast_bitmap::{Bitmap, Bits};
use vast_index::{IndexError, IndexStore, ValueIndex};
use vast_query::ast::Tag;
use vast_query::validate::LeafKey;
use vast_query::{combine, compile, matching_ids, LeafQuery, Plan};
use vast_value::{EventId, RecordSchema};

use crate::error::IngestError;
use crate::workers::{IndexPoolHandle, ShardResult};

/// Resolve a single leaf against one shard's local store. Tag leaves
/// dispatch to the fixed `&name`/`&time`/`&id` indexes directly rather
/// than through [`vast_index::TagField`] — `vast-ingest` already
/// depends on both `vast-index` and `vast-query`, so there's no
/// circular-dependency reason to indirect through the mirror enum.
pub fn resolve_leaf(store: &IndexStore, leaf: &LeafQuery) -> Result<Bitmap, IndexError> {
    match &leaf.key {
        LeafKey::Field(steps) => store.lookup_field(steps, leaf.op, &leaf.value),
        LeafKey::Fields(paths) => store.lookup_fields(paths, leaf.op, &leaf.value),
        LeafKey::Tag(Tag::Name) => store.name_index().lookup(leaf.op, &leaf.value),
        LeafKey::Tag(Tag::Time) => store.time_index().lookup(leaf.op, &leaf.value),
        LeafKey::Tag(Tag::Id) => store.id_index().lookup(leaf.op, &leaf.value),
    }
}

/// Compile `expression` against `schema` and evaluate it over every
/// shard in `pool`, returning matching `EventId`s in ascending order.
pub fn run(
    pool: &IndexPoolHandle,
    schema: &RecordSchema,
    expression: &str,
) -> Result<Vec<EventId>, IngestError> {
    let plan = compile(expression, schema)?;
    let ids = evaluate(pool, &plan);
    Ok(ids)
}

fn evaluate(pool: &IndexPoolHandle, plan: &Plan) -> Vec<EventId> {
    let mut leaf_bitmaps = Vec::with_capacity(plan.leaves.len());
    let mut event_count = 0u64;

    for leaf in &plan.leaves {
        let shard_results = pool.resolve(leaf);
        let (bitmap, len) = assemble_global_bitmap(pool.shard_size(), shard_results);
        event_count = event_count.max(len);
        leaf_bitmaps.push(bitmap);
    }

    let result = combine(plan, &leaf_bitmaps, event_count);
    matching_ids(&result)
}

/// Stitch a leaf's per-shard results into one bitmap addressed by
/// global position. Shards are expected to be dense and contiguous
/// from `shard_base == 0` (guaranteed by sequential `EventId`
/// allocation out of a single meta-store counter); a shard that
/// genuinely has no events yet just contributes nothing, which only
/// under-counts `event_count` until it reports in on a later query.
fn assemble_global_bitmap(shard_size: u64, mut shard_results: Vec<ShardResult>) -> (Bitmap, u64) {
    shard_results.sort_by_key(|r| r.shard_base);

    let mut global = Bitmap::new();
    let mut next_base = 0u64;
    for shard in &shard_results {
        if shard.shard_base > next_base {
            global.append_bits(false, shard.shard_base - next_base);
        }
        append_bitmap(&mut global, &shard.bitmap);
        next_base = shard.shard_base + shard_size;
    }

    let total = global.size();
    (global, total)
}

fn append_bitmap(dst: &mut Bitmap, src: &Bitmap) {
    for block in src.bit_range() {
        match block {
            Bits::Literal { word, len } => dst.append_block(word, len),
            Bits::Fill { value, len } => dst.append_bits(value, len),
        }
    }
}
