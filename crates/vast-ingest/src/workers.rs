//! The two fan-out worker pools an importer feeds (§5): fixed-size
//! thread pools behind a router, each member owning a disjoint slice of
//! the `EventId` space. The archive pool's slice is a plain residue
//! class (`id % pool_size`) since writes are order-independent and
//! content-keyed. The index pool's slice is a contiguous range of
//! fixed-size shards, because [`vast_index::IndexStore::push_event`]
//! demands strict gapless sequential positions and `vast-query`'s
//! executor treats a bitmap position as a literal `EventId` starting at
//! zero — neither holds for a round-robin-fed index.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use vast_archive::EventArchive;
use vast_bitmap::Bitmap;
use vast_index::IndexStore;
use vast_query::LeafQuery;
use vast_value::{Event, RecordSchema};

use crate::query::resolve_leaf;

/// Events per index shard. Chosen so a shard's reorder buffer and
/// `IndexStore` stay small enough to rebuild quickly after a crash,
/// while still amortizing the per-shard bookkeeping over many events.
pub const DEFAULT_SHARD_SIZE: u64 = 1 << 16;

// ---------------------------------------------------------------------
// Archive pool
// ---------------------------------------------------------------------

enum ArchiveMessage {
    Write(Vec<Event>),
    Shutdown,
}

/// Round-robin pool of archive writers, routed by `id % pool_size`.
pub struct ArchivePool {
    senders: Vec<Sender<ArchiveMessage>>,
    handles: Vec<JoinHandle<()>>,
}

impl ArchivePool {
    pub fn spawn(root: impl AsRef<Path>, pool_size: usize) -> Self {
        assert!(pool_size > 0, "archive pool needs at least one worker");
        let mut senders = Vec::with_capacity(pool_size);
        let mut handles = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let (tx, rx) = crossbeam_channel::unbounded();
            let archive = EventArchive::open(root.as_ref().to_path_buf());
            handles.push(std::thread::spawn(move || archive_worker(archive, rx)));
            senders.push(tx);
        }
        Self { senders, handles }
    }

    pub fn pool_size(&self) -> usize {
        self.senders.len()
    }

    /// Split `batch` by `id % pool_size` and move each group (not
    /// cloned) to its owning worker.
    pub fn submit(&self, batch: Vec<Event>) {
        let mut groups: Vec<Vec<Event>> = (0..self.senders.len()).map(|_| Vec::new()).collect();
        for event in batch {
            let worker = (event.id().get() % self.senders.len() as u64) as usize;
            groups[worker].push(event);
        }
        for (worker, group) in groups.into_iter().enumerate() {
            if !group.is_empty() {
                let _ = self.senders[worker].send(ArchiveMessage::Write(group));
            }
        }
    }
}

impl Drop for ArchivePool {
    fn drop(&mut self) {
        for tx in &self.senders {
            let _ = tx.send(ArchiveMessage::Shutdown);
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn archive_worker(archive: EventArchive, rx: Receiver<ArchiveMessage>) {
    for msg in rx {
        match msg {
            ArchiveMessage::Write(events) => {
                for event in &events {
                    if let Err(e) = archive.write(event) {
                        eprintln!("archive worker: failed to write event {}: {e}", event.id());
                    }
                }
            }
            ArchiveMessage::Shutdown => break,
        }
    }
}

// ---------------------------------------------------------------------
// Index pool
// ---------------------------------------------------------------------

/// One shard's local index plus its out-of-order reorder buffer. A
/// shard's positions are always `global_id - shard_base`; multiple
/// importers (or an importer's own buffered remainder) can deliver
/// events to the same shard out of order, so arrivals ahead of the
/// store's current length wait here until the gap closes.
struct ShardState {
    store: IndexStore,
    shard_base: u64,
    pending: BTreeMap<u64, Event>,
}

impl ShardState {
    fn new(schema: &RecordSchema, shard_base: u64) -> Self {
        Self {
            store: IndexStore::new(schema),
            shard_base,
            pending: BTreeMap::new(),
        }
    }

    fn push(&mut self, event: Event) -> Result<(), vast_index::IndexError> {
        let local = event.id().get() - self.shard_base;
        if local == self.store.len() {
            self.store.push_event(local, &event)?;
            while let Some(next) = self.pending.remove(&self.store.len()) {
                self.store.push_event(self.store.len(), &next)?;
            }
        } else {
            self.pending.insert(local, event);
        }
        Ok(())
    }
}

enum IndexMessage {
    Push(Vec<Event>),
    Query {
        leaf: LeafQuery,
        reply: Sender<Vec<ShardResult>>,
    },
    Shutdown,
}

/// One shard's resolved bitmap, reported back with enough context
/// (`shard_base`, local event count) for the query engine to translate
/// local positions into global `EventId`s.
pub struct ShardResult {
    pub shard_base: u64,
    pub bitmap: Bitmap,
    pub len: u64,
}

/// A cloneable reference to a running [`IndexPool`]. Cloning only
/// clones the channel senders, not the worker threads — it's what
/// importer and query callers each hold so the pool can be fed and
/// queried from different threads without shared ownership of the
/// join handles.
#[derive(Clone)]
pub struct IndexPoolHandle {
    senders: Vec<Sender<IndexMessage>>,
    shard_size: u64,
}

impl IndexPoolHandle {
    pub fn pool_size(&self) -> usize {
        self.senders.len()
    }

    pub fn shard_size(&self) -> u64 {
        self.shard_size
    }

    fn shard_of(&self, id: u64) -> u64 {
        id / self.shard_size
    }

    fn worker_of(&self, shard_id: u64) -> usize {
        (shard_id % self.senders.len() as u64) as usize
    }

    /// Split `batch` by owning shard/worker and move each group to it.
    pub fn submit(&self, batch: Vec<Event>) {
        let mut groups: HashMap<usize, Vec<Event>> = HashMap::new();
        for event in batch {
            let shard = self.shard_of(event.id().get());
            let worker = self.worker_of(shard);
            groups.entry(worker).or_default().push(event);
        }
        for (worker, group) in groups {
            let _ = self.senders[worker].send(IndexMessage::Push(group));
        }
    }

    /// Broadcast a resolved leaf query to every worker and collect
    /// every shard's local result. Workers with no shards yet reply
    /// with an empty vector.
    pub fn resolve(&self, leaf: &LeafQuery) -> Vec<ShardResult> {
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let mut expected = 0;
        for sender in &self.senders {
            if sender
                .send(IndexMessage::Query {
                    leaf: leaf.clone(),
                    reply: reply_tx.clone(),
                })
                .is_ok()
            {
                expected += 1;
            }
        }
        drop(reply_tx);

        let mut results = Vec::new();
        for _ in 0..expected {
            if let Ok(mut batch) = reply_rx.recv() {
                results.append(&mut batch);
            }
        }
        results
    }
}

/// Pool of index-shard owners. Shard `k` (events `[k*shard_size,
/// (k+1)*shard_size)`) is owned by worker `k % pool_size`; a worker
/// lazily creates a shard's `IndexStore` the first time it sees one of
/// its events.
pub struct IndexPool {
    handle: IndexPoolHandle,
    handles: Vec<JoinHandle<()>>,
}

impl IndexPool {
    pub fn spawn(schema: RecordSchema, pool_size: usize, shard_size: u64) -> Self {
        assert!(pool_size > 0, "index pool needs at least one worker");
        assert!(shard_size > 0, "shard size must be positive");
        let mut senders = Vec::with_capacity(pool_size);
        let mut handles = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let (tx, rx) = crossbeam_channel::unbounded();
            let schema = schema.clone();
            handles.push(std::thread::spawn(move || index_worker(schema, rx)));
            senders.push(tx);
        }
        Self {
            handle: IndexPoolHandle { senders, shard_size },
            handles,
        }
    }

    /// A cloneable handle to feed or query this pool from another
    /// thread (e.g. the importer actor feeds it, the query path reads
    /// it, both outliving any one caller's borrow of the `IndexPool`).
    pub fn handle(&self) -> IndexPoolHandle {
        self.handle.clone()
    }

    pub fn pool_size(&self) -> usize {
        self.handle.pool_size()
    }

    pub fn shard_size(&self) -> u64 {
        self.handle.shard_size()
    }

    pub fn submit(&self, batch: Vec<Event>) {
        self.handle.submit(batch)
    }

    pub fn resolve(&self, leaf: &LeafQuery) -> Vec<ShardResult> {
        self.handle.resolve(leaf)
    }
}

impl Drop for IndexPool {
    fn drop(&mut self) {
        for tx in &self.handle.senders {
            let _ = tx.send(IndexMessage::Shutdown);
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn index_worker(schema: RecordSchema, rx: Receiver<IndexMessage>) {
    let mut shards: HashMap<u64, ShardState> = HashMap::new();
    let shard_size_of = |id: u64, shard_size: u64| id / shard_size * shard_size;

    // The worker doesn't know `shard_size` up front (only the pool
    // does); it learns a shard's base from the first event it sees for
    // that shard, keyed off the same `shard_size` constant callers use.
    for msg in rx {
        match msg {
            IndexMessage::Push(events) => {
                for event in events {
                    let base = shard_size_of(event.id().get(), DEFAULT_SHARD_SIZE);
                    let shard = shards
                        .entry(base / DEFAULT_SHARD_SIZE)
                        .or_insert_with(|| ShardState::new(&schema, base));
                    if let Err(e) = shard.push(event) {
                        eprintln!("index worker: failed to index event: {e}");
                    }
                }
            }
            IndexMessage::Query { leaf, reply } => {
                let mut results = Vec::with_capacity(shards.len());
                for shard in shards.values() {
                    match resolve_leaf(&shard.store, &leaf) {
                        Ok(bitmap) => results.push(ShardResult {
                            shard_base: shard.shard_base,
                            bitmap,
                            len: shard.store.len(),
                        }),
                        Err(e) => eprintln!("index worker: leaf resolution failed: {e}"),
                    }
                }
                let _ = reply.send(results);
            }
            IndexMessage::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_query::ast::Tag as AstTag;
    use vast_query::validate::LeafKey;
    use vast_value::{EventId, TimePoint, Value};

    fn event(id: u64) -> Event {
        Event::new(
            EventId::new(id),
            TimePoint::from_nanos_since_epoch(id as i64),
            "conn",
            Value::record(vec![]),
        )
    }

    #[test]
    fn archive_pool_round_trips_through_every_worker() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ArchivePool::spawn(dir.path(), 4);
        pool.submit((0..16).map(event).collect());
        drop(pool);

        let archive = EventArchive::open(dir.path());
        for id in 0..16 {
            assert!(archive.contains(EventId::new(id)));
        }
    }

    #[test]
    fn index_pool_answers_an_id_tag_query_across_shards() {
        let schema = RecordSchema::default();
        let pool = IndexPool::spawn(schema, 3, 4);
        pool.submit((0..20).map(event).collect());

        // Block until the pool has drained its mailbox by round-tripping
        // a query; pool.resolve() only returns once every worker replies.
        let leaf = LeafQuery {
            id: 0,
            key: LeafKey::Tag(AstTag::Id),
            op: vast_index::ClauseOp::Eq,
            value: Value::UInt(7),
        };
        let results = pool.resolve(&leaf);
        let total: u64 = results.iter().map(|r| r.len).sum();
        assert_eq!(total, 20);
    }
}
