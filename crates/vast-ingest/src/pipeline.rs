//! Wires every actor together into one running pipeline (§4.5, §5):
//! a meta-store actor, an archive pool, an index pool, and an importer
//! actor thread that owns the ID allocation state and feeds the two
//! pools. `Pipeline::submit` is the event-ingest entry point;
//! `Pipeline::query` is the read path, evaluated straight against the
//! index pool without involving the importer at all.

use std::path::PathBuf;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use vast_archive::EventArchive;
use vast_meta::MetaStore;
use vast_value::{Event, EventId, RecordSchema};

use crate::error::IngestError;
use crate::id_state::IdState;
use crate::importer::{Importer, RawEvent};
use crate::meta_client::MetaActor;
use crate::query;
use crate::workers::{ArchivePool, IndexPool, IndexPoolHandle, DEFAULT_SHARD_SIZE};

/// Events per replay batch when rebuilding the index from the archive
/// at startup (§9 "Global state": the index is a derived view, not an
/// independent source of truth — only the archive and the meta
/// counter are durable).
const REPLAY_BATCH_SIZE: usize = 4096;

pub struct PipelineConfig {
    pub root: PathBuf,
    pub schema: RecordSchema,
    pub archive_pool_size: usize,
    pub index_pool_size: usize,
    pub shard_size: u64,
}

impl PipelineConfig {
    pub fn new(root: impl Into<PathBuf>, schema: RecordSchema) -> Self {
        Self {
            root: root.into(),
            schema,
            archive_pool_size: 4,
            index_pool_size: 4,
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }
}

enum ImporterMessage {
    Ingest(Vec<RawEvent>),
    Shutdown,
}

/// A running ingest pipeline: importer, meta store, and the archive
/// and index pools it feeds. Dropping a `Pipeline` shuts every actor
/// down in dependency order — importer first (so it stops feeding the
/// pools), then whatever the importer thread was still holding tears
/// itself down as that thread unwinds.
pub struct Pipeline {
    importer_tx: Sender<ImporterMessage>,
    importer_handle: Option<JoinHandle<()>>,
    index: IndexPoolHandle,
    schema: RecordSchema,
    _meta_actor: MetaActor,
}

impl Pipeline {
    pub fn start(config: PipelineConfig) -> Result<Self, IngestError> {
        let meta_actor = MetaActor::spawn(MetaStore::open(config.root.join("meta")));
        let meta_client = meta_actor.client();

        let archive_root = config.root.join("archive");
        let archive_pool = ArchivePool::spawn(&archive_root, config.archive_pool_size);
        let index_pool = IndexPool::spawn(config.schema.clone(), config.index_pool_size, config.shard_size);
        let index_handle = index_pool.handle();

        // The index isn't itself durable; rebuild it from the archive
        // (the source of truth) before accepting any query. Submits
        // land on the same per-worker channels a later `query()` call
        // resolves against, so FIFO delivery orders the replay ahead of
        // any query issued after `start` returns — no extra barrier
        // needed.
        replay_archive_into_index(&archive_root, &index_handle)?;

        let id_state = IdState::load(config.root.join("importer"))?;
        let mut importer = Importer::new(id_state, meta_client, archive_pool, index_pool);

        let (importer_tx, importer_rx) = crossbeam_channel::unbounded();
        let importer_handle = std::thread::spawn(move || {
            for msg in importer_rx {
                match msg {
                    ImporterMessage::Ingest(batch) => {
                        if let Err(e) = importer.ingest(batch) {
                            eprintln!("importer: failed to ingest batch: {e}");
                        }
                    }
                    ImporterMessage::Shutdown => break,
                }
            }
        });

        Ok(Self {
            importer_tx,
            importer_handle: Some(importer_handle),
            index: index_handle,
            schema: config.schema,
            _meta_actor: meta_actor,
        })
    }

    /// Hand a batch of unstamped events to the importer. Asynchronous:
    /// this returns once the batch is queued, not once it's durable.
    pub fn submit(&self, batch: Vec<RawEvent>) -> Result<(), IngestError> {
        self.importer_tx
            .send(ImporterMessage::Ingest(batch))
            .map_err(|_| IngestError::Unspecified)
    }

    /// Compile and evaluate a query expression against the current
    /// index state, returning matching `EventId`s in ascending order.
    pub fn query(&self, expression: &str) -> Result<Vec<EventId>, IngestError> {
        query::run(&self.index, &self.schema, expression)
    }
}

fn replay_archive_into_index(archive_root: &std::path::Path, index: &IndexPoolHandle) -> Result<(), IngestError> {
    let archive = EventArchive::open(archive_root);
    let mut batch: Vec<Event> = Vec::with_capacity(REPLAY_BATCH_SIZE);
    for event in archive.iter()? {
        batch.push(event?);
        if batch.len() >= REPLAY_BATCH_SIZE {
            index.submit(std::mem::take(&mut batch));
        }
    }
    if !batch.is_empty() {
        index.submit(batch);
    }
    Ok(())
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        let _ = self.importer_tx.send(ImporterMessage::Shutdown);
        if let Some(handle) = self.importer_handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_value::{TimePoint, Value};

    fn raw(n: usize) -> Vec<RawEvent> {
        (0..n)
            .map(|i| RawEvent {
                time: TimePoint::from_nanos_since_epoch(i as i64),
                name: "conn".to_string(),
                data: Value::record(vec![]),
            })
            .collect()
    }

    #[test]
    fn ingested_events_are_queryable_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::start(PipelineConfig::new(dir.path(), RecordSchema::default())).unwrap();
        pipeline.submit(raw(10)).unwrap();

        // The importer actor is asynchronous; poll the query path until
        // the batch has landed rather than assuming a fixed delay.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let ids = pipeline.query("&id == 1").unwrap();
            if !ids.is_empty() {
                assert_eq!(ids, vec![EventId::new(1)]);
                break;
            }
            assert!(std::time::Instant::now() < deadline, "event never became queryable");
            std::thread::yield_now();
        }
    }

    #[test]
    fn index_rebuilds_from_the_archive_after_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = || PipelineConfig::new(dir.path(), RecordSchema::default());

        {
            let pipeline = Pipeline::start(config()).unwrap();
            pipeline.submit(raw(5)).unwrap();
            // Block on a query to know the archive writes have landed
            // before this scope drops the pipeline.
            let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
            loop {
                if !pipeline.query("&id == 1").unwrap().is_empty() {
                    break;
                }
                assert!(std::time::Instant::now() < deadline);
                std::thread::yield_now();
            }
            // Give the archive pool a moment to flush after the index
            // pool already reported the event, since the two pools are
            // fed independently.
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        let pipeline = Pipeline::start(config()).unwrap();
        let ids = pipeline.query("&id >= 1").unwrap();
        assert_eq!(ids.len(), 5);
    }
}
