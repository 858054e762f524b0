//! Message-passing ingest pipeline (§4.5, §5): an importer actor that
//! allocates `EventId`s out of a durable meta-store counter, and fans
//! every stamped event out to an archive pool and an index pool, each
//! a fixed-size thread pool behind a router.

pub mod error;
pub mod id_state;
pub mod importer;
pub mod meta_client;
pub mod pipeline;
pub mod query;
pub mod workers;

pub use error::IngestError;
pub use id_state::IdState;
pub use importer::{Importer, RawEvent};
pub use meta_client::{MetaActor, MetaClient};
pub use pipeline::{Pipeline, PipelineConfig};
pub use workers::{ArchivePool, IndexPool, IndexPoolHandle, ShardResult, DEFAULT_SHARD_SIZE};
