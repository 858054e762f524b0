//! The archive itself: an append-only, fanout-sharded event store,
//! modeled on `git-loose`'s object directory but keyed by `EventId`
//! instead of a content hash. Writes go through a [`vast_utils::LockFile`]
//! so a crash mid-write never corrupts an existing shard; reads are a
//! plain zlib-decompress-then-decode.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use vast_utils::LockFile;
use vast_value::{Event, EventId};

use crate::codec::{decode_event, encode_event};
use crate::error::ArchiveError;
use crate::iter::ArchiveIter;

/// Append-only event archive rooted at a directory of two-hex-digit
/// fan-out shards (`root/<hi-byte>/<id-in-hex>`).
pub struct EventArchive {
    root: PathBuf,
    compression_level: flate2::Compression,
}

impl EventArchive {
    /// Open (or prepare to create) an archive rooted at `root`. The
    /// directory itself is created lazily on first write.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compression_level: flate2::Compression::default(),
        }
    }

    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = flate2::Compression::new(level);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a given event's shard file would live at, written or not.
    pub fn event_path(&self, id: EventId) -> PathBuf {
        vast_utils::path::fanout_path(&self.root, id.get(), shard_name(id))
    }

    /// Append an event to the archive. No-op if a shard for this ID
    /// already exists (idempotent under replay).
    pub fn write(&self, event: &Event) -> Result<(), ArchiveError> {
        let path = self.event_path(event.id());
        if path.is_file() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let raw = encode_event(event);
        let compressed = compress(&raw, self.compression_level)?;

        let mut lock = LockFile::acquire(&path)?;
        lock.write_all(&compressed)?;
        lock.commit()?;
        Ok(())
    }

    /// Read the event stored under `id`, if any.
    pub fn read(&self, id: EventId) -> Result<Option<Event>, ArchiveError> {
        let path = self.event_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let raw = decompress(&compressed)?;
        let event = decode_event(&raw)?;
        if event.id() != id {
            return Err(ArchiveError::Corrupt {
                id,
                reason: format!("shard holds event {}", event.id()),
            });
        }
        Ok(Some(event))
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.event_path(id).is_file()
    }

    /// Iterate every stored event in ascending `EventId` order, the
    /// replay order the ingest restart protocol depends on.
    pub fn iter(&self) -> Result<ArchiveIter, ArchiveError> {
        ArchiveIter::new(&self.root)
    }
}

fn shard_name(id: EventId) -> String {
    format!("{:016x}", id.get())
}

fn compress(raw: &[u8], level: flate2::Compression) -> Result<Vec<u8>, ArchiveError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

fn decompress(compressed: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(raw)
}
