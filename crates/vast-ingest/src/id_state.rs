//! Persisted `(next, available)` importer state (§4.5, §6 "Persisted
//! state"): two ASCII decimal files, `dir/next` and `dir/available`.
//! `batch_size`/`last_replenish` are runtime-only tuning state — they
//! reset to their defaults across a restart, which only affects how
//! quickly adaptive sizing re-converges, never correctness.

use std::path::{Path, PathBuf};
use std::time::Instant;

use vast_utils::decimal::{read_decimal, write_decimal};

use crate::error::IngestError;

pub const DEFAULT_BATCH_SIZE: u64 = 128;

#[derive(Debug)]
pub struct IdState {
    pub next: u64,
    pub available: u64,
    pub batch_size: u64,
    pub last_replenish: Option<Instant>,
    dir: PathBuf,
}

impl IdState {
    /// Load persisted `(next, available)` from `dir`, or start fresh at
    /// `(0, 0)` if the directory/files are absent (§4.5 "Restart"). A
    /// present but malformed file surfaces as `IngestError::Filesystem`.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let dir = dir.into();
        let next = read_decimal(next_path(&dir)).map_err(IngestError::from)?.unwrap_or(0);
        let available = read_decimal(available_path(&dir)).map_err(IngestError::from)?.unwrap_or(0);
        Ok(Self {
            next,
            available,
            batch_size: DEFAULT_BATCH_SIZE,
            last_replenish: None,
            dir,
        })
    }

    /// Persist `(next, available)` crash-safely.
    pub fn persist(&self) -> Result<(), IngestError> {
        write_decimal(next_path(&self.dir), self.next).map_err(IngestError::from)?;
        write_decimal(available_path(&self.dir), self.available).map_err(IngestError::from)?;
        Ok(())
    }
}

fn next_path(dir: &Path) -> PathBuf {
    dir.join("next")
}

fn available_path(dir: &Path) -> PathBuf {
    dir.join("available")
}
