//! Durable named counters, one file per key, each written through a
//! [`vast_utils::LockFile`] exactly the way `git-ref`'s file transaction
//! protocol commits a ref: acquire the lock (which also serializes
//! concurrent writers to the same key), read the current value, write
//! the new one, atomic rename on commit, rollback on drop if the writer
//! never committed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use vast_utils::decimal::read_decimal;
use vast_utils::LockFile;

use crate::error::MetaError;

pub struct MetaStore {
    root: PathBuf,
}

impl MetaStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn counter_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.count"))
    }

    /// Atomically increment the named counter by `n`, returning the
    /// value it held *before* the increment (§4.5 step 4: "the prior
    /// counter value" is what an ID-allocation caller needs — it's the
    /// start of the range it was just granted). An absent counter file
    /// starts at 0.
    pub fn add(&self, key: &str, n: u64) -> Result<u64, MetaError> {
        let path = self.counter_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(vast_utils::UtilError::from)?;
        }

        let mut lock = LockFile::acquire(&path)?;
        let prior = read_decimal(&path)?.unwrap_or(0);
        let next = prior
            .checked_add(n)
            .ok_or_else(|| MetaError::Overflow { key: key.to_string(), n })?;

        lock.write_all(format!("{next}\n").as_bytes())
            .map_err(vast_utils::UtilError::from)?;
        lock.commit()?;
        Ok(prior)
    }

    /// Current value of a counter without incrementing it, mainly for
    /// tests and diagnostics.
    pub fn get(&self, key: &str) -> Result<u64, MetaError> {
        Ok(read_decimal(self.counter_path(key))?.unwrap_or(0))
    }
}
