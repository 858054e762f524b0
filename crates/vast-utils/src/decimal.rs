use std::fs;
use std::path::Path;

use crate::lockfile::write_atomic;
use crate::Result;

/// Read a `u64` stored as an ASCII decimal integer, trailing newline
/// optional, per the persisted-state format in `spec.md` §6.
///
/// Returns `Ok(None)` if the file does not exist. A present but
/// malformed file is surfaced through `UtilError::Io`/`Path`, which
/// callers in `vast-ingest`/`vast-meta` treat as a fatal filesystem
/// error rather than a fresh-start signal.
pub fn read_decimal(path: impl AsRef<Path>) -> Result<Option<u64>> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let trimmed = raw.trim_end_matches('\n');
    let value: u64 = trimmed
        .parse()
        .map_err(|_| crate::error::UtilError::Path(format!("malformed decimal in {path:?}: {raw:?}")))?;
    Ok(Some(value))
}

/// Write a `u64` as an ASCII decimal integer with a trailing newline,
/// crash-safely via [`write_atomic`].
pub fn write_decimal(path: impl AsRef<Path>, value: u64) -> Result<()> {
    write_atomic(path, format!("{value}\n").as_bytes())
}
