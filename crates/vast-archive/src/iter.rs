//! Enumerates every shard under an archive root in ascending `EventId`
//! order — the order ingest restart (§6 "Replay") depends on when
//! rebuilding indexes from a scanned archive.

use std::fs;
use std::path::{Path, PathBuf};

use vast_value::Event;

use crate::codec::decode_event;
use crate::error::ArchiveError;

pub struct ArchiveIter {
    dirs: Vec<PathBuf>,
    dir_index: usize,
    current_entries: Vec<PathBuf>,
    entry_index: usize,
}

impl ArchiveIter {
    pub(crate) fn new(root: &Path) -> Result<Self, ArchiveError> {
        let mut dirs = Vec::new();
        if root.is_dir() {
            for entry in fs::read_dir(root)? {
                let entry = entry?;
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if name.len() == 2 && name.chars().all(|c| c.is_ascii_hexdigit()) && entry.file_type()?.is_dir() {
                    dirs.push(entry.path());
                }
            }
        }
        dirs.sort();
        Ok(Self {
            dirs,
            dir_index: 0,
            current_entries: Vec::new(),
            entry_index: 0,
        })
    }

    fn advance_dir(&mut self) -> Result<bool, ArchiveError> {
        while self.dir_index < self.dirs.len() {
            let dir = &self.dirs[self.dir_index];
            self.dir_index += 1;

            let mut entries = Vec::new();
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                let name = entry.file_name();
                let name = name.to_string_lossy();
                let is_shard = name.len() == 16 && name.chars().all(|c| c.is_ascii_hexdigit());
                if is_shard && entry.file_type()?.is_file() {
                    entries.push(entry.path());
                }
            }
            entries.sort();

            if !entries.is_empty() {
                self.current_entries = entries;
                self.entry_index = 0;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Iterator for ArchiveIter {
    type Item = Result<Event, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.entry_index < self.current_entries.len() {
                let path = self.current_entries[self.entry_index].clone();
                self.entry_index += 1;
                return Some(read_shard(&path));
            }
            match self.advance_dir() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn read_shard(path: &Path) -> Result<Event, ArchiveError> {
    let compressed = fs::read(path)?;
    let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
    let mut raw = Vec::new();
    std::io::Read::read_to_end(&mut decoder, &mut raw)?;
    decode_event(&raw)
}
