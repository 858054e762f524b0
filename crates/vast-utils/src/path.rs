use std::path::{Path, PathBuf};

/// Split a 64-bit key into a two-level fan-out directory path, mirroring
/// the two-level hex fan-out git uses for loose objects but keyed by an
/// integer: `dir/<hi>/<lo>` where `hi` is the key's top byte.
///
/// Used by the archive to avoid a single directory holding millions of
/// per-event files.
pub fn fanout_path(root: &Path, key: u64, leaf_name: impl AsRef<Path>) -> PathBuf {
    let hi = (key >> 56) as u8;
    root.join(format!("{hi:02x}")).join(leaf_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fanout_groups_by_top_byte() {
        let root = Path::new("/archive");
        let p1 = fanout_path(root, 0x00_00_00_00_00_00_00_01, "1");
        let p2 = fanout_path(root, 0xff_00_00_00_00_00_00_01, "ff00000000000001");
        assert_eq!(p1, Path::new("/archive/00/1"));
        assert_eq!(p2, Path::new("/archive/ff/ff00000000000001"));
    }
}
