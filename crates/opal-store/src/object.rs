use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A stored object: its byte payload plus extended attributes and
/// modification metadata.
///
/// Attributes live in a `BTreeMap` so enumeration order is stable across
/// snapshots of the same attribute set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Raw object bytes.
    pub data: Vec<u8>,
    /// Extended attributes, keyed by name. Values are raw bytes and may
    /// contain embedded NULs.
    pub xattrs: BTreeMap<String, Vec<u8>>,
    /// Last modification time.
    pub mtime: DateTime<Utc>,
}

impl ObjectRecord {
    /// Create a record holding the given bytes, stamped now.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            xattrs: BTreeMap::new(),
            mtime: Utc::now(),
        }
    }

    /// Object size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Stat metadata for this record.
    pub fn stat(&self) -> ObjectStat {
        ObjectStat {
            size: self.size(),
            mtime: self.mtime,
        }
    }

    /// The byte range `[offset, offset + len)` clamped to the stored
    /// length. Reads past the end return the available suffix, possibly
    /// empty.
    pub fn range(&self, offset: u64, len: usize) -> &[u8] {
        let start = (offset as usize).min(self.data.len());
        let end = start.saturating_add(len).min(self.data.len());
        &self.data[start..end]
    }
}

/// Size and modification time of a stored object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectStat {
    pub size: u64,
    pub mtime: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_matches_data() {
        let rec = ObjectRecord::new(b"testdata".to_vec());
        assert_eq!(rec.size(), 8);
        assert_eq!(rec.stat().size, 8);
    }

    #[test]
    fn range_within_bounds() {
        let rec = ObjectRecord::new(b"testdata".to_vec());
        assert_eq!(rec.range(0, 8), b"testdata");
        assert_eq!(rec.range(4, 4), b"data");
    }

    #[test]
    fn range_clamps_past_the_end() {
        let rec = ObjectRecord::new(b"testdata".to_vec());
        assert_eq!(rec.range(0, 16), b"testdata");
        assert_eq!(rec.range(6, 16), b"ta");
        assert_eq!(rec.range(100, 4), b"");
    }

    #[test]
    fn zero_length_range_is_empty() {
        let rec = ObjectRecord::new(b"testdata".to_vec());
        assert_eq!(rec.range(0, 0), b"");
    }
}
