/// Cursor over a snapshot of an object's extended attributes.
///
/// The snapshot is taken atomically when the Get-All-XAttrs sub-operation
/// is evaluated and never changes afterwards; its order is stable for the
/// lifetime of the cursor (key-sorted with the in-memory backend). The
/// cursor is finite and non-restartable: once exhausted, [`next_entry`]
/// keeps returning `None`.
///
/// [`next_entry`]: XattrCursor::next_entry
pub struct XattrCursor {
    entries: Vec<(String, Vec<u8>)>,
    pos: usize,
}

impl XattrCursor {
    pub(crate) fn new(entries: Vec<(String, Vec<u8>)>) -> Self {
        Self { entries, pos: 0 }
    }

    /// The next (key, value) pair, or `None` once the snapshot is
    /// exhausted. Calling again after exhaustion is idempotent.
    pub fn next_entry(&mut self) -> Option<(&str, &[u8])> {
        let entry = self.entries.get(self.pos)?;
        self.pos += 1;
        Some((entry.0.as_str(), entry.1.as_slice()))
    }

    /// Number of entries not yet returned.
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.pos
    }

    /// Release the snapshot. Dropping the cursor is equivalent.
    pub fn close(self) {}
}

impl std::fmt::Debug for XattrCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XattrCursor")
            .field("entries", &self.entries.len())
            .field("pos", &self.pos)
            .finish()
    }
}
