use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use opal_store::ObjectStat;
use opal_types::OpResult;

use crate::xattrs::XattrCursor;

/// Write-once result cell shared between a caller-side handle and the
/// sub-operation the engine evaluates.
///
/// A slot is written at most once, by the engine, when its sub-operation
/// is reached; sub-operations after the stopping point never touch their
/// slots, so the handle keeps reporting `None`.
pub(crate) struct Slot<T>(Arc<OnceLock<T>>);

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    /// Record the outcome. Each sub-operation is evaluated at most once,
    /// so a second write can only be a logic error; it is ignored.
    pub(crate) fn fill(&self, value: T) {
        let _ = self.0.set(value);
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.0.get()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Per-sub-operation outcomes
// ---------------------------------------------------------------------------

pub(crate) struct ReadOutcome {
    pub rval: OpResult<()>,
    pub data: Vec<u8>,
}

pub(crate) struct StatOutcome {
    pub rval: OpResult<()>,
    /// `None` when the stat itself failed; the caller's view of size and
    /// mtime then stays untouched.
    pub stat: Option<ObjectStat>,
}

pub(crate) struct ExecOutcome {
    pub rval: OpResult<()>,
    /// `None` when the method produced no output (failure, or output
    /// discarded because the caller's capacity was insufficient).
    pub output: Option<ExecOutput>,
}

pub(crate) struct XattrsOutcome {
    pub rval: OpResult<()>,
    pub entries: Vec<(String, Vec<u8>)>,
}

/// Output buffer of an Execute-Method sub-operation, tagged by ownership.
///
/// Ownership is explicit in the type, never inferred: `Engine` output was
/// allocated by the engine and belongs to the caller once the handle gives
/// it out; `Caller` output was bounded by the capacity the caller granted
/// at append time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecOutput {
    /// Engine-allocated output of whatever size the method produced.
    Engine(Vec<u8>),
    /// Output written within a caller-granted capacity.
    Caller { written: Vec<u8>, capacity: usize },
}

impl ExecOutput {
    /// The output bytes, regardless of ownership mode.
    pub fn bytes(&self) -> &[u8] {
        match self {
            ExecOutput::Engine(bytes) => bytes,
            ExecOutput::Caller { written, .. } => written,
        }
    }
}

// ---------------------------------------------------------------------------
// Caller-side handles
// ---------------------------------------------------------------------------

/// Caller-side view of a Read-Range sub-operation's result.
///
/// All accessors return `None` until the sub-operation has been reached by
/// a dispatch.
#[derive(Clone)]
pub struct ReadHandle {
    pub(crate) slot: Slot<ReadOutcome>,
}

impl ReadHandle {
    /// The sub-operation's recorded return code.
    pub fn rval(&self) -> Option<OpResult<()>> {
        self.slot.get().map(|o| o.rval.clone())
    }

    /// Number of bytes actually read. Short reads report the stored
    /// length, not the requested one.
    pub fn bytes_read(&self) -> Option<usize> {
        self.slot.get().map(|o| o.data.len())
    }

    /// The bytes read.
    pub fn data(&self) -> Option<&[u8]> {
        self.slot.get().map(|o| o.data.as_slice())
    }
}

/// Caller-side view of a Stat sub-operation's result.
#[derive(Clone)]
pub struct StatHandle {
    pub(crate) slot: Slot<StatOutcome>,
}

impl StatHandle {
    /// The sub-operation's recorded return code.
    ///
    /// On a missing object this is `Err(Io)` even though the overall
    /// status is NotFound; `size()` and `mtime()` stay `None`.
    pub fn rval(&self) -> Option<OpResult<()>> {
        self.slot.get().map(|o| o.rval.clone())
    }

    /// Object size in bytes, if the stat succeeded.
    pub fn size(&self) -> Option<u64> {
        self.slot.get().and_then(|o| o.stat.map(|s| s.size))
    }

    /// Last modification time, if the stat succeeded.
    pub fn mtime(&self) -> Option<DateTime<Utc>> {
        self.slot.get().and_then(|o| o.stat.map(|s| s.mtime))
    }
}

/// Caller-side view of an Execute-Method sub-operation's result.
#[derive(Clone)]
pub struct ExecHandle {
    pub(crate) slot: Slot<ExecOutcome>,
}

impl ExecHandle {
    /// The sub-operation's recorded return code.
    pub fn rval(&self) -> Option<OpResult<()>> {
        self.slot.get().map(|o| o.rval.clone())
    }

    /// Number of output bytes produced. Zero when the method failed or
    /// the caller's capacity was insufficient.
    pub fn bytes_read(&self) -> Option<usize> {
        self.slot
            .get()
            .map(|o| o.output.as_ref().map_or(0, |out| out.bytes().len()))
    }

    /// The output bytes, if any were produced.
    pub fn output(&self) -> Option<&[u8]> {
        self.slot
            .get()
            .and_then(|o| o.output.as_ref())
            .map(ExecOutput::bytes)
    }

    /// The output buffer with its ownership tag, if any was produced.
    pub fn output_buffer(&self) -> Option<&ExecOutput> {
        self.slot.get().and_then(|o| o.output.as_ref())
    }
}

/// Caller-side view of a Get-All-XAttrs sub-operation's result.
#[derive(Clone)]
pub struct XattrsHandle {
    pub(crate) slot: Slot<XattrsOutcome>,
}

impl XattrsHandle {
    /// The sub-operation's recorded return code.
    pub fn rval(&self) -> Option<OpResult<()>> {
        self.slot.get().map(|o| o.rval.clone())
    }

    /// A cursor over the snapshot taken at evaluation time.
    ///
    /// Returns `None` until the sub-operation has been reached. Each call
    /// produces a fresh cursor over the same immutable snapshot.
    pub fn cursor(&self) -> Option<XattrCursor> {
        self.slot
            .get()
            .map(|o| XattrCursor::new(o.entries.clone()))
    }
}
