use opal_types::{CompareOp, OperationFlags};

use crate::slot::{
    ExecHandle, ExecOutcome, ReadHandle, ReadOutcome, Slot, StatHandle, StatOutcome,
    XattrsHandle, XattrsOutcome,
};

/// One sub-operation within a composite read operation.
///
/// A tagged union with all inputs fixed at append time; the engine
/// evaluates each tag with its own function, in append order.
pub(crate) enum SubOpKind {
    /// Fail the operation with NotFound unless the object exists.
    AssertExists,
    /// Compare the supplied value against a stored extended attribute;
    /// a false match cancels the sequence.
    CmpXattr {
        name: String,
        op: CompareOp,
        value: Vec<u8>,
    },
    /// Read `len` bytes starting at `offset`.
    Read {
        offset: u64,
        len: usize,
        slot: Slot<ReadOutcome>,
    },
    /// Object size and modification time.
    Stat { slot: Slot<StatOutcome> },
    /// Invoke a server-side method. `capacity` bounds the output when the
    /// caller supplies its own buffer; `None` lets the engine allocate.
    Exec {
        service: String,
        method: String,
        input: Vec<u8>,
        capacity: Option<usize>,
        slot: Slot<ExecOutcome>,
    },
    /// Snapshot all extended attributes.
    GetXattrs { slot: Slot<XattrsOutcome> },
}

pub(crate) struct SubOp {
    pub kind: SubOpKind,
    /// Per-sub-operation FAILOK. Either this or the operation-wide flag
    /// suppresses propagation of this sub-operation's failure.
    pub fail_ok: bool,
}

/// An ordered batch of read-type sub-operations, dispatched atomically
/// against a single object.
///
/// Created empty, built by appends (each append hands back the matching
/// result handle), and consumed by value exactly once by
/// [`DispatchEngine::operate`] or [`DispatchEngine::operate_async`].
/// Order is significant: evaluation and the first-failure stop follow
/// append order.
///
/// [`DispatchEngine::operate`]: crate::DispatchEngine::operate
/// [`DispatchEngine::operate_async`]: crate::DispatchEngine::operate_async
#[derive(Default)]
pub struct ReadOperation {
    subops: Vec<SubOp>,
    flags: OperationFlags,
}

impl ReadOperation {
    /// Create an empty operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set operation-wide flags; they apply to every sub-operation at
    /// dispatch time.
    pub fn set_flags(&mut self, flags: OperationFlags) {
        self.flags = flags;
    }

    /// Mark the most recently appended sub-operation FAILOK: its failure
    /// is recorded in its result slot but neither stops the sequence nor
    /// reaches the overall status. Does nothing on an empty operation.
    pub fn allow_failure(&mut self) -> &mut Self {
        if let Some(sub) = self.subops.last_mut() {
            sub.fail_ok = true;
        }
        self
    }

    /// Append an existence assertion.
    pub fn assert_exists(&mut self) {
        self.push(SubOpKind::AssertExists);
    }

    /// Append an extended-attribute guard comparing `value` against the
    /// stored attribute `name` with `op`.
    pub fn cmpxattr(&mut self, name: &str, op: CompareOp, value: &[u8]) {
        self.push(SubOpKind::CmpXattr {
            name: name.to_string(),
            op,
            value: value.to_vec(),
        });
    }

    /// Append a ranged read of up to `len` bytes starting at `offset`.
    pub fn read(&mut self, offset: u64, len: usize) -> ReadHandle {
        let slot = Slot::new();
        self.push(SubOpKind::Read {
            offset,
            len,
            slot: slot.clone(),
        });
        ReadHandle { slot }
    }

    /// Append a stat of the object's size and modification time.
    pub fn stat(&mut self) -> StatHandle {
        let slot = Slot::new();
        self.push(SubOpKind::Stat { slot: slot.clone() });
        StatHandle { slot }
    }

    /// Append a method execution whose output buffer the engine
    /// allocates at whatever size the method produces.
    pub fn exec(&mut self, service: &str, method: &str, input: &[u8]) -> ExecHandle {
        self.push_exec(service, method, input, None)
    }

    /// Append a method execution bounded by a caller-granted output
    /// capacity. If the method's output exceeds `capacity`, the
    /// sub-operation records zero bytes written and a range error.
    pub fn exec_into(
        &mut self,
        service: &str,
        method: &str,
        input: &[u8],
        capacity: usize,
    ) -> ExecHandle {
        self.push_exec(service, method, input, Some(capacity))
    }

    /// Append an atomic snapshot of all extended attributes.
    pub fn get_xattrs(&mut self) -> XattrsHandle {
        let slot = Slot::new();
        self.push(SubOpKind::GetXattrs { slot: slot.clone() });
        XattrsHandle { slot }
    }

    /// Number of sub-operations appended so far.
    pub fn len(&self) -> usize {
        self.subops.len()
    }

    /// Returns `true` if no sub-operations have been appended.
    pub fn is_empty(&self) -> bool {
        self.subops.is_empty()
    }

    fn push(&mut self, kind: SubOpKind) {
        self.subops.push(SubOp {
            kind,
            fail_ok: false,
        });
    }

    fn push_exec(
        &mut self,
        service: &str,
        method: &str,
        input: &[u8],
        capacity: Option<usize>,
    ) -> ExecHandle {
        let slot = Slot::new();
        self.push(SubOpKind::Exec {
            service: service.to_string(),
            method: method.to_string(),
            input: input.to_vec(),
            capacity,
            slot: slot.clone(),
        });
        ExecHandle { slot }
    }

    pub(crate) fn into_parts(self) -> (Vec<SubOp>, OperationFlags) {
        (self.subops, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_operation_is_empty() {
        let op = ReadOperation::new();
        assert!(op.is_empty());
        assert_eq!(op.len(), 0);
    }

    #[test]
    fn appends_preserve_order() {
        let mut op = ReadOperation::new();
        op.assert_exists();
        let _read = op.read(0, 8);
        let _stat = op.stat();
        assert_eq!(op.len(), 3);

        let (subops, _) = op.into_parts();
        assert!(matches!(subops[0].kind, SubOpKind::AssertExists));
        assert!(matches!(subops[1].kind, SubOpKind::Read { .. }));
        assert!(matches!(subops[2].kind, SubOpKind::Stat { .. }));
    }

    #[test]
    fn allow_failure_marks_only_the_last_append() {
        let mut op = ReadOperation::new();
        let _read = op.read(0, 8);
        op.cmpxattr("guard", CompareOp::Eq, b"v");
        op.allow_failure();

        let (subops, _) = op.into_parts();
        assert!(!subops[0].fail_ok);
        assert!(subops[1].fail_ok);
    }

    #[test]
    fn allow_failure_on_empty_operation_is_a_no_op() {
        let mut op = ReadOperation::new();
        op.allow_failure();
        assert!(op.is_empty());
    }

    #[test]
    fn flags_are_carried() {
        let mut op = ReadOperation::new();
        op.set_flags(OperationFlags::fail_ok());
        let (_, flags) = op.into_parts();
        assert!(flags.fail_ok);
    }

    #[test]
    fn handles_are_empty_before_dispatch() {
        let mut op = ReadOperation::new();
        let read = op.read(0, 8);
        let stat = op.stat();
        let exec = op.exec("cls", "m", b"");
        let xattrs = op.get_xattrs();

        assert!(read.rval().is_none());
        assert!(stat.size().is_none());
        assert!(exec.output().is_none());
        assert!(xattrs.cursor().is_none());
    }
}
