use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use opal_store::{StorageBackend, StoreError};
use opal_types::{ObjectId, OpError, OpResult};

use crate::completion::Completion;
use crate::op::{ReadOperation, SubOpKind};
use crate::slot::{ExecOutcome, ExecOutput, ReadOutcome, StatOutcome, XattrsOutcome};

/// Executes composite read operations against a storage backend.
///
/// The engine owns the worker threads that carry asynchronous dispatches;
/// synchronous [`operate`] runs on the caller's thread and blocks for the
/// full round-trip. Sub-operations within one operation are never
/// parallelized against each other: later sub-operations may depend on
/// earlier ones not having cancelled the sequence.
///
/// [`operate`]: DispatchEngine::operate
pub struct DispatchEngine {
    backend: Arc<dyn StorageBackend>,
    runtime: Runtime,
}

impl DispatchEngine {
    /// Create an engine over the given backend, starting the worker
    /// runtime for asynchronous completions.
    pub fn new(backend: Arc<dyn StorageBackend>) -> OpResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("opal-dispatch")
            .enable_all()
            .build()
            .map_err(|e| OpError::Io(e.to_string()))?;
        info!("dispatch engine started");
        Ok(Self { backend, runtime })
    }

    /// Dispatch synchronously: execute every sub-operation in append
    /// order, stop at the first failure not marked FAILOK, and return the
    /// overall status.
    ///
    /// `Ok(0)` means every sub-operation succeeded; `Ok(1)` means the
    /// operation contained a comparison guard that evaluated true. On
    /// `Err`, sub-operations after the stopping point were not applied
    /// and their result slots are untouched.
    pub fn operate(&self, op: ReadOperation, id: &ObjectId) -> OpResult<i32> {
        execute(self.backend.as_ref(), op, id)
    }

    /// Dispatch asynchronously: claim the completion, hand the execution
    /// to the engine runtime, and return immediately.
    ///
    /// Fails synchronously with `Err(Rejected)` if the completion is
    /// already in flight or was already consumed; no backend interaction
    /// happens in that case. On acceptance, execution proceeds exactly as
    /// in [`operate`]; every result-slot write happens-before the
    /// completion's Complete transition.
    ///
    /// [`operate`]: DispatchEngine::operate
    pub fn operate_async(
        &self,
        op: ReadOperation,
        completion: &Completion,
        id: &ObjectId,
    ) -> OpResult<()> {
        completion.claim()?;
        let backend = Arc::clone(&self.backend);
        let completion = completion.clone();
        let id = id.clone();
        self.runtime.spawn(async move {
            let status = execute(backend.as_ref(), op, &id);
            completion.finish(status);
        });
        Ok(())
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine").finish_non_exhaustive()
    }
}

/// Run the sub-operation sequence to completion or first-stop.
fn execute(backend: &dyn StorageBackend, op: ReadOperation, id: &ObjectId) -> OpResult<i32> {
    let (subops, flags) = op.into_parts();
    debug!(object = %id, subops = subops.len(), "dispatch read operation");

    let mut overall = 0;
    for (index, sub) in subops.into_iter().enumerate() {
        let fail_ok = flags.fail_ok || sub.fail_ok;
        match eval_subop(backend, id, sub.kind) {
            Ok(value) => overall = overall.max(value),
            Err(err) if fail_ok => {
                debug!(object = %id, index, %err, "sub-operation failed, FAILOK set");
            }
            Err(err) => {
                debug!(object = %id, index, %err, "sub-operation failed, stopping");
                return Err(err);
            }
        }
    }
    Ok(overall)
}

/// Evaluate one sub-operation, recording its outcome in its result slot.
///
/// The returned value feeds the overall status: 0 for plain success, 1
/// for a comparison guard that evaluated true.
fn eval_subop(backend: &dyn StorageBackend, id: &ObjectId, kind: SubOpKind) -> OpResult<i32> {
    match kind {
        SubOpKind::AssertExists => match backend.exists(id) {
            Ok(true) => Ok(0),
            Ok(false) => Err(OpError::NotFound(id.clone())),
            Err(err) => Err(store_err(err)),
        },

        SubOpKind::CmpXattr { name, op, value } => match backend.get_xattr(id, &name) {
            Ok(stored) => {
                if op.evaluate(&value, &stored) {
                    Ok(1)
                } else {
                    Err(OpError::Cancelled)
                }
            }
            // A missing attribute is a false match; a missing object is
            // NotFound. Both come out of store_err.
            Err(err) => Err(store_err(err)),
        },

        SubOpKind::Read { offset, len, slot } => match backend.read_range(id, offset, len) {
            Ok(data) => {
                slot.fill(ReadOutcome { rval: Ok(()), data });
                Ok(0)
            }
            Err(err) => {
                let err = store_err(err);
                slot.fill(ReadOutcome {
                    rval: Err(err.clone()),
                    data: Vec::new(),
                });
                Err(err)
            }
        },

        SubOpKind::Stat { slot } => match backend.stat(id) {
            Ok(stat) => {
                slot.fill(StatOutcome {
                    rval: Ok(()),
                    stat: Some(stat),
                });
                Ok(0)
            }
            Err(StoreError::NotFound(oid)) => {
                // The recorded sub-op code is an I/O error even though the
                // overall status is NotFound; size and mtime stay
                // untouched.
                slot.fill(StatOutcome {
                    rval: Err(OpError::Io("stat on missing object".to_string())),
                    stat: None,
                });
                Err(OpError::NotFound(oid))
            }
            Err(err) => {
                let err = store_err(err);
                slot.fill(StatOutcome {
                    rval: Err(err.clone()),
                    stat: None,
                });
                Err(err)
            }
        },

        SubOpKind::Exec {
            service,
            method,
            input,
            capacity,
            slot,
        } => match backend.invoke_method(id, &service, &method, &input) {
            Ok(output) => match capacity {
                Some(capacity) if output.len() > capacity => {
                    let err = OpError::Range {
                        needed: output.len(),
                        capacity,
                    };
                    // Caller capacity is insufficient: zero bytes written.
                    slot.fill(ExecOutcome {
                        rval: Err(err.clone()),
                        output: None,
                    });
                    Err(err)
                }
                Some(capacity) => {
                    slot.fill(ExecOutcome {
                        rval: Ok(()),
                        output: Some(ExecOutput::Caller {
                            written: output,
                            capacity,
                        }),
                    });
                    Ok(0)
                }
                None => {
                    slot.fill(ExecOutcome {
                        rval: Ok(()),
                        output: Some(ExecOutput::Engine(output)),
                    });
                    Ok(0)
                }
            },
            Err(err) => {
                let err = store_err(err);
                slot.fill(ExecOutcome {
                    rval: Err(err.clone()),
                    output: None,
                });
                Err(err)
            }
        },

        SubOpKind::GetXattrs { slot } => match backend.list_xattrs(id) {
            Ok(entries) => {
                slot.fill(XattrsOutcome {
                    rval: Ok(()),
                    entries,
                });
                Ok(0)
            }
            Err(err) => {
                let err = store_err(err);
                slot.fill(XattrsOutcome {
                    rval: Err(err.clone()),
                    entries: Vec::new(),
                });
                Err(err)
            }
        },
    }
}

/// Map a backend failure into the dispatch status taxonomy.
fn store_err(err: StoreError) -> OpError {
    match err {
        StoreError::NotFound(id) => OpError::NotFound(id),
        StoreError::NoSuchAttribute { .. } => OpError::Cancelled,
        StoreError::NoSuchMethod { service, method } => OpError::Unsupported { service, method },
        StoreError::MethodFailed {
            service,
            method,
            reason,
        } => OpError::Io(format!("{service}.{method}: {reason}")),
        StoreError::Io(err) => OpError::Io(err.to_string()),
    }
}
