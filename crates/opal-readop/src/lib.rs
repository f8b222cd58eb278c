//! Atomic composite read-operation engine.
//!
//! A [`ReadOperation`] batches heterogeneous read-type sub-operations —
//! existence assertions, extended-attribute guards, ranged reads, stats,
//! server-side method execution, attribute enumeration — into one unit
//! that is dispatched atomically against a single named object: either
//! every sub-operation succeeds, or the first failure stops the sequence
//! and becomes the overall status, with later sub-operations left
//! untouched.
//!
//! # Building and dispatching
//!
//! ```
//! use std::sync::Arc;
//! use opal_readop::{DispatchEngine, ReadOperation};
//! use opal_store::InMemoryBackend;
//! use opal_types::ObjectId;
//!
//! let backend = Arc::new(InMemoryBackend::new());
//! let oid = ObjectId::new("testobj");
//! backend.write(&oid, b"testdata");
//!
//! let engine = DispatchEngine::new(backend).unwrap();
//! let mut op = ReadOperation::new();
//! let read = op.read(0, 8);
//! let stat = op.stat();
//! assert_eq!(engine.operate(op, &oid), Ok(0));
//! assert_eq!(read.data().unwrap(), b"testdata");
//! assert_eq!(stat.size(), Some(8));
//! ```
//!
//! # Asynchronous dispatch
//!
//! [`DispatchEngine::operate_async`] hands the same execution to an
//! engine-owned worker and returns immediately; the caller observes the
//! outcome through a [`Completion`]. All result-slot writes happen before
//! the completion's `Pending -> Complete` transition, which is the only
//! cross-thread handshake callers may rely on.

pub mod completion;
pub mod engine;
pub mod op;
pub mod slot;
pub mod xattrs;

pub use completion::Completion;
pub use engine::DispatchEngine;
pub use op::ReadOperation;
pub use slot::{ExecHandle, ExecOutput, ReadHandle, StatHandle, XattrsHandle};
pub use xattrs::XattrCursor;
