//! Storage backend interface for Opal.
//!
//! The read-operation engine never talks to a cluster directly; it consumes
//! the narrow [`StorageBackend`] trait defined here. Anything that can
//! answer existence checks, ranged reads, stats, extended-attribute lookups
//! and server-side method invocations can sit behind the engine.
//!
//! # Backends
//!
//! - [`InMemoryBackend`] — `HashMap`-based backend for tests and embedding,
//!   with a registered-method table standing in for server-side plugin
//!   classes.
//!
//! # Design Rules
//!
//! 1. Backend primitives are read-only with respect to object data; the
//!    provisioning helpers on [`InMemoryBackend`] exist for setup only.
//! 2. `list_xattrs` returns an atomic snapshot in a stable order.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryBackend, MethodHandler};
pub use object::{ObjectRecord, ObjectStat};
pub use traits::StorageBackend;
