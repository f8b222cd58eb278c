//! Foundation types for Opal, a client-side composite read-operation engine
//! for distributed object stores.
//!
//! This crate provides the value types shared by every other Opal crate.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Opaque name of a storage object within a namespace
//! - [`CompareOp`] — Comparison operator for extended-attribute guards
//! - [`OperationFlags`] — Operation-wide dispatch flags (FAILOK et al.)
//! - [`OpError`] / [`OpResult`] — The status taxonomy every dispatch
//!   outcome is expressed in

pub mod compare;
pub mod error;
pub mod flags;
pub mod object;

pub use compare::CompareOp;
pub use error::{OpError, OpResult};
pub use flags::OperationFlags;
pub use object::ObjectId;
