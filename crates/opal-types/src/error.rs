use thiserror::Error;

use crate::object::ObjectId;

/// Failure taxonomy for composite read-operation dispatch.
///
/// Every outcome of a dispatch — the overall status as well as each
/// sub-operation's recorded return code — is expressed in these terms.
/// None of them is fatal; all surface as values, never panics.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OpError {
    /// The target object did not exist at evaluation time.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// A comparison guard evaluated false and cancelled the sequence.
    #[error("operation cancelled: comparison guard evaluated false")]
    Cancelled,

    /// A caller-supplied output buffer was too small for the result.
    #[error("output buffer too small: need {needed} bytes, capacity {capacity}")]
    Range { needed: usize, capacity: usize },

    /// The submission itself was malformed and never reached the backend.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// No method is registered under the requested service/method pair.
    #[error("no registered method {service}.{method}")]
    Unsupported { service: String, method: String },

    /// An I/O failure in the storage backend.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias for dispatch outcomes and sub-operation return codes.
pub type OpResult<T> = Result<T, OpError>;
