use opal_types::ObjectId;

/// Errors from storage backend primitives.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The object exists but carries no attribute with this name.
    #[error("object {object} has no attribute {name:?}")]
    NoSuchAttribute { object: ObjectId, name: String },

    /// No method is registered under this service/method pair.
    #[error("no registered method {service}.{method}")]
    NoSuchMethod { service: String, method: String },

    /// A registered method ran and reported failure.
    #[error("method {service}.{method} failed: {reason}")]
    MethodFailed {
        service: String,
        method: String,
        reason: String,
    },

    /// I/O error from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;
