use opal_types::ObjectId;

use crate::error::StoreResult;
use crate::object::ObjectStat;

/// The primitive operations the read-operation engine consumes.
///
/// All implementations must satisfy these invariants:
/// - Primitives never mutate object data or attributes.
/// - `read_range` past the stored length returns the available suffix
///   (possibly empty), never an error.
/// - `list_xattrs` returns an atomic snapshot of the attribute set in an
///   order that is stable for a given set.
/// - All I/O errors are propagated, never silently ignored.
pub trait StorageBackend: Send + Sync {
    /// Whether the object exists.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read up to `len` bytes starting at `offset`.
    ///
    /// Returns `Err(NotFound)` if the object does not exist.
    fn read_range(&self, id: &ObjectId, offset: u64, len: usize) -> StoreResult<Vec<u8>>;

    /// Size and modification time of the object.
    fn stat(&self, id: &ObjectId) -> StoreResult<ObjectStat>;

    /// The value of one extended attribute.
    ///
    /// Returns `Err(NoSuchAttribute)` when the object exists but the
    /// attribute does not.
    fn get_xattr(&self, id: &ObjectId, name: &str) -> StoreResult<Vec<u8>>;

    /// Atomic snapshot of all extended attributes, in stable order.
    fn list_xattrs(&self, id: &ObjectId) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Invoke a server-side method registered under `service`/`method`
    /// against the object, returning its output bytes.
    fn invoke_method(
        &self,
        id: &ObjectId,
        service: &str,
        method: &str,
        input: &[u8],
    ) -> StoreResult<Vec<u8>>;
}
