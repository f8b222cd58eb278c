use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::debug;

use opal_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectRecord, ObjectStat};
use crate::traits::StorageBackend;

/// A registered server-side method.
///
/// Handlers receive the method input and the current object record and
/// return output bytes or a failure reason.
pub type MethodHandler =
    Arc<dyn Fn(&[u8], &ObjectRecord) -> Result<Vec<u8>, String> + Send + Sync>;

/// In-memory, HashMap-based storage backend.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock`
/// for safe concurrent access; the method registry stands in for the
/// server-side plugin classes a real cluster would dispatch to.
#[derive(Default)]
pub struct InMemoryBackend {
    objects: RwLock<HashMap<ObjectId, ObjectRecord>>,
    methods: RwLock<HashMap<(String, String), MethodHandler>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Provisioning helpers (not part of the engine-facing trait) ----

    /// Create or replace an object with the given bytes.
    pub fn write(&self, id: &ObjectId, data: &[u8]) {
        let mut map = self.objects.write().expect("lock poisoned");
        debug!(object = %id, bytes = data.len(), "write object");
        map.insert(id.clone(), ObjectRecord::new(data.to_vec()));
    }

    /// Remove an object. Returns `true` if it existed.
    pub fn remove(&self, id: &ObjectId) -> bool {
        let mut map = self.objects.write().expect("lock poisoned");
        debug!(object = %id, "remove object");
        map.remove(id).is_some()
    }

    /// Set one extended attribute on an existing object.
    ///
    /// Values are raw bytes; embedded NULs are preserved.
    pub fn set_xattr(&self, id: &ObjectId, name: &str, value: &[u8]) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        let record = map
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.xattrs.insert(name.to_string(), value.to_vec());
        record.mtime = Utc::now();
        Ok(())
    }

    /// Register a method under a service/method pair.
    ///
    /// Replaces any previous handler for the same pair.
    pub fn register_method(
        &self,
        service: &str,
        method: &str,
        handler: impl Fn(&[u8], &ObjectRecord) -> Result<Vec<u8>, String> + Send + Sync + 'static,
    ) {
        let mut methods = self.methods.write().expect("lock poisoned");
        methods.insert(
            (service.to_string(), method.to_string()),
            Arc::new(handler),
        );
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the backend holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Remove all objects. The method registry is untouched.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }

    fn with_record<T>(
        &self,
        id: &ObjectId,
        f: impl FnOnce(&ObjectRecord) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let map = self.objects.read().expect("lock poisoned");
        match map.get(id) {
            Some(record) => f(record),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}

impl StorageBackend for InMemoryBackend {
    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn read_range(&self, id: &ObjectId, offset: u64, len: usize) -> StoreResult<Vec<u8>> {
        self.with_record(id, |record| Ok(record.range(offset, len).to_vec()))
    }

    fn stat(&self, id: &ObjectId) -> StoreResult<ObjectStat> {
        self.with_record(id, |record| Ok(record.stat()))
    }

    fn get_xattr(&self, id: &ObjectId, name: &str) -> StoreResult<Vec<u8>> {
        self.with_record(id, |record| {
            record
                .xattrs
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::NoSuchAttribute {
                    object: id.clone(),
                    name: name.to_string(),
                })
        })
    }

    fn list_xattrs(&self, id: &ObjectId) -> StoreResult<Vec<(String, Vec<u8>)>> {
        // BTreeMap iteration gives the stable (key-sorted) snapshot order.
        self.with_record(id, |record| {
            Ok(record
                .xattrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        })
    }

    fn invoke_method(
        &self,
        id: &ObjectId,
        service: &str,
        method: &str,
        input: &[u8],
    ) -> StoreResult<Vec<u8>> {
        let handler = {
            let methods = self.methods.read().expect("lock poisoned");
            methods
                .get(&(service.to_string(), method.to_string()))
                .cloned()
        };
        let handler = handler.ok_or_else(|| StoreError::NoSuchMethod {
            service: service.to_string(),
            method: method.to_string(),
        })?;

        self.with_record(id, |record| {
            handler(input, record).map_err(|reason| StoreError::MethodFailed {
                service: service.to_string(),
                method: method.to_string(),
                reason,
            })
        })
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with(id: &ObjectId, data: &[u8]) -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend.write(id, data);
        backend
    }

    #[test]
    fn write_then_read_range() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"testdata");
        assert_eq!(backend.read_range(&id, 0, 8).unwrap(), b"testdata");
        assert_eq!(backend.read_range(&id, 4, 2).unwrap(), b"da");
    }

    #[test]
    fn read_range_clamps_short() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"testdata");
        assert_eq!(backend.read_range(&id, 0, 16).unwrap(), b"testdata");
        assert_eq!(backend.read_range(&id, 20, 4).unwrap(), b"");
    }

    #[test]
    fn missing_object_errors() {
        let backend = InMemoryBackend::new();
        let id = ObjectId::new("nope");
        assert!(!backend.exists(&id).unwrap());
        assert!(matches!(
            backend.read_range(&id, 0, 1),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(backend.stat(&id), Err(StoreError::NotFound(_))));
        assert!(matches!(
            backend.list_xattrs(&id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn stat_reports_size() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"testdata");
        assert_eq!(backend.stat(&id).unwrap().size, 8);
    }

    #[test]
    fn xattrs_roundtrip_with_embedded_nuls() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"x");
        backend.set_xattr(&id, "test2", b"va\0lue").unwrap();
        backend.set_xattr(&id, "bar", b"").unwrap();

        assert_eq!(backend.get_xattr(&id, "test2").unwrap(), b"va\0lue");
        assert_eq!(backend.get_xattr(&id, "bar").unwrap(), b"");
    }

    #[test]
    fn get_missing_xattr() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"x");
        assert!(matches!(
            backend.get_xattr(&id, "absent"),
            Err(StoreError::NoSuchAttribute { .. })
        ));
    }

    #[test]
    fn set_xattr_on_missing_object() {
        let backend = InMemoryBackend::new();
        let id = ObjectId::new("nope");
        assert!(matches!(
            backend.set_xattr(&id, "a", b"b"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn list_xattrs_is_key_sorted() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"x");
        backend.set_xattr(&id, "foo", b"\0").unwrap();
        backend.set_xattr(&id, "bar", b"").unwrap();
        backend.set_xattr(&id, "test1", b"abc").unwrap();

        let listed = backend.list_xattrs(&id).unwrap();
        let keys: Vec<&str> = listed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["bar", "foo", "test1"]);
    }

    #[test]
    fn invoke_registered_method() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"testdata");
        backend.register_method("cls", "size_le", |input, record| {
            let limit = input.first().copied().unwrap_or(0) as u64;
            Ok(vec![u8::from(record.size() <= limit)])
        });

        assert_eq!(
            backend.invoke_method(&id, "cls", "size_le", &[16]).unwrap(),
            vec![1]
        );
        assert_eq!(
            backend.invoke_method(&id, "cls", "size_le", &[4]).unwrap(),
            vec![0]
        );
    }

    #[test]
    fn invoke_unregistered_method() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"x");
        assert!(matches!(
            backend.invoke_method(&id, "cls", "nope", &[]),
            Err(StoreError::NoSuchMethod { .. })
        ));
    }

    #[test]
    fn invoke_method_on_missing_object() {
        let backend = InMemoryBackend::new();
        backend.register_method("cls", "echo", |input, _| Ok(input.to_vec()));
        let id = ObjectId::new("nope");
        assert!(matches!(
            backend.invoke_method(&id, "cls", "echo", &[]),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn method_failure_carries_reason() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"x");
        backend.register_method("cls", "broken", |_, _| Err("bad input".to_string()));
        let err = backend.invoke_method(&id, "cls", "broken", &[]).unwrap_err();
        assert!(err.to_string().contains("bad input"));
    }

    #[test]
    fn remove_is_idempotent() {
        let id = ObjectId::new("testobj");
        let backend = backend_with(&id, b"x");
        assert!(backend.remove(&id));
        assert!(!backend.remove(&id));
        assert!(backend.is_empty());
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let backend = Arc::new(InMemoryBackend::new());
        let id = ObjectId::new("shared");
        backend.write(&id, b"shared data");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = Arc::clone(&backend);
                let id = id.clone();
                thread::spawn(move || {
                    let data = backend.read_range(&id, 0, 64).unwrap();
                    assert_eq!(data, b"shared data");
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }
}
