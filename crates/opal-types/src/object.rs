use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque name of a storage object within a namespace.
///
/// Object names are chosen by the caller and carry no structure the engine
/// interprets; the backend resolves them within whatever pool or container
/// the session is bound to. An `ObjectId` is immutable once passed to a
/// dispatch call.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create an object identifier from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The object name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:?})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_name() {
        let id = ObjectId::new("testobj");
        assert_eq!(format!("{id}"), "testobj");
        assert_eq!(id.as_str(), "testobj");
    }

    #[test]
    fn equality_is_by_name() {
        assert_eq!(ObjectId::from("a"), ObjectId::new("a"));
        assert_ne!(ObjectId::from("a"), ObjectId::from("b"));
    }

    #[test]
    fn serde_roundtrip() {
        let id = ObjectId::new("pool/testobj");
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
