//! Compartment labels.

use std::sync::Arc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A compartment label, e.g. `"S"`, `"I"`, `"R"`.
///
/// Labels are compared by value and cloned on every state change, so the
/// text lives behind an `Arc` and a clone is a reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Compartment(Arc<str>);

impl Compartment {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Compartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Compartment {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Compartment {
    fn from(label: String) -> Self {
        Self(Arc::from(label))
    }
}

impl Serialize for Compartment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Compartment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Compartment::from)
    }
}
