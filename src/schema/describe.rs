//! Schema description — the serializable view a storage layer consumes.
//!
//! ```text
//! Schema<M> → describe() → SchemaDescription → to_json()
//!   → storage/decoding layer learns which paths to read and how to type them
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// Kind of a property, without the type details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Value,
    List,
    ToOne,
    ToMany,
}

/// One property as seen by storage code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescription {
    /// Accessor chain, e.g. `Book.author`.
    pub key: String,
    /// Storage path.
    pub path: String,
    pub kind: PropertyKind,
    /// Scalar, list element, or related model name.
    pub type_name: String,
    pub nullable: bool,
}

/// All properties of one schema, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub name: String,
    pub properties: Vec<PropertyDescription>,
}

impl SchemaDescription {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Storage paths in declaration order. Paths shared by a to-one and
    /// its inverse to-many are listed once per property.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.path.as_str())
    }
}
