//! Document-store access: path locators for provider and patient records,
//! and the `DocumentStore` seam the HTTP handlers and signup trigger write
//! through. Locators are handles only; no I/O happens until a caller issues
//! a read or write against one.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A stored document body. Documents are schema-less JSON objects, matching
/// the data model of the backing document database.
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document at {0}")]
    NotFound(DocPath),
    #[error("document store failure: {0}")]
    Backend(String),
}

/// Locator for a single document. Identifier shape is not validated here;
/// a malformed identifier simply resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPath(String);

/// Locator for a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath(String);

impl DocPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl CollectionPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn doc(&self, id: &str) -> DocPath {
        DocPath(format!("{}/{id}", self.0))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locator for a provider's own record, keyed by the verified subject id.
pub fn provider_doc(provider_id: &str) -> DocPath {
    DocPath(format!("providers/{provider_id}"))
}

/// Locator for the patient sub-collection owned by one provider.
pub fn patients_collection(provider_id: &str) -> CollectionPath {
    CollectionPath(format!("providers/{provider_id}/patients"))
}

/// Locator for a specific patient record within a provider's scope.
pub fn patient_doc(provider_id: &str, patient_id: &str) -> DocPath {
    patients_collection(provider_id).doc(patient_id)
}

/// A collection query: optional field-equality filter, ascending order by one
/// field, and limit/offset pagination.
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) order_by: String,
    pub(crate) filter: Option<(String, Value)>,
    pub(crate) limit: usize,
    pub(crate) offset: usize,
}

impl Query {
    pub fn order_by(field: impl Into<String>) -> Self {
        Self {
            order_by: field.into(),
            filter: None,
            limit: usize::MAX,
            offset: 0,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` when nothing exists at the path.
    async fn get(&self, doc: &DocPath) -> Result<Option<Document>, StoreError>;

    /// Write a document, fully replacing any existing data at the path.
    async fn set(&self, doc: &DocPath, data: Document) -> Result<(), StoreError>;

    /// Merge fields into an existing document. Top-level keys in `data`
    /// replace their counterparts; all other stored fields are untouched.
    /// Fails with `NotFound` when no document exists at the path.
    async fn merge(&self, doc: &DocPath, data: Document) -> Result<(), StoreError>;

    /// Delete a document. Deleting a path with no document is a no-op.
    async fn delete(&self, doc: &DocPath) -> Result<(), StoreError>;

    /// Insert a document into a collection under a generated id.
    async fn add(&self, collection: &CollectionPath, data: Document) -> Result<String, StoreError>;

    /// Run a query over the direct children of a collection, returning
    /// `(id, document)` pairs in query order.
    async fn query(
        &self,
        collection: &CollectionPath,
        query: Query,
    ) -> Result<Vec<(String, Document)>, StoreError>;
}

/// Serialize a value into a document body.
pub fn document_from<T: serde::Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value).map_err(|e| StoreError::Backend(e.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Backend("payload is not a JSON object".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locators_derive_nested_paths() {
        assert_eq!(provider_doc("abc").as_str(), "providers/abc");
        assert_eq!(
            patients_collection("abc").as_str(),
            "providers/abc/patients"
        );
        assert_eq!(
            patient_doc("abc", "p1").as_str(),
            "providers/abc/patients/p1"
        );
        assert_eq!(
            patients_collection("abc").doc("p1"),
            patient_doc("abc", "p1")
        );
    }

    #[test]
    fn document_from_rejects_non_objects() {
        assert!(document_from(&serde_json::json!({"a": 1})).is_ok());
        assert!(document_from(&"just a string").is_err());
    }
}
