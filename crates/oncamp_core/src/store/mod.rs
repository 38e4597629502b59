//! Document store seam and bundled backends.
//!
//! # Responsibility
//! - Define the asynchronous collection/document contract the repository
//!   layer talks to.
//! - Provide local backends (in-memory, SQLite) of that contract.
//!
//! # Invariants
//! - Collection paths alternate collection and document segments and always
//!   end with a collection segment.
//! - Segments are non-empty and never contain `/`.
//! - `delete_document` is idempotent; `merge_document` never creates.

use crate::db::DbError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// Raw document body: field name to JSON value.
pub type Document = Map<String, Value>;

/// Identifier of one document inside its collection.
pub type DocumentId = String;

pub type StoreResult<T> = Result<T, StoreError>;

const GENERATED_ID_LEN: usize = 20;

/// Errors raised by document store backends.
#[derive(Debug)]
pub enum StoreError {
    /// Transport or backend availability failure.
    Unavailable(String),
    /// Collection or document path violates segment rules.
    InvalidPath(String),
    /// Merge target does not exist.
    MissingDocument(String),
    Db(DbError),
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
            Self::InvalidPath(message) => write!(f, "invalid document path: {message}"),
            Self::MissingDocument(path) => write!(f, "document does not exist: {path}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid stored document body: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Unavailable(_) | Self::InvalidPath(_) | Self::MissingDocument(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Path of a collection, e.g. `Vendors` or `Vendors/{id}/Products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Creates a top-level collection path.
    pub fn root(collection: &str) -> StoreResult<Self> {
        validate_segment(collection, "collection")?;
        Ok(Self {
            segments: vec![collection.to_string()],
        })
    }

    /// Returns the sub-collection `child` owned by document `key` of this collection.
    pub fn child(&self, key: &str, child: &str) -> StoreResult<Self> {
        validate_segment(key, "document key")?;
        validate_segment(child, "collection")?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        segments.push(child.to_string());
        Ok(Self { segments })
    }

    /// Returns the path of document `key` inside this collection.
    pub fn doc(&self, key: &str) -> StoreResult<DocumentPath> {
        validate_segment(key, "document key")?;
        Ok(DocumentPath {
            collection: self.clone(),
            id: key.to_string(),
        })
    }

    /// Name of the last collection segment.
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    pub fn as_string(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Path of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: DocumentId,
}

impl DocumentPath {
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// One document as returned by a collection listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: DocumentId,
    pub data: Document,
}

/// Asynchronous document database contract.
///
/// Every call is one independent round trip: no transactions span calls and
/// no call is retried.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists every document of a collection in store order.
    async fn list_documents(&self, collection: &CollectionPath)
        -> StoreResult<Vec<DocumentSnapshot>>;

    /// Fetches one document body, `None` when it does not exist.
    async fn get_document(&self, path: &DocumentPath) -> StoreResult<Option<Document>>;

    /// Inserts a document under a store-assigned identifier.
    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> StoreResult<DocumentId>;

    /// Creates or fully replaces one document.
    async fn set_document(&self, path: &DocumentPath, data: Document) -> StoreResult<()>;

    /// Overwrites only the given fields of an existing document.
    ///
    /// Fails with `StoreError::MissingDocument` when the document is absent.
    async fn merge_document(&self, path: &DocumentPath, fields: Document) -> StoreResult<()>;

    /// Removes one document. Removing a missing document succeeds.
    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()>;
}

/// Generates a store-assigned document identifier.
///
/// Identifiers are alphanumeric, fixed-length and derived from a random v4 UUID.
pub fn generate_document_id() -> DocumentId {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(GENERATED_ID_LEN)
        .collect()
}

fn validate_segment(value: &str, label: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidPath(format!("{label} cannot be empty")));
    }
    if value.contains('/') {
        return Err(StoreError::InvalidPath(format!(
            "{label} `{value}` must not contain `/`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{generate_document_id, CollectionPath, StoreError};

    #[test]
    fn child_path_alternates_segments() {
        let products = CollectionPath::root("Vendors")
            .unwrap()
            .child("v1", "Products")
            .unwrap();
        assert_eq!(products.as_string(), "Vendors/v1/Products");
        assert_eq!(products.name(), "Products");

        let doc = products.doc("p1").unwrap();
        assert_eq!(doc.to_string(), "Vendors/v1/Products/p1");
        assert_eq!(doc.id(), "p1");
    }

    #[test]
    fn segments_reject_blank_and_slash() {
        assert!(matches!(
            CollectionPath::root("  "),
            Err(StoreError::InvalidPath(_))
        ));
        let vendors = CollectionPath::root("Vendors").unwrap();
        assert!(matches!(
            vendors.doc("a/b"),
            Err(StoreError::InvalidPath(message)) if message.contains("a/b")
        ));
        assert!(vendors.child("", "Products").is_err());
    }

    #[test]
    fn generated_ids_are_alphanumeric_and_unique() {
        let first = generate_document_id();
        let second = generate_document_id();
        assert_eq!(first.len(), 20);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
