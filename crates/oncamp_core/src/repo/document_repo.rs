//! Generic typed document repository.
//!
//! # Responsibility
//! - Read, list, create, upsert and delete records of one type `T`.
//! - Apply the decode policy matching the read shape.
//!
//! # Invariants
//! - `get`/`get_child` never fail on partial documents; missing fields get
//!   type defaults.
//! - `list_children` drops documents missing a required field.
//! - `create` returns the store-assigned identifier.
//! - `delete`/`remove` are idempotent.
//! - `upsert` merges enumerated fields into an existing document and leaves
//!   every other stored field untouched.

use crate::codec::{DocumentCodec, FieldReader};
use crate::model::stored::Stored;
use crate::store::{CollectionPath, DocumentPath, DocumentStore, StoreError};
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error surfaced to service and UI callers.
#[derive(Debug)]
pub enum RepoError {
    /// Transport failure reaching the document store.
    StoreUnavailable(String),
    /// Single-document fetch found nothing under `key`.
    NotFound { collection: String, key: String },
    /// Blank or malformed collection name or key.
    InvalidKey(String),
    /// Record rejected by its codec before any write.
    InvalidRecord(String),
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable(message) => write!(f, "document store unavailable: {message}"),
            Self::NotFound { collection, key } => {
                write!(f, "document does not exist: {collection}/{key}")
            }
            Self::InvalidKey(message) => write!(f, "invalid key: {message}"),
            Self::InvalidRecord(message) => write!(f, "invalid record: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::StoreUnavailable(_)
            | Self::NotFound { .. }
            | Self::InvalidKey(_)
            | Self::InvalidRecord(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(message) => Self::StoreUnavailable(message),
            StoreError::InvalidPath(message) => Self::InvalidKey(message),
            other => Self::Store(other),
        }
    }
}

/// Result of an upsert call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The key was absent and a new document was written.
    Created,
    /// The key existed and the enumerated fields were merged in.
    Updated,
}

/// Typed repository for records of type `T` over a shared document store.
///
/// Collections are passed per call, so one repository serves every
/// collection holding `T` documents.
pub struct DocumentRepository<T, S: ?Sized = dyn DocumentStore> {
    store: Arc<S>,
    _record: PhantomData<fn() -> T>,
}

impl<T, S: ?Sized> Clone for DocumentRepository<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T, S> DocumentRepository<T, S>
where
    T: DocumentCodec,
    S: DocumentStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Lists every document identifier of a top-level collection in store order.
    pub async fn list_keys(&self, collection: &str) -> RepoResult<Vec<String>> {
        let started_at = Instant::now();
        let result = self.list_keys_inner(collection).await;
        finish("repo_list_keys", collection, started_at, result)
    }

    /// Fetches one top-level record with lenient decoding.
    pub async fn get(&self, collection: &str, key: &str) -> RepoResult<Stored<T>> {
        let started_at = Instant::now();
        let result: RepoResult<Stored<T>> =
            match CollectionPath::root(collection).and_then(|path| path.doc(key)) {
                Ok(path) => self.get_at(&path).await,
                Err(err) => Err(err.into()),
            };
        finish("repo_get", collection, started_at, result)
    }

    /// Fetches one sub-collection record with lenient decoding.
    pub async fn get_child(
        &self,
        parent_collection: &str,
        parent_key: &str,
        child_collection: &str,
        id: &str,
    ) -> RepoResult<Stored<T>> {
        let started_at = Instant::now();
        let result: RepoResult<Stored<T>> = match child_path(
            parent_collection,
            parent_key,
            child_collection,
        )
        .and_then(|path| path.doc(id))
        {
            Ok(path) => self.get_at(&path).await,
            Err(err) => Err(err.into()),
        };
        finish("repo_get_child", child_collection, started_at, result)
    }

    /// Lists every sub-collection record under one parent with strict decoding.
    pub async fn list_children(
        &self,
        parent_collection: &str,
        parent_key: &str,
        child_collection: &str,
    ) -> RepoResult<Vec<Stored<T>>> {
        let started_at = Instant::now();
        let result = self
            .list_children_inner(parent_collection, parent_key, child_collection)
            .await;
        finish("repo_list_children", child_collection, started_at, result)
    }

    /// Inserts a sub-collection record under a store-assigned identifier.
    pub async fn create(
        &self,
        parent_collection: &str,
        parent_key: &str,
        child_collection: &str,
        record: T,
    ) -> RepoResult<Stored<T>> {
        let started_at = Instant::now();
        let result = self
            .create_inner(parent_collection, parent_key, child_collection, record)
            .await;
        finish("repo_create", child_collection, started_at, result)
    }

    /// Removes one sub-collection record. Missing ids succeed.
    pub async fn delete(
        &self,
        parent_collection: &str,
        parent_key: &str,
        child_collection: &str,
        id: &str,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let result: RepoResult<()> = match child_path(
            parent_collection,
            parent_key,
            child_collection,
        )
        .and_then(|path| path.doc(id))
        {
            Ok(path) => self.store.delete_document(&path).await.map_err(Into::into),
            Err(err) => Err(err.into()),
        };
        finish("repo_delete", child_collection, started_at, result)
    }

    /// Removes one top-level record. Missing keys succeed.
    pub async fn remove(&self, collection: &str, key: &str) -> RepoResult<()> {
        let started_at = Instant::now();
        let result: RepoResult<()> =
            match CollectionPath::root(collection).and_then(|path| path.doc(key)) {
                Ok(path) => self.store.delete_document(&path).await.map_err(Into::into),
                Err(err) => Err(err.into()),
            };
        finish("repo_remove", collection, started_at, result)
    }

    /// Creates the record under `key` or merges its enumerated fields into
    /// the existing document.
    ///
    /// No version check: concurrent upserts on one key are last-write-wins.
    pub async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: &T,
    ) -> RepoResult<UpsertOutcome> {
        let started_at = Instant::now();
        let result = self.upsert_inner(collection, key, record).await;
        finish("repo_upsert", collection, started_at, result)
    }

    async fn list_keys_inner(&self, collection: &str) -> RepoResult<Vec<String>> {
        let path = CollectionPath::root(collection)?;
        let snapshots = self.store.list_documents(&path).await?;
        Ok(snapshots.into_iter().map(|snapshot| snapshot.id).collect())
    }

    async fn get_at(&self, path: &DocumentPath) -> RepoResult<Stored<T>> {
        let data = self
            .store
            .get_document(path)
            .await?
            .ok_or_else(|| RepoError::NotFound {
                collection: path.collection().to_string(),
                key: path.id().to_string(),
            })?;
        Ok(Stored::new(
            path.id().to_string(),
            T::decode_lenient(&FieldReader::new(&data)),
        ))
    }

    async fn list_children_inner(
        &self,
        parent_collection: &str,
        parent_key: &str,
        child_collection: &str,
    ) -> RepoResult<Vec<Stored<T>>> {
        let path = child_path(parent_collection, parent_key, child_collection)?;
        let snapshots = self.store.list_documents(&path).await?;
        let total = snapshots.len();

        let records = snapshots
            .into_iter()
            .filter_map(|snapshot| {
                T::decode_strict(&FieldReader::new(&snapshot.data))
                    .map(|record| Stored::new(snapshot.id, record))
            })
            .collect::<Vec<_>>();

        if records.len() < total {
            debug!(
                "event=decode_skip module=repo collection={} total={} dropped={}",
                path.name(),
                total,
                total - records.len()
            );
        }
        Ok(records)
    }

    async fn create_inner(
        &self,
        parent_collection: &str,
        parent_key: &str,
        child_collection: &str,
        record: T,
    ) -> RepoResult<Stored<T>> {
        record.validate().map_err(RepoError::InvalidRecord)?;
        let path = child_path(parent_collection, parent_key, child_collection)?;
        let id = self.store.add_document(&path, record.encode()).await?;
        Ok(Stored::new(id, record))
    }

    async fn upsert_inner(
        &self,
        collection: &str,
        key: &str,
        record: &T,
    ) -> RepoResult<UpsertOutcome> {
        record.validate().map_err(RepoError::InvalidRecord)?;
        let path = CollectionPath::root(collection)?.doc(key)?;
        let fields = record.encode();
        if self.store.get_document(&path).await?.is_some() {
            self.store.merge_document(&path, fields).await?;
            Ok(UpsertOutcome::Updated)
        } else {
            self.store.set_document(&path, fields).await?;
            Ok(UpsertOutcome::Created)
        }
    }
}

fn child_path(
    parent_collection: &str,
    parent_key: &str,
    child_collection: &str,
) -> Result<CollectionPath, StoreError> {
    CollectionPath::root(parent_collection)?.child(parent_key, child_collection)
}

fn finish<R>(
    event: &str,
    collection: &str,
    started_at: Instant,
    result: RepoResult<R>,
) -> RepoResult<R> {
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => debug!(
            "event={event} module=repo status=ok collection={collection} duration_ms={duration_ms}"
        ),
        Err(RepoError::NotFound { .. }) => warn!(
            "event={event} module=repo status=not_found collection={collection} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event={event} module=repo status=error collection={collection} duration_ms={duration_ms} error={err}"
        ),
    }
    result
}
