//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist documents as JSON text rows keyed by `(collection_path, doc_id)`.
//! - List collections in insertion order (`seq`).
//!
//! # Invariants
//! - Replacing a document keeps its original insertion position.
//! - A merge reads and rewrites the body inside one transaction.

use super::{
    generate_document_id, CollectionPath, Document, DocumentId, DocumentPath, DocumentSnapshot,
    DocumentStore, StoreError, StoreResult,
};
use crate::db::{open_db, open_db_in_memory};
use async_trait::async_trait;
use log::error;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// `DocumentStore` over a migrated SQLite connection.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Opens (or creates) a document database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already went through `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<R>(&self, f: impl FnOnce(&mut Connection) -> StoreResult<R>) -> StoreResult<R> {
        let mut conn = self.conn.lock().map_err(|_| {
            error!("event=store_lock module=store status=error backend=sqlite");
            StoreError::Unavailable("sqlite connection lock poisoned".to_string())
        })?;
        f(&mut conn)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list_documents(
        &self,
        collection: &CollectionPath,
    ) -> StoreResult<Vec<DocumentSnapshot>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT doc_id, body
                 FROM documents
                 WHERE collection_path = ?1
                 ORDER BY seq ASC;",
            )?;
            let mut rows = stmt.query([collection.as_string()])?;
            let mut snapshots = Vec::new();
            while let Some(row) = rows.next()? {
                let body: String = row.get("body")?;
                snapshots.push(DocumentSnapshot {
                    id: row.get("doc_id")?,
                    data: parse_body(&body)?,
                });
            }
            Ok(snapshots)
        })
    }

    async fn get_document(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        self.with_conn(|conn| {
            let body = select_body(conn, path)?;
            body.as_deref().map(parse_body).transpose()
        })
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> StoreResult<DocumentId> {
        let body = serde_json::to_string(&data)?;
        self.with_conn(|conn| {
            let id = generate_document_id();
            conn.execute(
                "INSERT INTO documents (collection_path, doc_id, body)
                 VALUES (?1, ?2, ?3);",
                params![collection.as_string(), id, body],
            )?;
            Ok(id)
        })
    }

    async fn set_document(&self, path: &DocumentPath, data: Document) -> StoreResult<()> {
        let body = serde_json::to_string(&data)?;
        self.with_conn(|conn| {
            upsert_body(conn, path, &body)?;
            Ok(())
        })
    }

    async fn merge_document(&self, path: &DocumentPath, fields: Document) -> StoreResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut current = match select_body(&tx, path)? {
                Some(body) => parse_body(&body)?,
                None => return Err(StoreError::MissingDocument(path.to_string())),
            };
            current.extend(fields);
            upsert_body(&tx, path, &serde_json::to_string(&current)?)?;
            tx.commit()?;
            Ok(())
        })
    }

    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM documents WHERE collection_path = ?1 AND doc_id = ?2;",
                params![path.collection().as_string(), path.id()],
            )?;
            Ok(())
        })
    }
}

fn select_body(conn: &Connection, path: &DocumentPath) -> StoreResult<Option<String>> {
    let body = conn
        .query_row(
            "SELECT body FROM documents WHERE collection_path = ?1 AND doc_id = ?2;",
            params![path.collection().as_string(), path.id()],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(body)
}

fn upsert_body(conn: &Connection, path: &DocumentPath, body: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO documents (collection_path, doc_id, body)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (collection_path, doc_id) DO UPDATE SET
            body = excluded.body,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![path.collection().as_string(), path.id(), body],
    )?;
    Ok(())
}

fn parse_body(body: &str) -> StoreResult<Document> {
    Ok(serde_json::from_str(body)?)
}
