//! Repository layer over the document store.
//!
//! # Responsibility
//! - Provide typed, collection-addressed CRUD contracts.
//! - Translate store failures into semantic errors (`NotFound`,
//!   `StoreUnavailable`).
//!
//! # Invariants
//! - Single-record reads decode leniently; list reads decode strictly.
//! - Every mutation reports failure through its returned `Result`.

pub mod document_repo;
