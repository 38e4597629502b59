//! Data and navigation core for the OnCamp marketplace app.
//!
//! Typed vendor/product access over a document store, plus the main tab-bar
//! selection state. UI rendering and the remote database live outside.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod repo;
pub mod service;
pub mod store;

pub use codec::{DocumentCodec, FieldReader};
pub use config::{ConfigError, CoreConfig, StoreBackend};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::product::Product;
pub use model::stored::Stored;
pub use model::vendor::Vendor;
pub use navigation::{NavigationError, NavigationEvent, Tab, TabController};
pub use repo::document_repo::{DocumentRepository, RepoError, RepoResult, UpsertOutcome};
pub use service::vendor_service::{VendorService, VendorsByCategory};
pub use store::{
    CollectionPath, Document, DocumentId, DocumentPath, DocumentSnapshot, DocumentStore,
    MemoryDocumentStore, SqliteDocumentStore, StoreError, StoreResult,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
