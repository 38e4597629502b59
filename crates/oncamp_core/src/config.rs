//! Core runtime configuration.
//!
//! # Responsibility
//! - Parse JSON configuration supplied by the host app or CLI.
//! - Build the configured document store backend.
//!
//! # Invariants
//! - Collection names are non-blank and never contain `/`.
//! - A SQLite backend always names a non-empty database path.

use crate::logging::default_log_level;
use crate::store::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore, StoreError};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_VENDORS_COLLECTION: &str = "Vendors";
pub const DEFAULT_PRODUCTS_COLLECTION: &str = "Products";

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
    Store(StoreError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
            Self::Store(err) => write!(f, "failed to open configured store: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Document store backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub store: StoreBackend,
    pub vendors_collection: String,
    pub products_collection: String,
    /// Falls back to `default_log_level()` when unset.
    pub log_level: Option<String>,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            vendors_collection: DEFAULT_VENDORS_COLLECTION.to_string(),
            products_collection: DEFAULT_PRODUCTS_COLLECTION.to_string(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document. Missing keys take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_collection(&self.vendors_collection, "vendors_collection")?;
        validate_collection(&self.products_collection, "products_collection")?;
        if let StoreBackend::Sqlite { path } = &self.store {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "sqlite store path cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Opens the configured backend.
    pub fn open_store(&self) -> Result<Arc<dyn DocumentStore>, ConfigError> {
        self.validate()?;
        match &self.store {
            StoreBackend::Memory => Ok(Arc::new(MemoryDocumentStore::new())),
            StoreBackend::Sqlite { path } => {
                let store = SqliteDocumentStore::open(path).map_err(ConfigError::Store)?;
                Ok(Arc::new(store))
            }
        }
    }
}

fn validate_collection(value: &str, label: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{label} cannot be empty")));
    }
    if value.contains('/') {
        return Err(ConfigError::Invalid(format!(
            "{label} `{value}` must not contain `/`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, StoreBackend};
    use std::path::PathBuf;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.vendors_collection, "Vendors");
        assert_eq!(config.products_collection, "Products");
    }

    #[test]
    fn parses_sqlite_backend() {
        let config =
            CoreConfig::from_json_str(r#"{"store": {"kind": "sqlite", "path": "/tmp/oncamp.db"}}"#)
                .unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Sqlite {
                path: PathBuf::from("/tmp/oncamp.db")
            }
        );
    }

    #[test]
    fn rejects_slash_in_collection_name() {
        let err = CoreConfig::from_json_str(r#"{"vendors_collection": "a/b"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("a/b")));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = CoreConfig::from_json_str(r#"{"collection": "Vendors"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn explicit_log_level_wins_over_default() {
        let config = CoreConfig::from_json_str(r#"{"log_level": "warn"}"#).unwrap();
        assert_eq!(config.effective_log_level(), "warn");
    }
}
