//! Persisted record wrapper.

use crate::store::DocumentId;
use serde::Serialize;
use std::ops::Deref;

/// A record together with the identifier the store assigned to it.
///
/// Only the repository layer constructs values of this type, so holding a
/// `Stored<T>` proves the record was read from or written to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored<T> {
    id: DocumentId,
    #[serde(flatten)]
    record: T,
}

impl<T> Stored<T> {
    pub(crate) fn new(id: DocumentId, record: T) -> Self {
        Self { id, record }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> &T {
        &self.record
    }

    pub fn into_record(self) -> T {
        self.record
    }

    pub fn into_parts(self) -> (DocumentId, T) {
        (self.id, self.record)
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}
