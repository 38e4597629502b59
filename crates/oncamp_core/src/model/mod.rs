//! Marketplace domain records.
//!
//! # Responsibility
//! - Define vendor and product records and their document field mapping.
//! - Separate unsaved records (`T`) from persisted ones (`Stored<T>`).
//!
//! # Invariants
//! - A record identifier exists only on `Stored<T>` and never changes.
//! - Products live only inside their vendor's `Products` sub-collection.

pub mod product;
pub mod stored;
pub mod vendor;
