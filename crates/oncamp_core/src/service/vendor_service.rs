//! Vendor and product use-case service.
//!
//! # Responsibility
//! - Expose marketplace operations bound to the configured collections.
//! - Delegate persistence to `DocumentRepository`.
//!
//! # Invariants
//! - Products are always addressed through their owning vendor.
//! - Blank vendor ids are rejected before any store round trip.

use crate::config::{CoreConfig, DEFAULT_PRODUCTS_COLLECTION, DEFAULT_VENDORS_COLLECTION};
use crate::model::product::Product;
use crate::model::stored::Stored;
use crate::model::vendor::Vendor;
use crate::repo::document_repo::{DocumentRepository, RepoError, RepoResult, UpsertOutcome};
use crate::store::DocumentStore;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Vendors grouped by their `category` field.
pub type VendorsByCategory = BTreeMap<String, Vec<Stored<Vendor>>>;

/// Use-case service for vendor profiles and their product catalogs.
pub struct VendorService<S: ?Sized = dyn DocumentStore> {
    vendors: DocumentRepository<Vendor, S>,
    products: DocumentRepository<Product, S>,
    vendors_collection: String,
    products_collection: String,
}

impl<S: DocumentStore + ?Sized> VendorService<S> {
    /// Creates a service over the default `Vendors`/`Products` collections.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_collections(store, DEFAULT_VENDORS_COLLECTION, DEFAULT_PRODUCTS_COLLECTION)
    }

    pub fn with_collections(
        store: Arc<S>,
        vendors_collection: impl Into<String>,
        products_collection: impl Into<String>,
    ) -> Self {
        Self {
            vendors: DocumentRepository::new(Arc::clone(&store)),
            products: DocumentRepository::new(store),
            vendors_collection: vendors_collection.into(),
            products_collection: products_collection.into(),
        }
    }

    /// Creates a service using the collection names of `config`.
    pub fn from_config(store: Arc<S>, config: &CoreConfig) -> Self {
        Self::with_collections(
            store,
            config.vendors_collection.as_str(),
            config.products_collection.as_str(),
        )
    }

    pub async fn fetch_vendor_ids(&self) -> RepoResult<Vec<String>> {
        self.vendors.list_keys(&self.vendors_collection).await
    }

    /// Fetches one vendor; missing fields fall back to defaults.
    pub async fn get_vendor(&self, vendor_id: &str) -> RepoResult<Stored<Vendor>> {
        self.vendors.get(&self.vendors_collection, vendor_id).await
    }

    /// Lists a vendor's complete products; incomplete documents are skipped.
    pub async fn fetch_all_products(&self, vendor_id: &str) -> RepoResult<Vec<Stored<Product>>> {
        self.products
            .list_children(
                &self.vendors_collection,
                vendor_id,
                &self.products_collection,
            )
            .await
    }

    pub async fn get_product(
        &self,
        vendor_id: &str,
        product_id: &str,
    ) -> RepoResult<Stored<Product>> {
        self.products
            .get_child(
                &self.vendors_collection,
                vendor_id,
                &self.products_collection,
                product_id,
            )
            .await
    }

    /// Adds a product and returns it with its new identifier.
    pub async fn add_product(
        &self,
        vendor_id: &str,
        product: Product,
    ) -> RepoResult<Stored<Product>> {
        let stored = self
            .products
            .create(
                &self.vendors_collection,
                vendor_id,
                &self.products_collection,
                product,
            )
            .await?;
        info!(
            "event=product_add module=service status=ok vendor_id={} product_id={}",
            vendor_id,
            stored.id()
        );
        Ok(stored)
    }

    pub async fn delete_product(&self, vendor_id: &str, product_id: &str) -> RepoResult<()> {
        self.products
            .delete(
                &self.vendors_collection,
                vendor_id,
                &self.products_collection,
                product_id,
            )
            .await?;
        info!(
            "event=product_delete module=service status=ok vendor_id={vendor_id} product_id={product_id}"
        );
        Ok(())
    }

    /// Creates or updates a vendor profile under `vendor_id`.
    ///
    /// The `featured` flag is never written; it stays under store control.
    pub async fn update_vendor_info(
        &self,
        vendor_id: &str,
        vendor: &Vendor,
    ) -> RepoResult<UpsertOutcome> {
        if vendor_id.trim().is_empty() {
            return Err(RepoError::InvalidKey("vendor id is missing".to_string()));
        }
        let outcome = self
            .vendors
            .upsert(&self.vendors_collection, vendor_id, vendor)
            .await?;
        info!(
            "event=vendor_upsert module=service status=ok vendor_id={vendor_id} outcome={outcome:?}"
        );
        Ok(outcome)
    }

    /// Loads every vendor and groups them by category.
    ///
    /// Each vendor costs one round trip. Vendors removed between the key
    /// listing and their fetch are skipped.
    pub async fn vendors_by_category(&self) -> RepoResult<VendorsByCategory> {
        let mut grouped = VendorsByCategory::new();
        for vendor in self.load_all_vendors().await? {
            grouped
                .entry(vendor.category.clone())
                .or_default()
                .push(vendor);
        }
        Ok(grouped)
    }

    pub async fn featured_vendors(&self) -> RepoResult<Vec<Stored<Vendor>>> {
        let vendors = self.load_all_vendors().await?;
        Ok(vendors.into_iter().filter(|vendor| vendor.featured).collect())
    }

    async fn load_all_vendors(&self) -> RepoResult<Vec<Stored<Vendor>>> {
        let ids = self.fetch_vendor_ids().await?;
        let mut vendors = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_vendor(&id).await {
                Ok(vendor) => vendors.push(vendor),
                Err(RepoError::NotFound { .. }) => {
                    warn!("event=vendor_load module=service status=skipped vendor_id={id}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(vendors)
    }
}
