//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose vendor/product use cases and tab navigation to Dart via FRB.
//! - Flatten core results into plain envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported through `ok=false` plus a message, never thrown.
//! - Every store-backed call logs one `event=ffi_call module=ffi` line.

use log::{error, info};
use oncamp_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    NavigationEvent, Product, RepoResult, SqliteDocumentStore, Stored, Tab, TabController,
    Vendor, VendorService,
};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

const STORE_FILE_NAME: &str = "oncamp_store.sqlite3";
static STORE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Vendor profile as shown by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub schools: Vec<String>,
    pub header_image: String,
    pub category: String,
    pub rating: f64,
    pub featured: bool,
    pub pfp_url: String,
}

/// Editable vendor fields. `featured` is not editable from the app.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorInput {
    pub name: String,
    pub description: String,
    pub schools: Vec<String>,
    pub header_image: String,
    pub category: String,
    pub rating: f64,
    pub pfp_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub price: i64,
}

/// Generic mutation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Affected document id, when the operation produced one.
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorIdsResponse {
    pub ok: bool,
    pub ids: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorResponse {
    pub ok: bool,
    pub vendor: Option<VendorItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductsResponse {
    pub ok: bool,
    pub items: Vec<ProductItem>,
    pub message: String,
}

/// Tab bar state after applying one selection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSelection {
    pub selected_index: u32,
    pub changed: bool,
    /// One icon name per tab, in display order, filled for the selected one.
    pub icons: Vec<String>,
    /// Set when the request was rejected; selection is then unchanged.
    pub error: Option<String>,
}

/// Lists every vendor id.
pub async fn vendor_ids() -> VendorIdsResponse {
    match with_vendor_service("vendor_ids", |service| async move {
        service.fetch_vendor_ids().await
    })
    .await
    {
        Ok(ids) => VendorIdsResponse {
            message: format!("Found {} vendor(s).", ids.len()),
            ok: true,
            ids,
        },
        Err(err) => VendorIdsResponse {
            ok: false,
            ids: Vec::new(),
            message: format!("vendor_ids failed: {err}"),
        },
    }
}

/// Fetches one vendor; missing profile fields come back as defaults.
pub async fn vendor_get(vendor_id: String) -> VendorResponse {
    let vendor_id = vendor_id.trim().to_string();
    match with_vendor_service("vendor_get", |service| async move {
        service.get_vendor(&vendor_id).await
    })
    .await
    {
        Ok(vendor) => VendorResponse {
            ok: true,
            vendor: Some(to_vendor_item(vendor)),
            message: "Vendor loaded.".to_string(),
        },
        Err(err) => VendorResponse {
            ok: false,
            vendor: None,
            message: format!("vendor_get failed: {err}"),
        },
    }
}

/// Creates or updates the vendor profile under `vendor_id`.
pub async fn vendor_upsert(vendor_id: String, input: VendorInput) -> ActionResponse {
    let vendor_id = vendor_id.trim().to_string();
    let vendor = from_vendor_input(input);
    let key = vendor_id.clone();
    match with_vendor_service("vendor_upsert", |service| async move {
        service.update_vendor_info(&key, &vendor).await
    })
    .await
    {
        Ok(outcome) => ActionResponse::success(format!("Vendor {outcome:?}."), Some(vendor_id)),
        Err(err) => ActionResponse::failure(format!("vendor_upsert failed: {err}")),
    }
}

/// Lists a vendor's complete products.
pub async fn vendor_products(vendor_id: String) -> ProductsResponse {
    let vendor_id = vendor_id.trim().to_string();
    match with_vendor_service("vendor_products", |service| async move {
        service.fetch_all_products(&vendor_id).await
    })
    .await
    {
        Ok(products) => {
            let items = products.into_iter().map(to_product_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No products.".to_string()
            } else {
                format!("Found {} product(s).", items.len())
            };
            ProductsResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => ProductsResponse {
            ok: false,
            items: Vec::new(),
            message: format!("vendor_products failed: {err}"),
        },
    }
}

/// Adds a product and returns its new id.
pub async fn product_add(vendor_id: String, input: ProductInput) -> ActionResponse {
    let vendor_id = vendor_id.trim().to_string();
    let product = from_product_input(input);
    match with_vendor_service("product_add", |service| async move {
        service.add_product(&vendor_id, product).await
    })
    .await
    {
        Ok(stored) => ActionResponse::success("Product added.", Some(stored.id().to_string())),
        Err(err) => ActionResponse::failure(format!("product_add failed: {err}")),
    }
}

/// Deletes one product. Deleting an unknown id succeeds.
pub async fn product_delete(vendor_id: String, product_id: String) -> ActionResponse {
    let vendor_id = vendor_id.trim().to_string();
    let product_id = product_id.trim().to_string();
    let deleted_id = product_id.clone();
    match with_vendor_service("product_delete", |service| async move {
        service.delete_product(&vendor_id, &product_id).await
    })
    .await
    {
        Ok(()) => ActionResponse::success("Product deleted.", Some(deleted_id)),
        Err(err) => ActionResponse::failure(format!("product_delete failed: {err}")),
    }
}

/// Applies one tab selection request on top of `current_index`.
///
/// An invalid `current_index` falls back to the initial tab. Requests made
/// while `user_loaded` is false are rejected and keep the current tab.
#[flutter_rust_bridge::frb(sync)]
pub fn tab_select(current_index: u32, requested_index: u32, user_loaded: bool) -> TabSelection {
    let mut controller = Tab::from_index(current_index as usize)
        .map(TabController::with_selected)
        .unwrap_or_default();
    let select = NavigationEvent::SelectIndex(requested_index as usize);
    let result = if user_loaded {
        controller
            .handle(NavigationEvent::UserLoaded)
            .and_then(|_| controller.handle(select))
    } else {
        controller.handle(select)
    };
    let (changed, error) = match result {
        Ok(changed) => (changed, None),
        Err(err) => (false, Some(err.to_string())),
    };
    TabSelection {
        selected_index: controller.selected().index() as u32,
        changed,
        icons: Tab::ALL
            .iter()
            .map(|tab| controller.icon_for(*tab).to_string())
            .collect(),
        error,
    }
}

fn resolve_store_path() -> PathBuf {
    STORE_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("ONCAMP_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_FILE_NAME)
        })
        .clone()
}

async fn with_vendor_service<R, F, Fut>(op: &str, f: F) -> Result<R, String>
where
    F: FnOnce(VendorService<SqliteDocumentStore>) -> Fut,
    Fut: std::future::Future<Output = RepoResult<R>>,
{
    let started_at = Instant::now();
    let result = match SqliteDocumentStore::open(resolve_store_path()) {
        Ok(store) => f(VendorService::new(Arc::new(store)))
            .await
            .map_err(|err| err.to_string()),
        Err(err) => Err(format!("store open failed: {err}")),
    };

    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=ffi_call module=ffi op={op} status=ok duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=ffi_call module=ffi op={op} status=error duration_ms={duration_ms} error={err}"
        ),
    }
    result
}

fn to_vendor_item(stored: Stored<Vendor>) -> VendorItem {
    let (id, vendor) = stored.into_parts();
    VendorItem {
        id,
        name: vendor.name,
        description: vendor.description,
        schools: vendor.schools,
        header_image: vendor.header_image,
        category: vendor.category,
        rating: vendor.rating,
        featured: vendor.featured,
        pfp_url: vendor.pfp_url,
    }
}

fn from_vendor_input(input: VendorInput) -> Vendor {
    Vendor {
        description: input.description,
        schools: input.schools,
        name: input.name,
        header_image: input.header_image,
        category: input.category,
        rating: input.rating,
        featured: false,
        pfp_url: input.pfp_url,
    }
}

fn to_product_item(stored: Stored<Product>) -> ProductItem {
    let (id, product) = stored.into_parts();
    ProductItem {
        id,
        name: product.name,
        category: product.category,
        description: product.description,
        image: product.image,
        price: product.price,
    }
}

fn from_product_input(input: ProductInput) -> Product {
    Product {
        name: input.name,
        category: input.category,
        description: input.description,
        image: input.image,
        price: input.price,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, product_add, product_delete, tab_select, vendor_get,
        vendor_ids, vendor_products, vendor_upsert, ProductInput, VendorInput,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn tab_select_moves_selection_and_fills_icon() {
        let selection = tab_select(4, 2, true);
        assert!(selection.changed);
        assert_eq!(selection.selected_index, 2);
        assert_eq!(selection.icons[2], "bag.fill");
        assert_eq!(selection.icons[4], "person.circle");
        assert_eq!(selection.error, None);
    }

    #[test]
    fn tab_select_rejects_out_of_range_request() {
        let selection = tab_select(1, 9, true);
        assert!(!selection.changed);
        assert_eq!(selection.selected_index, 1);
        assert!(selection.error.is_some());
    }

    #[test]
    fn tab_select_is_rejected_before_user_loads() {
        let selection = tab_select(4, 0, false);
        assert!(!selection.changed);
        assert_eq!(selection.selected_index, 4);
        assert_eq!(selection.icons[4], "person.circle.fill");
        assert!(selection.error.unwrap().contains("user is loaded"));
    }

    #[tokio::test]
    async fn vendor_upsert_then_get_round_trips_profile() {
        let vendor_id = unique_token("vendor");
        let response = vendor_upsert(vendor_id.clone(), sample_vendor_input()).await;
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.id.as_deref(), Some(vendor_id.as_str()));

        let loaded = vendor_get(vendor_id.clone()).await;
        assert!(loaded.ok, "{}", loaded.message);
        let vendor = loaded.vendor.expect("vendor should be returned");
        assert_eq!(vendor.id, vendor_id);
        assert_eq!(vendor.name, "Cafe");
        assert_eq!(vendor.schools, vec!["MIT".to_string()]);
        assert!(!vendor.featured);

        let ids = vendor_ids().await;
        assert!(ids.ok, "{}", ids.message);
        assert!(ids.ids.contains(&vendor_id));
    }

    #[tokio::test]
    async fn vendor_get_reports_missing_vendor() {
        let response = vendor_get(unique_token("missing")).await;
        assert!(!response.ok);
        assert!(response.vendor.is_none());
        assert!(response.message.contains("does not exist"));
    }

    #[tokio::test]
    async fn product_add_list_and_delete() {
        let vendor_id = unique_token("products");
        let added = product_add(
            vendor_id.clone(),
            ProductInput {
                name: "Latte".to_string(),
                category: "Drinks".to_string(),
                description: "Hot".to_string(),
                image: "latte.png".to_string(),
                price: 5,
            },
        )
        .await;
        assert!(added.ok, "{}", added.message);
        let product_id = added.id.expect("add should return product id");

        let listed = vendor_products(vendor_id.clone()).await;
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].id, product_id);

        let deleted = product_delete(vendor_id.clone(), product_id).await;
        assert!(deleted.ok, "{}", deleted.message);
        assert!(vendor_products(vendor_id).await.items.is_empty());
    }

    #[tokio::test]
    async fn vendor_upsert_rejects_non_finite_rating() {
        let vendor_id = unique_token("nan");
        let mut input = sample_vendor_input();
        input.rating = f64::NAN;

        let response = vendor_upsert(vendor_id.clone(), input).await;
        assert!(!response.ok);
        assert!(response.message.contains("rating"));
        assert!(!vendor_get(vendor_id).await.ok);
    }

    #[tokio::test]
    async fn vendor_upsert_rejects_blank_id() {
        let response = vendor_upsert("   ".to_string(), sample_vendor_input()).await;
        assert!(!response.ok);
        assert!(response.message.contains("vendor id"));
    }

    fn sample_vendor_input() -> VendorInput {
        VendorInput {
            name: "Cafe".to_string(),
            description: "Coffee".to_string(),
            schools: vec!["MIT".to_string()],
            header_image: "header.png".to_string(),
            category: "Food".to_string(),
            rating: 4.5,
            pfp_url: "pfp.png".to_string(),
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
