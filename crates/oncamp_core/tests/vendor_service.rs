use oncamp_core::{
    CollectionPath, CoreConfig, DocumentStore, MemoryDocumentStore, Product, RepoError,
    UpsertOutcome, Vendor, VendorService,
};
use serde_json::json;
use std::sync::Arc;

fn vendor(name: &str, category: &str) -> Vendor {
    Vendor {
        description: format!("{name} description"),
        schools: vec!["MIT".to_string()],
        header_image: format!("https://img/{name}.png"),
        rating: 4.0,
        ..Vendor::new(name, category)
    }
}

fn bagel() -> Product {
    Product {
        name: "Bagel".to_string(),
        category: "Food".to_string(),
        description: "Everything bagel".to_string(),
        image: "https://img/bagel.png".to_string(),
        price: 3,
    }
}

#[tokio::test]
async fn product_lifecycle_through_service() {
    let service = VendorService::new(Arc::new(MemoryDocumentStore::new()));
    service
        .update_vendor_info("v1", &vendor("Deli", "Food"))
        .await
        .unwrap();

    let added = service.add_product("v1", bagel()).await.unwrap();
    let products = service.fetch_all_products("v1").await.unwrap();
    assert_eq!(products, vec![added.clone()]);
    assert_eq!(
        service.get_product("v1", added.id()).await.unwrap().record(),
        &bagel()
    );

    service.delete_product("v1", added.id()).await.unwrap();
    assert!(service.fetch_all_products("v1").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_vendor_info_reports_created_then_updated() {
    let service = VendorService::new(Arc::new(MemoryDocumentStore::new()));

    let first = service
        .update_vendor_info("v1", &vendor("Deli", "Food"))
        .await
        .unwrap();
    let second = service
        .update_vendor_info("v1", &vendor("Deli 2", "Food"))
        .await
        .unwrap();

    assert_eq!(first, UpsertOutcome::Created);
    assert_eq!(second, UpsertOutcome::Updated);
    assert_eq!(service.get_vendor("v1").await.unwrap().name, "Deli 2");
}

#[tokio::test]
async fn update_vendor_info_rejects_missing_id() {
    let service = VendorService::new(Arc::new(MemoryDocumentStore::new()));

    let err = service
        .update_vendor_info("  ", &vendor("Deli", "Food"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidKey(message) if message.contains("vendor id")));
    assert!(service.fetch_vendor_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_vendor_info_rejects_non_finite_rating() {
    let service = VendorService::new(Arc::new(MemoryDocumentStore::new()));
    service
        .update_vendor_info("v1", &vendor("Deli", "Food"))
        .await
        .unwrap();

    let mut broken = vendor("Deli", "Food");
    broken.rating = f64::INFINITY;
    let err = service.update_vendor_info("v2", &broken).await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidRecord(ref message) if message.contains("rating")));

    broken.rating = f64::NAN;
    let err = service.update_vendor_info("v1", &broken).await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidRecord(_)));

    assert_eq!(service.fetch_vendor_ids().await.unwrap(), vec!["v1"]);
    assert_eq!(service.get_vendor("v1").await.unwrap().rating, 4.0);
}

#[tokio::test]
async fn update_vendor_info_propagates_store_failure() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = VendorService::new(Arc::clone(&store));
    store.set_offline(true);

    let err = service
        .update_vendor_info("v1", &vendor("Deli", "Food"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::StoreUnavailable(_)));
}

#[tokio::test]
async fn vendors_are_grouped_by_category() {
    let service = VendorService::new(Arc::new(MemoryDocumentStore::new()));
    service
        .update_vendor_info("deli", &vendor("Deli", "Food"))
        .await
        .unwrap();
    service
        .update_vendor_info("tutor", &vendor("Tutor", "Services"))
        .await
        .unwrap();
    service
        .update_vendor_info("pizza", &vendor("Pizza", "Food"))
        .await
        .unwrap();

    let grouped = service.vendors_by_category().await.unwrap();
    let food = grouped["Food"]
        .iter()
        .map(|vendor| vendor.id())
        .collect::<Vec<_>>();
    assert_eq!(food, vec!["deli", "pizza"]);
    assert_eq!(grouped["Services"].len(), 1);
    assert_eq!(grouped.len(), 2);
}

#[tokio::test]
async fn featured_vendors_follow_store_managed_flag() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = VendorService::new(Arc::clone(&store));
    service
        .update_vendor_info("deli", &vendor("Deli", "Food"))
        .await
        .unwrap();
    store
        .set_document(
            &CollectionPath::root("Vendors").unwrap().doc("star").unwrap(),
            json!({"name": "Star", "featured": true})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .await
        .unwrap();

    let featured = service.featured_vendors().await.unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].id(), "star");

    let mut starred = vendor("Star", "Food");
    starred.featured = false;
    service.update_vendor_info("star", &starred).await.unwrap();
    assert_eq!(service.featured_vendors().await.unwrap().len(), 1);
}

#[tokio::test]
async fn configured_collection_names_are_used() {
    let config = CoreConfig::from_json_str(
        r#"{"vendors_collection": "Shops", "products_collection": "Items"}"#,
    )
    .unwrap();
    let store = config.open_store().unwrap();
    let service = VendorService::from_config(Arc::clone(&store), &config);

    service
        .update_vendor_info("s1", &vendor("Shop", "Retail"))
        .await
        .unwrap();
    service.add_product("s1", bagel()).await.unwrap();

    let shops = CollectionPath::root("Shops").unwrap();
    assert_eq!(store.list_documents(&shops).await.unwrap().len(), 1);
    assert_eq!(
        store
            .list_documents(&shops.child("s1", "Items").unwrap())
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(store
        .list_documents(&CollectionPath::root("Vendors").unwrap())
        .await
        .unwrap()
        .is_empty());
}
