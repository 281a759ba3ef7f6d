use std::sync::Arc;

use assert_matches::assert_matches;
use produce_inventory::{
    errors::ServiceError,
    models::{Category, Product, Unit},
    repositories::{CatalogStore, MemoryStore},
    services::catalog::{CatalogService, MoveDirection, NewProduct, ProductChanges},
};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn product(id: &str, order: i64) -> Product {
    Product::new(id, id.to_uppercase(), Category::Fruits, Unit::Piece, order, dec!(0.25))
}

fn service_with(products: Vec<Product>) -> (CatalogService, MemoryStore) {
    let store = MemoryStore::with_products(products);
    (CatalogService::new(Arc::new(store.clone()), None), store)
}

fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn empty_store_serves_default_catalog() {
    let service = CatalogService::new(Arc::new(MemoryStore::new()), None);
    let catalog = service.load_catalog().await.unwrap();
    assert_eq!(catalog.len(), 42);
    assert!(catalog.contains("aepfel"));
}

#[tokio::test]
async fn added_product_goes_last() {
    let (service, store) = service_with(vec![product("a", 1), product("b", 7)]);

    let added = service
        .add_product(NewProduct::new("Feldsalat", Category::Salads, Unit::Kg, dec!(0.3)))
        .await
        .unwrap();

    assert_eq!(added.id, "feldsalat");
    assert_eq!(added.order, 8);
    assert_eq!(added.kg_factor, Decimal::ONE);

    let stored = store.load_products().await.unwrap().unwrap();
    assert_eq!(ids(&stored), ["a", "b", "feldsalat"]);
}

#[tokio::test]
async fn first_product_gets_order_one() {
    let (service, _) = service_with(Vec::new());
    let added = service
        .add_product(NewProduct::new("Quitten", Category::Fruits, Unit::Piece, dec!(0.3)))
        .await
        .unwrap();
    assert_eq!(added.order, 1);
}

#[tokio::test]
async fn duplicate_id_is_a_conflict() {
    let (service, _) = service_with(vec![product("kiwi", 1)]);
    let result = service
        .add_product(NewProduct::new("Kiwi", Category::Fruits, Unit::Piece, dec!(0.1)))
        .await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));
}

#[rstest]
#[case(NewProduct::new("", Category::Fruits, Unit::Piece, dec!(0.1)))]
#[case(NewProduct::new("Mango", Category::Fruits, Unit::Piece, Decimal::ZERO))]
#[case(NewProduct::new("Mango", Category::Fruits, Unit::Bunch, dec!(-1)))]
#[tokio::test]
async fn invalid_products_are_rejected(#[case] draft: NewProduct) {
    let (service, store) = service_with(vec![product("a", 1)]);
    let result = service.add_product(draft).await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
    assert_eq!(store.load_products().await.unwrap().unwrap().len(), 1);
}

#[tokio::test]
async fn update_validates_and_pins_kg_factor() {
    let (service, _) = service_with(vec![product("a", 1)]);

    let updated = service
        .update_product(
            "a",
            ProductChanges {
                unit: Some(Unit::Kg),
                kg_factor: Some(dec!(0.5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.kg_factor, Decimal::ONE);

    let invalid = service
        .update_product(
            "a",
            ProductChanges {
                kg_factor: Some(dec!(0.5)),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(invalid, Err(ServiceError::ValidationError(_)));

    let missing = service.update_product("zz", ProductChanges::default()).await;
    assert_matches!(missing, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn remove_requires_existing_product() {
    let (service, _) = service_with(vec![product("a", 1), product("b", 2)]);
    service.remove_product("a").await.unwrap();
    assert_eq!(ids(service.load_catalog().await.unwrap().products()), ["b"]);
    assert_matches!(service.remove_product("a").await, Err(ServiceError::NotFound(_)));
}

#[rstest]
#[case("b", MoveDirection::Up, &["b", "a", "c"])]
#[case("b", MoveDirection::Down, &["a", "c", "b"])]
#[case("a", MoveDirection::Up, &["a", "b", "c"])]
#[case("c", MoveDirection::Down, &["a", "b", "c"])]
#[tokio::test]
async fn move_swaps_with_neighbour(
    #[case] id: &str,
    #[case] direction: MoveDirection,
    #[case] expected: &[&str],
) {
    let (service, _) = service_with(vec![product("a", 1), product("b", 2), product("c", 3)]);
    let catalog = service.move_product(id, direction).await.unwrap();
    assert_eq!(ids(catalog.products()), expected);

    let reloaded = service.load_catalog().await.unwrap();
    assert_eq!(ids(reloaded.products()), expected);
}

#[tokio::test]
async fn move_with_shared_order_keeps_ambiguity() {
    let (service, _) = service_with(vec![product("a", 1), product("b", 1), product("c", 2)]);
    let catalog = service.move_product("b", MoveDirection::Up).await.unwrap();
    assert_eq!(ids(catalog.products()), ["a", "b", "c"]);
}

#[tokio::test]
async fn moving_unknown_product_is_not_found() {
    let (service, _) = service_with(vec![product("a", 1)]);
    assert_matches!(
        service.move_product("x", MoveDirection::Down).await,
        Err(ServiceError::NotFound(_))
    );
}
