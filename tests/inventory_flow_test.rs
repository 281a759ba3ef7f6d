use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use produce_inventory::{
    config::AppConfig,
    errors::ServiceError,
    events::{EventSender, InventoryEvent},
    models::{Catalog, Category, DailyInventory, InventoryEntry, Product, Unit},
    repositories::{CatalogStore, InventoryStore, MemoryStore},
    services::catalog::{NewProduct, ProductChanges},
    AppState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn baseline() -> Vec<Product> {
    vec![
        Product::new("apple", "Äpfel", Category::Fruits, Unit::Piece, 1, dec!(0.2)),
        Product::new("carrot", "Karotten", Category::Vegetables, Unit::Kg, 2, Decimal::ONE),
        Product::new("parsley", "Petersilie", Category::Vegetables, Unit::Bunch, 3, dec!(0.05)),
    ]
}

fn app(store: &MemoryStore) -> AppState {
    AppState::new(
        AppConfig::default(),
        Arc::new(store.clone()),
        Catalog::new(baseline()),
        None,
    )
}

#[tokio::test]
async fn catalog_unit_change_converts_history() {
    let store = MemoryStore::with_products(baseline());
    let app = app(&store);
    let inventory = &app.inventory_service;

    inventory.update_quantity(day(3), "apple", dec!(10)).await.unwrap();
    inventory.update_demand(day(3), "apple", dec!(15)).await.unwrap();
    inventory.update_quantity(day(3), "carrot", dec!(5)).await.unwrap();

    app.catalog_service
        .update_product(
            "apple",
            ProductChanges {
                unit: Some(Unit::Kg),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let record = inventory.load_inventory(day(3)).await.unwrap();
    assert_eq!(record.quantity_of("apple"), dec!(2));
    assert_eq!(record.demand_of("apple"), dec!(3));
    assert_eq!(record.quantity_of("carrot"), dec!(5));

    // Loading again after a save must not convert a second time.
    inventory.save_inventory(record).await.unwrap();
    let reloaded = inventory.load_inventory(day(3)).await.unwrap();
    assert_eq!(reloaded.quantity_of("apple"), dec!(2));
    assert_eq!(reloaded.demand_of("apple"), dec!(3));
}

#[tokio::test]
async fn legacy_records_use_baseline() {
    let store = MemoryStore::new();
    let legacy = DailyInventory::new(
        day(1),
        vec![
            InventoryEntry::new("parsley", dec!(4), dec!(0), day(1)),
            InventoryEntry::new("unknown-product", dec!(7), dec!(1), day(1)),
        ],
    );
    store.save_inventory(legacy).await.unwrap();

    let mut products = baseline();
    products[2].set_unit(Unit::Kg);
    store.save_products(&products).await.unwrap();

    let app = app(&store);
    let record = app.inventory_service.load_inventory(day(1)).await.unwrap();
    assert_eq!(record.quantity_of("parsley"), dec!(0.2));
    assert_eq!(
        record.entry("unknown-product"),
        Some(&InventoryEntry::new("unknown-product", dec!(7), dec!(1), day(1)))
    );
}

#[tokio::test]
async fn open_workday_follows_catalog_membership() {
    let store = MemoryStore::with_products(baseline());
    let app = app(&store);
    app.inventory_service
        .update_quantity(day(5), "carrot", dec!(9))
        .await
        .unwrap();

    app.catalog_service.remove_product("apple").await.unwrap();
    app.catalog_service
        .add_product(NewProduct::new("Rucola", Category::Salads, Unit::Bunch, dec!(0.1)))
        .await
        .unwrap();

    let record = app.inventory_service.open_workday(day(5)).await.unwrap();
    let ids: Vec<_> = record.entries.iter().map(|e| e.product_id.as_str()).collect();
    assert_eq!(ids, ["carrot", "parsley", "rucola"]);
    assert_eq!(record.quantity_of("carrot"), dec!(9));

    let stored = store.get_inventory(day(5)).await.unwrap().unwrap();
    assert_eq!(stored.entries.len(), 3);
}

#[tokio::test]
async fn history_keeps_stale_products_visible() {
    let store = MemoryStore::with_products(baseline());
    let app = app(&store);
    app.inventory_service
        .update_quantity(day(2), "apple", dec!(3))
        .await
        .unwrap();
    app.catalog_service.remove_product("apple").await.unwrap();

    let history = app.inventory_service.history(day(1), day(4), false).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].quantity_of("apple"), dec!(3));
}

#[tokio::test]
async fn trash_lifecycle() {
    let store = MemoryStore::with_products(baseline());
    let app = app(&store);
    let inventory = &app.inventory_service;
    for d in [1, 2, 3] {
        inventory.update_quantity(day(d), "carrot", dec!(1)).await.unwrap();
    }

    let deleted_at = inventory.move_to_trash(day(2)).await.unwrap();
    let visible = inventory.history(day(1), day(3), false).await.unwrap();
    let dates: Vec<_> = visible.iter().map(|r| r.date).collect();
    assert_eq!(dates, [day(3), day(1)]);

    let trash = inventory.trash(day(10)).await.unwrap();
    assert_eq!(trash.len(), 1);
    assert_eq!(trash[0].deleted_at, Some(deleted_at));

    inventory.restore(day(2)).await.unwrap();
    assert!(inventory.trash(day(10)).await.unwrap().is_empty());
    assert_eq!(inventory.history(day(1), day(3), false).await.unwrap().len(), 3);

    inventory.purge(day(2)).await.unwrap();
    assert_matches!(inventory.purge(day(2)).await, Err(ServiceError::NotFound(_)));
    assert_matches!(inventory.restore(day(2)).await, Err(ServiceError::NotFound(_)));
    assert_matches!(inventory.move_to_trash(day(20)).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn trash_window_excludes_old_records() {
    let store = MemoryStore::with_products(baseline());
    let app = app(&store);
    let inventory = &app.inventory_service;
    let old = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
    inventory.update_quantity(old, "carrot", dec!(1)).await.unwrap();
    inventory.move_to_trash(old).await.unwrap();

    assert!(inventory.trash(day(15)).await.unwrap().is_empty());
    let mid_january = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    assert_eq!(inventory.trash(mid_january).await.unwrap().len(), 1);
}

#[tokio::test]
async fn saving_emits_events() {
    let store = MemoryStore::with_products(baseline());
    let (sender, mut events) = EventSender::channel(16);
    let app = AppState::new(
        AppConfig::default(),
        Arc::new(store.clone()),
        Catalog::new(baseline()),
        Some(sender),
    );

    app.inventory_service
        .update_quantity(day(7), "carrot", dec!(2))
        .await
        .unwrap();
    app.inventory_service.move_to_trash(day(7)).await.unwrap();

    assert_eq!(
        events.recv().await,
        Some(InventoryEvent::InventorySaved { date: day(7), entries: 3 })
    );
    assert_matches!(
        events.recv().await,
        Some(InventoryEvent::MovedToTrash { date, .. }) if date == day(7)
    );
}
