use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use produce_inventory::{
    errors::ServiceError,
    models::{default_products, DailyInventory, InventoryEntry, Unit, UnitSnapshot},
    repositories::{CatalogStore, InventoryStore, JsonFileStore},
};
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
}

fn record(d: u32) -> DailyInventory {
    DailyInventory::new(
        day(d),
        vec![InventoryEntry::new("kiwi", dec!(1.5), dec!(2), day(d))],
    )
}

#[tokio::test]
async fn missing_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("inventory.json"));

    assert!(store.load_products().await.unwrap().is_none());
    assert!(store.get_inventory(day(1)).await.unwrap().is_none());
    assert!(store.list_range(day(1), day(28), true).await.unwrap().is_empty());
}

#[tokio::test]
async fn records_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inventory.json");

    let mut saved = record(3);
    saved
        .recorded_units
        .insert("kiwi".into(), UnitSnapshot::new(Unit::Piece, dec!(0.1)));
    {
        let store = JsonFileStore::new(&path);
        store.save_inventory(saved.clone()).await.unwrap();
        store.save_inventory(record(1)).await.unwrap();
        store.save_products(&default_products()).await.unwrap();
    }

    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.get_inventory(day(3)).await.unwrap(), Some(saved));
    assert_eq!(reopened.load_products().await.unwrap().map(|p| p.len()), Some(42));

    let dates: Vec<_> = reopened
        .list_range(day(1), day(5), false)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.date)
        .collect();
    assert_eq!(dates, [day(3), day(1)]);
}

#[tokio::test]
async fn save_replaces_same_date() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("inventory.json"));
    store.save_inventory(record(4)).await.unwrap();

    let replacement = DailyInventory::new(day(4), Vec::new());
    store.save_inventory(replacement.clone()).await.unwrap();

    let all = store.list_range(day(1), day(28), true).await.unwrap();
    assert_eq!(all, [replacement]);
}

#[tokio::test]
async fn trash_flags_are_persisted() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("inventory.json"));
    store.save_inventory(record(6)).await.unwrap();

    let at = Utc.with_ymd_and_hms(2025, 2, 7, 8, 30, 0).unwrap();
    store.mark_deleted(day(6), at).await.unwrap();
    let stored = store.get_inventory(day(6)).await.unwrap().unwrap();
    assert!(stored.deleted);
    assert_eq!(stored.deleted_at, Some(at));
    assert!(store.list_range(day(6), day(6), false).await.unwrap().is_empty());

    store.clear_deleted(day(6)).await.unwrap();
    let stored = store.get_inventory(day(6)).await.unwrap().unwrap();
    assert!(!stored.deleted);
    assert_eq!(stored.deleted_at, None);

    store.remove(day(6)).await.unwrap();
    assert_matches!(store.remove(day(6)).await, Err(ServiceError::NotFound(_)));
    assert_matches!(store.mark_deleted(day(6), at).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn reads_documents_in_stored_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inventory.json");
    std::fs::write(
        &path,
        r#"{
            "inventory": [{
                "date": "2025-02-10",
                "entries": [{"productId": "lauch", "quantity": 3, "demand": 0.5, "date": "2025-02-10"}],
                "deleted": true,
                "deletedAt": "2025-02-11T09:00:00Z"
            }]
        }"#,
    )
    .unwrap();

    let store = JsonFileStore::new(&path);
    let stored = store.get_inventory(day(10)).await.unwrap().unwrap();
    assert!(stored.deleted);
    assert_eq!(stored.quantity_of("lauch"), dec!(3));
    assert!(store.load_products().await.unwrap().is_none());
}

#[tokio::test]
async fn corrupt_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inventory.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert_matches!(
        store.get_inventory(day(1)).await,
        Err(ServiceError::SerializationError(_))
    );
}
