use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::ServiceError;
use crate::models::{DailyInventory, Product};

pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Storage for daily inventory records, keyed by date.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Inserts or replaces the record for `record.date`.
    async fn save_inventory(&self, record: DailyInventory) -> Result<(), ServiceError>;

    async fn get_inventory(&self, date: NaiveDate) -> Result<Option<DailyInventory>, ServiceError>;

    /// Records dated within `start..=end`, newest first. Records in the trash
    /// are only returned when `include_deleted` is set.
    async fn list_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_deleted: bool,
    ) -> Result<Vec<DailyInventory>, ServiceError>;

    /// Flags the record as deleted. Fails with `NotFound` when absent.
    async fn mark_deleted(&self, date: NaiveDate, at: DateTime<Utc>) -> Result<(), ServiceError>;

    /// Clears the deleted flag and timestamp. Fails with `NotFound` when absent.
    async fn clear_deleted(&self, date: NaiveDate) -> Result<(), ServiceError>;

    /// Physically removes the record. Fails with `NotFound` when absent.
    async fn remove(&self, date: NaiveDate) -> Result<(), ServiceError>;
}

/// Storage for the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// The stored products, or `None` when no catalog was ever saved.
    async fn load_products(&self) -> Result<Option<Vec<Product>>, ServiceError>;

    async fn save_products(&self, products: &[Product]) -> Result<(), ServiceError>;
}

pub(crate) fn missing_record(date: NaiveDate) -> ServiceError {
    ServiceError::NotFound(format!("inventory for {}", date))
}

pub(crate) fn in_range(
    record: &DailyInventory,
    start: NaiveDate,
    end: NaiveDate,
    include_deleted: bool,
) -> bool {
    record.date >= start && record.date <= end && (include_deleted || !record.deleted)
}
