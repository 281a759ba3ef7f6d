use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{in_range, missing_record, CatalogStore, InventoryStore};
use crate::errors::ServiceError;
use crate::models::{DailyInventory, Product};

/// Process-local store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inventories: Arc<RwLock<BTreeMap<NaiveDate, DailyInventory>>>,
    products: Arc<RwLock<Option<Vec<Product>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            inventories: Arc::default(),
            products: Arc::new(RwLock::new(Some(products))),
        }
    }

    pub async fn len(&self) -> usize {
        self.inventories.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inventories.read().await.is_empty()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn save_inventory(&self, record: DailyInventory) -> Result<(), ServiceError> {
        self.inventories.write().await.insert(record.date, record);
        Ok(())
    }

    async fn get_inventory(&self, date: NaiveDate) -> Result<Option<DailyInventory>, ServiceError> {
        Ok(self.inventories.read().await.get(&date).cloned())
    }

    async fn list_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_deleted: bool,
    ) -> Result<Vec<DailyInventory>, ServiceError> {
        if start > end {
            return Ok(Vec::new());
        }
        let inventories = self.inventories.read().await;
        Ok(inventories
            .range(start..=end)
            .rev()
            .map(|(_, record)| record)
            .filter(|record| in_range(record, start, end, include_deleted))
            .cloned()
            .collect())
    }

    async fn mark_deleted(&self, date: NaiveDate, at: DateTime<Utc>) -> Result<(), ServiceError> {
        let mut inventories = self.inventories.write().await;
        let record = inventories.get_mut(&date).ok_or_else(|| missing_record(date))?;
        record.mark_deleted(at);
        Ok(())
    }

    async fn clear_deleted(&self, date: NaiveDate) -> Result<(), ServiceError> {
        let mut inventories = self.inventories.write().await;
        let record = inventories.get_mut(&date).ok_or_else(|| missing_record(date))?;
        record.clear_deleted();
        Ok(())
    }

    async fn remove(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.inventories
            .write()
            .await
            .remove(&date)
            .map(|_| ())
            .ok_or_else(|| missing_record(date))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn load_products(&self) -> Result<Option<Vec<Product>>, ServiceError> {
        Ok(self.products.read().await.clone())
    }

    async fn save_products(&self, products: &[Product]) -> Result<(), ServiceError> {
        *self.products.write().await = Some(products.to_vec());
        Ok(())
    }
}
