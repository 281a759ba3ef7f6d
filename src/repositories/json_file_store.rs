use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{in_range, missing_record, CatalogStore, InventoryStore};
use crate::errors::ServiceError;
use crate::models::{DailyInventory, Product};

/// On-disk layout of the data file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    products: Option<Vec<Product>>,

    #[serde(default)]
    inventory: Vec<DailyInventory>,
}

impl StoreDocument {
    fn record_mut(&mut self, date: NaiveDate) -> Result<&mut DailyInventory, ServiceError> {
        self.inventory
            .iter_mut()
            .find(|r| r.date == date)
            .ok_or_else(|| missing_record(date))
    }
}

/// Keeps the catalog and all inventory records in a single JSON file.
///
/// Every operation reads the file, and mutations rewrite it through a
/// temporary sibling that is renamed into place. A missing file reads as an
/// empty store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<StoreDocument, ServiceError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(StoreDocument::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "data file missing; starting empty");
                Ok(StoreDocument::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn write_document(&self, document: &StoreDocument) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn update<F>(&self, apply: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut StoreDocument) -> Result<(), ServiceError> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        apply(&mut document)?;
        self.write_document(&document).await
    }
}

#[async_trait]
impl InventoryStore for JsonFileStore {
    #[instrument(skip(self, record), fields(date = %record.date))]
    async fn save_inventory(&self, record: DailyInventory) -> Result<(), ServiceError> {
        self.update(move |doc| {
            match doc.inventory.iter_mut().find(|r| r.date == record.date) {
                Some(existing) => *existing = record,
                None => doc.inventory.push(record),
            }
            doc.inventory.sort_by_key(|r| r.date);
            Ok(())
        })
        .await
    }

    async fn get_inventory(&self, date: NaiveDate) -> Result<Option<DailyInventory>, ServiceError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        Ok(document.inventory.into_iter().find(|r| r.date == date))
    }

    async fn list_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_deleted: bool,
    ) -> Result<Vec<DailyInventory>, ServiceError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        let mut records: Vec<_> = document
            .inventory
            .into_iter()
            .filter(|r| in_range(r, start, end, include_deleted))
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn mark_deleted(&self, date: NaiveDate, at: DateTime<Utc>) -> Result<(), ServiceError> {
        self.update(move |doc| {
            doc.record_mut(date)?.mark_deleted(at);
            Ok(())
        })
        .await
    }

    async fn clear_deleted(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.update(move |doc| {
            doc.record_mut(date)?.clear_deleted();
            Ok(())
        })
        .await
    }

    async fn remove(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.update(move |doc| {
            let before = doc.inventory.len();
            doc.inventory.retain(|r| r.date != date);
            if doc.inventory.len() == before {
                return Err(missing_record(date));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn load_products(&self) -> Result<Option<Vec<Product>>, ServiceError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.products)
    }

    async fn save_products(&self, products: &[Product]) -> Result<(), ServiceError> {
        let products = products.to_vec();
        self.update(move |doc| {
            doc.products = Some(products);
            Ok(())
        })
        .await
    }
}
