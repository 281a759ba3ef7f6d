use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::{
    errors::ServiceError,
    events::{EventSender, InventoryEvent},
    models::{Catalog, DailyInventory, UnitDefinition, UnitSnapshot},
    repositories::InventoryStore,
};

use super::catalog::CatalogService;
use super::reconciliation::{reconcile_inventory_with_summary, reconcile_membership};

pub const DEFAULT_TRASH_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryField {
    Quantity,
    Demand,
}

/// Service for loading, editing and archiving daily inventory records.
///
/// Every record handed out is expressed in the units of the current catalog.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    catalog: CatalogService,
    baseline: Arc<Catalog>,
    event_sender: Option<EventSender>,
    trash_window_days: i64,
}

impl InventoryService {
    /// Creates a new inventory service instance.
    ///
    /// `baseline` is the catalog that records saved without unit information
    /// were recorded against.
    pub fn new(
        store: Arc<dyn InventoryStore>,
        catalog: CatalogService,
        baseline: Arc<Catalog>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            store,
            catalog,
            baseline,
            event_sender,
            trash_window_days: DEFAULT_TRASH_WINDOW_DAYS,
        }
    }

    pub fn with_trash_window(mut self, days: i64) -> Self {
        self.trash_window_days = days;
        self
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    /// Record for `date` in current units. A day without a stored record
    /// yields an empty one that is not persisted.
    #[instrument(skip(self))]
    pub async fn load_inventory(&self, date: NaiveDate) -> Result<DailyInventory, ServiceError> {
        let current = self.catalog.load_catalog().await?;
        match self.store.get_inventory(date).await? {
            Some(record) => Ok(self.reconcile_stored(&record, &current)),
            None => {
                debug!(%date, "No stored inventory; starting empty");
                Ok(DailyInventory::empty(date, &current))
            }
        }
    }

    /// Loads the record being worked on and aligns its entries with the
    /// current catalog, persisting it when products were added or removed.
    #[instrument(skip(self))]
    pub async fn open_workday(&self, date: NaiveDate) -> Result<DailyInventory, ServiceError> {
        let current = self.catalog.load_catalog().await?;
        let record = match self.store.get_inventory(date).await? {
            Some(record) => self.reconcile_stored(&record, &current),
            None => return Ok(DailyInventory::empty(date, &current)),
        };

        let (synced, change) = reconcile_membership(&record, &current);
        if change.is_empty() {
            return Ok(synced);
        }

        info!(
            %date,
            added = change.added.len(),
            removed = change.removed.len(),
            "Inventory entries synced with catalog"
        );
        self.persist(synced, &current).await
    }

    /// Sets the stock of one product. Negative values are stored as zero.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        date: NaiveDate,
        product_id: &str,
        value: Decimal,
    ) -> Result<DailyInventory, ServiceError> {
        self.update_entry(date, product_id, value, EntryField::Quantity)
            .await
    }

    /// Sets the demand of one product. Negative values are stored as zero.
    #[instrument(skip(self))]
    pub async fn update_demand(
        &self,
        date: NaiveDate,
        product_id: &str,
        value: Decimal,
    ) -> Result<DailyInventory, ServiceError> {
        self.update_entry(date, product_id, value, EntryField::Demand)
            .await
    }

    async fn update_entry(
        &self,
        date: NaiveDate,
        product_id: &str,
        value: Decimal,
        field: EntryField,
    ) -> Result<DailyInventory, ServiceError> {
        let mut record = self.open_workday(date).await?;
        let entry = record
            .entries
            .iter_mut()
            .find(|e| e.product_id == product_id)
            .ok_or_else(|| ServiceError::NotFound(format!("product '{}'", product_id)))?;

        let value = value.max(Decimal::ZERO);
        match field {
            EntryField::Quantity => entry.quantity = value,
            EntryField::Demand => entry.demand = value,
        }
        // An edited value is entered in the current unit.
        record.recorded_units.remove(product_id);

        self.save_inventory(record).await
    }

    /// Stores `record`, whose entries must be in current catalog units.
    ///
    /// Entry dates are forced to the record date and a record in the trash is
    /// restored by saving it.
    #[instrument(skip(self, record), fields(date = %record.date))]
    pub async fn save_inventory(
        &self,
        record: DailyInventory,
    ) -> Result<DailyInventory, ServiceError> {
        let current = self.catalog.load_catalog().await?;
        self.persist(record, &current).await
    }

    async fn persist(
        &self,
        mut record: DailyInventory,
        current: &Catalog,
    ) -> Result<DailyInventory, ServiceError> {
        let date = record.date;
        for entry in &mut record.entries {
            entry.date = date;
        }
        record.clear_deleted();
        record.recorded_units = recorded_units_for(&record, current);

        self.store.save_inventory(record.clone()).await.map_err(|e| {
            error!(%date, error = %e, "Failed to save inventory");
            e
        })?;
        info!(%date, entries = record.entries.len(), "Inventory saved");

        self.emit(InventoryEvent::InventorySaved {
            date,
            entries: record.entries.len(),
        })
        .await?;
        Ok(record)
    }

    /// Records dated `start..=end`, newest first, in current units.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_deleted: bool,
    ) -> Result<Vec<DailyInventory>, ServiceError> {
        if start > end {
            return Err(ServiceError::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        let current = self.catalog.load_catalog().await?;
        let records = self.store.list_range(start, end, include_deleted).await?;
        Ok(records
            .iter()
            .map(|record| self.reconcile_stored(record, &current))
            .collect())
    }

    /// Records moved to the trash within the trash window ending `today`.
    #[instrument(skip(self))]
    pub async fn trash(&self, today: NaiveDate) -> Result<Vec<DailyInventory>, ServiceError> {
        let start = today
            .checked_sub_signed(Duration::days(self.trash_window_days))
            .unwrap_or(NaiveDate::MIN);
        let records = self.history(start, today, true).await?;
        Ok(records.into_iter().filter(|r| r.deleted).collect())
    }

    /// Flags the record for `date` as deleted and returns the deletion time.
    #[instrument(skip(self))]
    pub async fn move_to_trash(&self, date: NaiveDate) -> Result<DateTime<Utc>, ServiceError> {
        let deleted_at = Utc::now();
        self.store.mark_deleted(date, deleted_at).await?;
        info!(%date, "Inventory moved to trash");
        self.emit(InventoryEvent::MovedToTrash { date, deleted_at })
            .await?;
        Ok(deleted_at)
    }

    #[instrument(skip(self))]
    pub async fn restore(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.store.clear_deleted(date).await?;
        info!(%date, "Inventory restored from trash");
        self.emit(InventoryEvent::Restored { date }).await
    }

    /// Removes the record for `date` for good.
    #[instrument(skip(self))]
    pub async fn purge(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.store.remove(date).await?;
        info!(%date, "Inventory purged");
        self.emit(InventoryEvent::Purged { date }).await
    }

    fn reconcile_stored(&self, record: &DailyInventory, current: &Catalog) -> DailyInventory {
        let (reconciled, summary) = if record.recorded_units.is_empty() {
            reconcile_inventory_with_summary(record, self.baseline.as_ref(), current)
        } else {
            reconcile_inventory_with_summary(record, &record.recorded_units, current)
        };

        if summary.converted > 0 || summary.missing_reference > 0 || summary.overflowed > 0 {
            debug!(
                date = %record.date,
                converted = summary.converted,
                missing = summary.missing_reference,
                overflowed = summary.overflowed,
                "Inventory reconciled against current catalog"
            );
        }
        reconciled
    }

    async fn emit(&self, event: InventoryEvent) -> Result<(), ServiceError> {
        if let Some(sender) = &self.event_sender {
            sender.send(event).await.map_err(ServiceError::EventError)?;
        }
        Ok(())
    }
}

// Units each entry is expressed in. Entries of products gone from the catalog,
// and entries that could not be converted to the current unit, keep whatever
// they were last recorded with.
fn recorded_units_for(
    record: &DailyInventory,
    current: &Catalog,
) -> BTreeMap<String, UnitSnapshot> {
    let mut units = BTreeMap::new();
    for entry in &record.entries {
        let recorded = record.recorded_units.get(&entry.product_id);
        let snapshot = match (current.get(&entry.product_id), recorded) {
            (Some(product), Some(recorded)) if recorded.unit != product.unit => {
                Some(recorded.clone())
            }
            (Some(product), _) => Some(product.snapshot()),
            (None, recorded) => recorded.cloned(),
        };
        if let Some(snapshot) = snapshot {
            units.insert(entry.product_id.clone(), snapshot);
        }
    }
    units
}
