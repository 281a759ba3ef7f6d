use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::Catalog;
use super::unit::UnitSnapshot;

/// Stock and demand of one product on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub product_id: String,
    pub quantity: Decimal,
    pub demand: Decimal,
    pub date: NaiveDate,
}

impl InventoryEntry {
    pub fn new(
        product_id: impl Into<String>,
        quantity: Decimal,
        demand: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            demand,
            date,
        }
    }

    /// Zero stock, zero demand.
    pub fn empty(product_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(product_id, Decimal::ZERO, Decimal::ZERO, date)
    }

    pub fn has_activity(&self) -> bool {
        self.quantity > Decimal::ZERO || self.demand > Decimal::ZERO
    }

    /// Outstanding demand not covered by stock, never negative.
    pub fn shortfall(&self) -> Decimal {
        (self.demand - self.quantity).max(Decimal::ZERO)
    }
}

/// The inventory record of a single calendar day.
///
/// `recorded_units` holds the unit definitions the entries were expressed in
/// when the record was last saved. Records written before it existed leave it
/// empty and are interpreted against the configured baseline catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyInventory {
    pub date: NaiveDate,

    #[serde(default)]
    pub entries: Vec<InventoryEntry>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub recorded_units: BTreeMap<String, UnitSnapshot>,
}

impl DailyInventory {
    pub fn new(date: NaiveDate, entries: Vec<InventoryEntry>) -> Self {
        Self {
            date,
            entries,
            deleted: false,
            deleted_at: None,
            recorded_units: BTreeMap::new(),
        }
    }

    /// A fresh record with one zero entry per catalog product, in catalog order.
    pub fn empty(date: NaiveDate, catalog: &Catalog) -> Self {
        let entries = catalog
            .iter()
            .map(|product| InventoryEntry::empty(product.id.clone(), date))
            .collect();
        Self::new(date, entries)
    }

    pub fn entry(&self, product_id: &str) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.product_id == product_id)
    }

    /// Recorded quantity, zero when the product has no entry.
    pub fn quantity_of(&self, product_id: &str) -> Decimal {
        self.entry(product_id).map(|e| e.quantity).unwrap_or_default()
    }

    /// Recorded demand, zero when the product has no entry.
    pub fn demand_of(&self, product_id: &str) -> Decimal {
        self.entry(product_id).map(|e| e.demand).unwrap_or_default()
    }

    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted = true;
        self.deleted_at = Some(at);
    }

    pub fn clear_deleted(&mut self) {
        self.deleted = false;
        self.deleted_at = None;
    }
}
