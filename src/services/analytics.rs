use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    errors::ServiceError,
    models::{Catalog, Category, DailyInventory, InventoryEntry},
};

use super::inventory::InventoryService;
use super::unit_conversion::to_kg;

pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Period an analytics report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsRange {
    /// The last seven days up to today.
    Week,
    /// The last thirty days up to today.
    Month,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl AnalyticsRange {
    /// Inclusive date bounds relative to `today`.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let days_back = |days| {
            today
                .checked_sub_signed(Duration::days(days))
                .unwrap_or(NaiveDate::MIN)
        };
        match *self {
            AnalyticsRange::Week => (days_back(7), today),
            AnalyticsRange::Month => (days_back(30), today),
            AnalyticsRange::Custom { start, end } => (start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_kg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAmount {
    pub product_id: String,
    pub name: String,
    pub kg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub kg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub trend: Vec<TrendPoint>,
    pub top_products: Vec<ProductAmount>,
    pub categories: Vec<CategoryTotal>,
}

/// Stock of `product_id` in kilograms. Zero when the product has no entry, is
/// not in the catalog, or its kilogram amount is out of range.
pub fn kg_for(entries: &[InventoryEntry], product_id: &str, catalog: &Catalog) -> Decimal {
    let entry = match entries.iter().find(|e| e.product_id == product_id) {
        Some(entry) => entry,
        None => return Decimal::ZERO,
    };
    match catalog.get(product_id) {
        Some(product) => to_kg(entry.quantity, &product.unit, product.kg_factor)
            .unwrap_or_else(|| {
                warn!(product_id, quantity = %entry.quantity, "kg amount out of range");
                Decimal::ZERO
            }),
        None => Decimal::ZERO,
    }
}

/// Total stock in kilograms per record, oldest first.
pub fn inventory_trend(history: &[DailyInventory], catalog: &Catalog) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = history
        .iter()
        .map(|record| TrendPoint {
            date: record.date,
            total_kg: record
                .entries
                .iter()
                .map(|e| kg_for(&record.entries, &e.product_id, catalog))
                .fold(Decimal::ZERO, Decimal::saturating_add),
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// The `limit` catalog products with the most stock in `latest`. Equal
/// amounts keep catalog order.
pub fn top_products(latest: &DailyInventory, catalog: &Catalog, limit: usize) -> Vec<ProductAmount> {
    let mut amounts: Vec<ProductAmount> = catalog
        .iter()
        .map(|product| ProductAmount {
            product_id: product.id.clone(),
            name: product.name.clone(),
            kg: kg_for(&latest.entries, &product.id, catalog),
        })
        .collect();
    amounts.sort_by(|a, b| b.kg.cmp(&a.kg));
    amounts.truncate(limit);
    amounts
}

/// Stock in kilograms per category in `latest`. Empty categories are omitted.
pub fn category_totals(latest: &DailyInventory, catalog: &Catalog) -> Vec<CategoryTotal> {
    Category::ALL
        .iter()
        .map(|&category| CategoryTotal {
            category,
            kg: catalog
                .iter()
                .filter(|p| p.category == category)
                .map(|p| kg_for(&latest.entries, &p.id, catalog))
                .fold(Decimal::ZERO, Decimal::saturating_add),
        })
        .filter(|total| total.kg > Decimal::ZERO)
        .collect()
}

/// Builds stock reports over inventory history.
#[derive(Clone)]
pub struct AnalyticsService {
    inventory: InventoryService,
    top_products_limit: usize,
}

impl AnalyticsService {
    pub fn new(inventory: InventoryService) -> Self {
        Self {
            inventory,
            top_products_limit: DEFAULT_TOP_PRODUCTS,
        }
    }

    pub fn with_top_products_limit(mut self, limit: usize) -> Self {
        self.top_products_limit = limit;
        self
    }

    /// Report for `range`. Fails with `NotFound` when no records fall inside it.
    #[instrument(skip(self))]
    pub async fn report(
        &self,
        range: AnalyticsRange,
        today: NaiveDate,
    ) -> Result<AnalyticsReport, ServiceError> {
        let (start, end) = range.bounds(today);
        let history = self.inventory.history(start, end, false).await?;
        let latest = history.first().ok_or_else(|| {
            ServiceError::NotFound(format!("no inventory data between {} and {}", start, end))
        })?;

        let catalog = self.inventory.catalog().load_catalog().await?;
        let report = AnalyticsReport {
            start,
            end,
            trend: inventory_trend(&history, &catalog),
            top_products: top_products(latest, &catalog, self.top_products_limit),
            categories: category_totals(latest, &catalog),
        };
        info!(%start, %end, records = history.len(), "Analytics report built");
        Ok(report)
    }
}
