//! Produce Inventory Library
//!
//! Daily stock and demand tracking for a produce shop. Quantities are kept in
//! each product's own counting unit; when the catalog changes a product's unit,
//! stored records are re-expressed in the new unit through kilograms.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use config::{AppConfig, AppConfigError};
use events::EventSender;
use models::Catalog;
use repositories::{CatalogStore, InventoryStore, JsonFileStore};
use services::{analytics::AnalyticsService, catalog::CatalogService, inventory::InventoryService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub event_sender: Option<EventSender>,
    pub catalog_service: CatalogService,
    pub inventory_service: InventoryService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    /// Wires the services over a store holding both catalog and inventory.
    pub fn new<S>(
        config: AppConfig,
        store: Arc<S>,
        baseline: Catalog,
        event_sender: Option<EventSender>,
    ) -> Self
    where
        S: InventoryStore + CatalogStore + 'static,
    {
        let catalog_store: Arc<dyn CatalogStore> = store.clone();
        let inventory_store: Arc<dyn InventoryStore> = store;

        let catalog_service = CatalogService::new(catalog_store, event_sender.clone());
        let inventory_service = InventoryService::new(
            inventory_store,
            catalog_service.clone(),
            Arc::new(baseline),
            event_sender.clone(),
        )
        .with_trash_window(config.trash_window_days);
        let analytics_service = AnalyticsService::new(inventory_service.clone())
            .with_top_products_limit(config.top_products_limit);

        Self {
            config,
            event_sender,
            catalog_service,
            inventory_service,
            analytics_service,
        }
    }

    /// Services backed by the JSON data file named in `config`.
    pub fn from_config(
        config: AppConfig,
        event_sender: Option<EventSender>,
    ) -> Result<Self, AppConfigError> {
        let baseline = config.baseline_catalog()?;
        let store = Arc::new(JsonFileStore::new(config.data_file.clone()));
        Ok(Self::new(config, store, baseline, event_sender))
    }
}
