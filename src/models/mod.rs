// Core models
pub mod catalog;
pub mod default_catalog;
pub mod inventory;
pub mod product;
pub mod unit;

pub use catalog::Catalog;
pub use default_catalog::{default_catalog, default_products};
pub use inventory::{DailyInventory, InventoryEntry};
pub use product::{Category, Product};
pub use unit::{Unit, UnitDefinition, UnitLookup, UnitSnapshot};
