// Core conversion and reconciliation
pub mod reconciliation;
pub mod unit_conversion;

// Catalog and inventory management
pub mod catalog;
pub mod inventory;

// Reporting
pub mod analytics;
pub mod archive;
