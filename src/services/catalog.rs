use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    errors::ServiceError,
    events::{EventSender, InventoryEvent},
    models::{default_catalog, Catalog, Category, Product, Unit},
    repositories::CatalogStore,
};

/// Input for a new catalog product. The id and display order are derived.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub category: Category,
    pub unit: Unit,
    pub kg_factor: Decimal,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, category: Category, unit: Unit, kg_factor: Decimal) -> Self {
        Self {
            name: name.into(),
            category,
            unit,
            kg_factor,
        }
    }
}

impl Default for NewProduct {
    fn default() -> Self {
        Self::new(String::new(), Category::Vegetables, Unit::Piece, Decimal::ONE)
    }
}

/// Partial edit of an existing product. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub unit: Option<Unit>,
    pub kg_factor: Option<Decimal>,
    pub order: Option<i64>,
}

impl ProductChanges {
    fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(kg_factor) = self.kg_factor {
            product.kg_factor = kg_factor;
        }
        if let Some(unit) = self.unit {
            product.set_unit(unit);
        }
        if let Some(order) = self.order {
            product.order = order;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Derives a product id from its display name.
///
/// Lowercases, spells out German umlauts and ß, and replaces every character
/// outside `a-z0-9` with `-`.
pub fn product_id_for(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            'ä' => id.push_str("ae"),
            'ö' => id.push_str("oe"),
            'ü' => id.push_str("ue"),
            'ß' => id.push_str("ss"),
            'a'..='z' | '0'..='9' => id.push(c),
            _ => id.push('-'),
        }
    }
    id
}

/// Checks a product against the catalog rules: a non-empty name, a positive
/// kg factor, and a factor of exactly 1 for products sold by the kilogram.
pub fn validate_product(product: &Product) -> Result<(), ServiceError> {
    product.validate().map_err(|e| {
        warn!(product_id = %product.id, error = %e, "Rejected invalid product");
        ServiceError::from(e)
    })
}

/// Service for managing the product catalog
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    event_sender: Option<EventSender>,
}

impl CatalogService {
    /// Creates a new catalog service instance
    pub fn new(store: Arc<dyn CatalogStore>, event_sender: Option<EventSender>) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    /// Current catalog in display order. Falls back to the built-in product
    /// list when nothing has been stored yet.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> Result<Catalog, ServiceError> {
        match self.store.load_products().await? {
            Some(products) => Ok(Catalog::new(products)),
            None => {
                info!("No stored catalog; using default products");
                Ok(default_catalog())
            }
        }
    }

    /// Validates and stores the whole catalog.
    #[instrument(skip(self, catalog), fields(products = catalog.len()))]
    pub async fn save_catalog(&self, catalog: &Catalog) -> Result<(), ServiceError> {
        for product in catalog {
            validate_product(product)?;
        }

        self.store.save_products(catalog.products()).await.map_err(|e| {
            error!(error = %e, "Failed to save catalog");
            e
        })?;

        if let Some(sender) = &self.event_sender {
            sender
                .send(InventoryEvent::CatalogChanged {
                    products: catalog.len(),
                })
                .await
                .map_err(ServiceError::EventError)?;
        }
        Ok(())
    }

    /// Adds a product at the end of the display order.
    #[instrument(skip(self))]
    pub async fn add_product(&self, draft: NewProduct) -> Result<Product, ServiceError> {
        draft.validate()?;

        let catalog = self.load_catalog().await?;
        let id = product_id_for(&draft.name);
        if catalog.contains(&id) {
            let msg = format!("Product with id '{}' already exists", id);
            warn!(%msg);
            return Err(ServiceError::Conflict(msg));
        }

        let order = catalog.max_order().unwrap_or(0).max(0) + 1;
        let mut product = Product::new(
            id,
            draft.name,
            draft.category,
            draft.unit.clone(),
            order,
            draft.kg_factor,
        );
        product.set_unit(draft.unit);
        validate_product(&product)?;

        let mut products = catalog.into_products();
        products.push(product.clone());
        self.save_catalog(&Catalog::new(products)).await?;

        info!(product_id = %product.id, order, "Product added");
        Ok(product)
    }

    /// Applies `changes` to the product with `product_id`.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: &str,
        changes: ProductChanges,
    ) -> Result<Product, ServiceError> {
        let mut products = self.load_catalog().await?.into_products();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ServiceError::NotFound(format!("product '{}'", product_id)))?;

        changes.apply(product);
        validate_product(product)?;
        let updated = product.clone();

        self.save_catalog(&Catalog::new(products)).await?;
        info!(product_id = %updated.id, unit = %updated.unit, "Product updated");
        Ok(updated)
    }

    /// Drops the product from the catalog. Stored inventory keeps its entries.
    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: &str) -> Result<(), ServiceError> {
        let catalog = self.load_catalog().await?;
        if !catalog.contains(product_id) {
            return Err(ServiceError::NotFound(format!("product '{}'", product_id)));
        }

        let products: Vec<Product> = catalog
            .into_products()
            .into_iter()
            .filter(|p| p.id != product_id)
            .collect();
        self.save_catalog(&Catalog::new(products)).await?;
        info!(product_id, "Product removed");
        Ok(())
    }

    /// Swaps the display order of a product with its neighbour.
    ///
    /// The two products exchange their `order` values and the catalog is
    /// re-sorted. Moving the first product up or the last one down changes
    /// nothing. Products sharing an `order` value stay ambiguous.
    #[instrument(skip(self))]
    pub async fn move_product(
        &self,
        product_id: &str,
        direction: MoveDirection,
    ) -> Result<Catalog, ServiceError> {
        let catalog = self.load_catalog().await?;
        let index = catalog
            .position(product_id)
            .ok_or_else(|| ServiceError::NotFound(format!("product '{}'", product_id)))?;

        let swap_index = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < catalog.len() => index + 1,
            _ => return Ok(catalog),
        };

        let mut products = catalog.into_products();
        let order = products[index].order;
        products[index].order = products[swap_index].order;
        products[swap_index].order = order;

        let reordered = Catalog::new(products);
        self.save_catalog(&reordered).await?;
        Ok(reordered)
    }
}
