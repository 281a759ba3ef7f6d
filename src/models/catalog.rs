use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::product::Product;
use super::unit::{UnitDefinition, UnitLookup, UnitSnapshot};

/// The set of product definitions in effect at one point in time, kept in
/// display order.
///
/// Ordering is a stable sort on `order`; products sharing an `order` value keep
/// the sequence they were given in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Product>", into = "Vec<Product>")]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by_key(|p| p.order);
        Self { products }
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.get(product_id).is_some()
    }

    pub fn position(&self, product_id: &str) -> Option<usize> {
        self.products.iter().position(|p| p.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn max_order(&self) -> Option<i64> {
        self.products.iter().map(|p| p.order).max()
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }

    /// Unit definitions of every product, keyed by id.
    pub fn unit_snapshot(&self) -> BTreeMap<String, UnitSnapshot> {
        self.products
            .iter()
            .map(|p| (p.id.clone(), p.snapshot()))
            .collect()
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        Catalog::new(products)
    }
}

impl From<Catalog> for Vec<Product> {
    fn from(catalog: Catalog) -> Self {
        catalog.products
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

impl UnitLookup for Catalog {
    type Definition = Product;

    fn definition(&self, product_id: &str) -> Option<&Product> {
        self.get(product_id)
    }
}
