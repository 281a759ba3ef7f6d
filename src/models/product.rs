use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use super::unit::{Unit, UnitDefinition};

/// Product category. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruits,
    Vegetables,
    Salads,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Fruits, Category::Vegetables, Category::Salads];

    /// Label shown to shop staff.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Fruits => "Obst",
            Category::Vegetables => "Gemüse",
            Category::Salads => "Salate",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fruits => "fruits",
            Category::Vegetables => "vegetables",
            Category::Salads => "salads",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fruits" | "obst" => Ok(Category::Fruits),
            "vegetables" | "gemüse" | "gemuese" => Ok(Category::Vegetables),
            "salads" | "salate" => Ok(Category::Salads),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// A catalog product.
///
/// `kg_factor` is the number of kilograms one unit of `unit` represents. For
/// products counted in kilograms it must be exactly 1; otherwise it must be
/// positive. Conversions assume this holds, so it is enforced through
/// [`Validate`] wherever products are created or edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_unit_factor"))]
pub struct Product {
    #[validate(length(min = 1, max = 255))]
    pub id: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub category: Category,

    pub unit: Unit,

    pub order: i64,

    pub kg_factor: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        unit: impl Into<Unit>,
        order: i64,
        kg_factor: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            unit: unit.into(),
            order,
            kg_factor,
            deleted: None,
            deleted_at: None,
        }
    }

    /// Switches the product to `unit`. Switching to kilograms pins the factor to 1.
    pub fn set_unit(&mut self, unit: Unit) {
        if unit.is_kg() {
            self.kg_factor = Decimal::ONE;
        }
        self.unit = unit;
    }
}

impl UnitDefinition for Product {
    fn unit(&self) -> &Unit {
        &self.unit
    }

    fn kg_factor(&self) -> Decimal {
        self.kg_factor
    }
}

fn validate_unit_factor(product: &Product) -> Result<(), ValidationError> {
    if product.kg_factor <= Decimal::ZERO {
        let mut err = ValidationError::new("kg_factor_not_positive");
        err.message = Some(format!("kgFactor of '{}' must be greater than zero", product.id).into());
        return Err(err);
    }
    if product.unit.is_kg() && product.kg_factor != Decimal::ONE {
        let mut err = ValidationError::new("kg_factor_must_be_one");
        err.message = Some(format!("kgFactor of kg product '{}' must be 1", product.id).into());
        return Err(err);
    }
    Ok(())
}
