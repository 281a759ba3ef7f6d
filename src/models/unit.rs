use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const KG_LABEL: &str = "kg";
const PIECE_LABEL: &str = "Stück";
const BUNCH_LABEL: &str = "Bund";

/// Measurement unit a product is counted in.
///
/// Stored as its plain label. Only [`Unit::Kg`] has special meaning: converting
/// a kilogram quantity to or from kilograms is the identity. Labels that are not
/// one of the known units are kept verbatim in [`Unit::Other`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    Kg,
    Piece,
    Bunch,
    Other(String),
}

impl Unit {
    pub fn label(&self) -> &str {
        match self {
            Unit::Kg => KG_LABEL,
            Unit::Piece => PIECE_LABEL,
            Unit::Bunch => BUNCH_LABEL,
            Unit::Other(label) => label,
        }
    }

    pub fn is_kg(&self) -> bool {
        self.label() == KG_LABEL
    }
}

// Units compare by label so that `Other("kg")` and `Kg` are the same unit.
impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label().hash(state);
    }
}

impl From<String> for Unit {
    fn from(label: String) -> Self {
        match label.as_str() {
            KG_LABEL => Unit::Kg,
            PIECE_LABEL => Unit::Piece,
            BUNCH_LABEL => Unit::Bunch,
            _ => Unit::Other(label),
        }
    }
}

impl From<&str> for Unit {
    fn from(label: &str) -> Self {
        Unit::from(label.to_string())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl FromStr for Unit {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Unit::from(s))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Anything that carries a unit together with its kg-equivalence.
pub trait UnitDefinition {
    fn unit(&self) -> &Unit;
    fn kg_factor(&self) -> Decimal;

    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot::new(self.unit().clone(), self.kg_factor())
    }
}

/// The unit definition of one product frozen at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSnapshot {
    pub unit: Unit,
    pub kg_factor: Decimal,
}

impl UnitSnapshot {
    pub fn new(unit: impl Into<Unit>, kg_factor: Decimal) -> Self {
        Self {
            unit: unit.into(),
            kg_factor,
        }
    }
}

impl UnitDefinition for UnitSnapshot {
    fn unit(&self) -> &Unit {
        &self.unit
    }

    fn kg_factor(&self) -> Decimal {
        self.kg_factor
    }
}

/// Lookup of unit definitions by product id.
pub trait UnitLookup {
    type Definition: UnitDefinition;

    fn definition(&self, product_id: &str) -> Option<&Self::Definition>;
}

impl UnitLookup for BTreeMap<String, UnitSnapshot> {
    type Definition = UnitSnapshot;

    fn definition(&self, product_id: &str) -> Option<&UnitSnapshot> {
        self.get(product_id)
    }
}
