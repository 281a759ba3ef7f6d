//! Re-expresses stored inventory entries in the units of the current catalog.
//!
//! A record is interpreted against two catalogs: the definitions its entries
//! were recorded in ("original") and the definitions in effect now
//! ("current"). Entries whose product is unknown to either side, or whose
//! converted value does not fit in a `Decimal`, pass through untouched;
//! history must stay loadable whatever the catalog looks like now.

use tracing::{debug, warn};

use crate::models::{Catalog, DailyInventory, InventoryEntry, UnitDefinition, UnitLookup};

use super::unit_conversion::{from_kg, round_stored, to_kg};

/// What happened to a single entry during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryOutcome {
    /// Quantities were converted into the current unit.
    Converted,
    /// Original and current unit agree; the entry is returned as is.
    SameUnit,
    /// The product is missing from the original catalog.
    MissingOriginal,
    /// The product is missing from the current catalog.
    MissingCurrent,
    /// The converted value is out of `Decimal` range; the entry keeps its
    /// original unit.
    Overflow,
}

impl EntryOutcome {
    pub fn is_missing_reference(&self) -> bool {
        matches!(self, EntryOutcome::MissingOriginal | EntryOutcome::MissingCurrent)
    }
}

/// Per-outcome counts for one reconciled record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub converted: usize,
    pub unchanged: usize,
    pub missing_reference: usize,
    pub overflowed: usize,
}

impl ReconciliationSummary {
    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Converted => self.converted += 1,
            EntryOutcome::SameUnit => self.unchanged += 1,
            EntryOutcome::MissingOriginal | EntryOutcome::MissingCurrent => {
                self.missing_reference += 1
            }
            EntryOutcome::Overflow => self.overflowed += 1,
        }
    }
}

/// Reconciles a single entry, reporting what was done.
pub fn reconcile_entry_with_outcome<O, C>(
    entry: &InventoryEntry,
    original: Option<&O>,
    current: Option<&C>,
) -> (InventoryEntry, EntryOutcome)
where
    O: UnitDefinition + ?Sized,
    C: UnitDefinition + ?Sized,
{
    let original = match original {
        Some(original) => original,
        None => return (entry.clone(), EntryOutcome::MissingOriginal),
    };
    let current = match current {
        Some(current) => current,
        None => return (entry.clone(), EntryOutcome::MissingCurrent),
    };

    if original.unit() == current.unit() {
        return (entry.clone(), EntryOutcome::SameUnit);
    }

    let convert = |value| {
        let kg = to_kg(value, original.unit(), original.kg_factor())?;
        from_kg(kg, current.unit(), current.kg_factor()).map(round_stored)
    };

    match (convert(entry.quantity), convert(entry.demand)) {
        (Some(quantity), Some(demand)) => {
            let converted = InventoryEntry {
                product_id: entry.product_id.clone(),
                quantity,
                demand,
                date: entry.date,
            };
            (converted, EntryOutcome::Converted)
        }
        _ => (entry.clone(), EntryOutcome::Overflow),
    }
}

/// Expresses `entry` in the unit of `current`.
///
/// Returns the entry unchanged when either definition is absent, both share
/// the same unit, or the converted value is out of range. Otherwise quantity and demand go through kilograms and are
/// rounded to two decimal places.
pub fn reconcile_entry<O, C>(
    entry: &InventoryEntry,
    original: Option<&O>,
    current: Option<&C>,
) -> InventoryEntry
where
    O: UnitDefinition + ?Sized,
    C: UnitDefinition + ?Sized,
{
    reconcile_entry_with_outcome(entry, original, current).0
}

/// Reconciles every entry of `record`, preserving order, date and trash state.
///
/// `recorded_units` of the result is updated only for entries that were
/// converted (current unit) or left behind in their original unit (missing
/// from the current catalog, or out of range). Untouched entries keep whatever
/// snapshot they had, so reconciling the result again is a no-op.
pub fn reconcile_inventory_with_summary<O, C>(
    record: &DailyInventory,
    original: &O,
    current: &C,
) -> (DailyInventory, ReconciliationSummary)
where
    O: UnitLookup + ?Sized,
    C: UnitLookup + ?Sized,
{
    let mut summary = ReconciliationSummary::default();
    let mut recorded_units = record.recorded_units.clone();
    let mut entries = Vec::with_capacity(record.entries.len());

    for entry in &record.entries {
        let original_def = original.definition(&entry.product_id);
        let current_def = current.definition(&entry.product_id);
        let (reconciled, outcome) = reconcile_entry_with_outcome(entry, original_def, current_def);

        match (outcome, original_def, current_def) {
            (EntryOutcome::Converted, _, Some(def)) => {
                recorded_units.insert(entry.product_id.clone(), def.snapshot());
            }
            (EntryOutcome::MissingCurrent | EntryOutcome::Overflow, Some(def), _) => {
                recorded_units.insert(entry.product_id.clone(), def.snapshot());
            }
            _ => {}
        }

        if outcome.is_missing_reference() {
            debug!(
                date = %record.date,
                product_id = %entry.product_id,
                ?outcome,
                "inventory entry references unknown product; passed through"
            );
        } else if outcome == EntryOutcome::Overflow {
            warn!(
                date = %record.date,
                product_id = %entry.product_id,
                "converted quantity out of range; entry kept in its recorded unit"
            );
        }

        summary.record(outcome);
        entries.push(reconciled);
    }

    let reconciled = DailyInventory {
        date: record.date,
        entries,
        deleted: record.deleted,
        deleted_at: record.deleted_at,
        recorded_units,
    };
    (reconciled, summary)
}

/// Reconciles every entry of `record` against the two catalogs.
pub fn reconcile_inventory<O, C>(record: &DailyInventory, original: &O, current: &C) -> DailyInventory
where
    O: UnitLookup + ?Sized,
    C: UnitLookup + ?Sized,
{
    reconcile_inventory_with_summary(record, original, current).0
}

/// Product ids added to and dropped from a working record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl MembershipChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Aligns the entry list of the day being worked on with `catalog`.
///
/// Entries of products no longer in the catalog are dropped. Products without
/// an entry get a zero entry dated to the record, appended in catalog order
/// after the surviving entries. Only meant for the working record: historical
/// records keep the products they were recorded with.
pub fn reconcile_membership(
    record: &DailyInventory,
    catalog: &Catalog,
) -> (DailyInventory, MembershipChange) {
    let mut change = MembershipChange::default();
    let mut entries: Vec<InventoryEntry> = Vec::with_capacity(catalog.len());

    for entry in &record.entries {
        if catalog.contains(&entry.product_id) {
            entries.push(entry.clone());
        } else {
            change.removed.push(entry.product_id.clone());
        }
    }

    for product in catalog {
        if record.entry(&product.id).is_none() {
            entries.push(InventoryEntry::empty(product.id.clone(), record.date));
            change.added.push(product.id.clone());
        }
    }

    let mut synced = record.clone();
    synced.entries = entries;
    (synced, change)
}
