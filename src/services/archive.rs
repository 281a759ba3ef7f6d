//! Filtering and grouping of past inventory records for browsing.

use chrono::{Datelike, Locale, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::DailyInventory;

/// Long German form of `date`, e.g. `Montag, 3. März 2025`.
pub fn german_long_date(date: NaiveDate) -> String {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .format_localized("%A, %-d. %B %Y", Locale::de_DE)
        .to_string()
}

/// German month heading for the month of `date`, e.g. `März 2025`.
pub fn german_month_label(date: NaiveDate) -> String {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .format_localized("%B %Y", Locale::de_DE)
        .to_string()
}

/// Key records are grouped under: `yyyy-MM`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveFilter {
    /// Free text matched case-insensitively against the long German date or
    /// the ISO date.
    #[serde(default)]
    pub search: Option<String>,

    /// Only records where this product had stock or demand.
    #[serde(default)]
    pub product_id: Option<String>,
}

impl ArchiveFilter {
    pub fn new(search: Option<String>, product_id: Option<String>) -> Self {
        Self { search, product_id }
    }

    pub fn matches(&self, record: &DailyInventory) -> bool {
        self.matches_search(record) && self.matches_product(record)
    }

    fn matches_search(&self, record: &DailyInventory) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            None | Some("") => return true,
            Some(needle) => needle.to_lowercase(),
        };
        german_long_date(record.date).to_lowercase().contains(&needle)
            || record.date.to_string().contains(&needle)
    }

    fn matches_product(&self, record: &DailyInventory) -> bool {
        match self.product_id.as_deref() {
            None | Some("") => true,
            Some(id) => record
                .entries
                .iter()
                .any(|e| e.product_id == id && e.has_activity()),
        }
    }

    /// Records passing the filter, in their original order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<DailyInventory>
    where
        I: IntoIterator<Item = &'a DailyInventory>,
    {
        records
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

/// Groups records by month. Records keep their relative order within a month;
/// iterate the map in reverse for newest month first.
pub fn group_by_month(records: Vec<DailyInventory>) -> BTreeMap<String, Vec<DailyInventory>> {
    let mut groups: BTreeMap<String, Vec<DailyInventory>> = BTreeMap::new();
    for record in records {
        groups.entry(month_key(record.date)).or_default().push(record);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InventoryEntry;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, quantity: Decimal, demand: Decimal) -> DailyInventory {
        DailyInventory::new(date, vec![InventoryEntry::new("kiwi", quantity, demand, date)])
    }

    #[test]
    fn long_date_is_german() {
        assert_eq!(german_long_date(date(2025, 3, 3)), "Montag, 3. März 2025");
        assert_eq!(german_month_label(date(2025, 3, 3)), "März 2025");
    }

    #[test]
    fn search_is_case_insensitive() {
        let r = record(date(2025, 3, 3), dec!(1), dec!(0));
        let filter = |s: &str| ArchiveFilter::new(Some(s.to_string()), None);
        assert!(filter("märz").matches(&r));
        assert!(filter("MONTAG").matches(&r));
        assert!(filter("2025-03-03").matches(&r));
        assert!(!filter("april").matches(&r));
        assert!(filter("  ").matches(&r));
    }

    #[test]
    fn product_filter_needs_activity() {
        let idle = record(date(2025, 3, 4), dec!(0), dec!(0));
        let demanded = record(date(2025, 3, 5), dec!(0), dec!(2));
        let filter = ArchiveFilter::new(None, Some("kiwi".into()));
        assert!(!filter.matches(&idle));
        assert!(filter.matches(&demanded));
        assert!(!ArchiveFilter::new(None, Some("mango".into())).matches(&demanded));
    }

    #[test]
    fn groups_by_year_and_month() {
        let records = vec![
            record(date(2025, 3, 5), dec!(1), dec!(0)),
            record(date(2025, 3, 1), dec!(1), dec!(0)),
            record(date(2025, 2, 28), dec!(1), dec!(0)),
        ];
        let groups = group_by_month(records);
        let keys: Vec<_> = groups.keys().rev().cloned().collect();
        assert_eq!(keys, ["2025-03", "2025-02"]);
        assert_eq!(groups["2025-03"].len(), 2);
        assert_eq!(groups["2025-03"][0].date, date(2025, 3, 5));
    }
}
