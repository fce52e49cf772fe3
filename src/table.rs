use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::NaiveDate;

/// Event counts keyed by (row label, column label), e.g. marketing category
/// by platform. BTreeMap-backed so that iteration and serialized output are
/// deterministic regardless of insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountTable {
    cells: BTreeMap<String, BTreeMap<String, u64>>,
    columns: BTreeSet<String>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, row: &str, column: &str) {
        self.add_count(row, column, 1);
    }

    pub fn add_count(&mut self, row: &str, column: &str, count: u64) {
        self.columns.insert(column.to_owned());
        *self.cells.entry(row.to_owned()).or_default().entry(column.to_owned()).or_default() +=
            count;
    }

    /// Overwrites a cell, used when appending externally computed rows such
    /// as the per-platform session totals.
    pub fn set(&mut self, row: &str, column: &str, count: u64) {
        self.columns.insert(column.to_owned());
        self.cells.entry(row.to_owned()).or_default().insert(column.to_owned(), count);
    }

    pub fn get(&self, row: &str, column: &str) -> u64 {
        self.cells.get(row).and_then(|cells| cells.get(column)).copied().unwrap_or(0)
    }

    pub fn row_total(&self, row: &str) -> u64 {
        self.cells.get(row).map(|cells| cells.values().sum()).unwrap_or(0)
    }

    pub fn column_total(&self, column: &str) -> u64 {
        self.cells.values().filter_map(|cells| cells.get(column)).sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Dumps the table as CSV with a leading label column. Every row emits a
    /// value for every known column, zero-filled.
    pub fn write_csv(&self, writer: impl Write) -> std::io::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header)?;
        for (row, _) in &self.cells {
            let mut record = vec![row.clone()];
            record.extend(self.columns.iter().map(|column| self.get(row, column).to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Per-calendar-day counters with ordered iteration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DailyCounts {
    counts: BTreeMap<NaiveDate, u64>,
}

impl DailyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, date: NaiveDate) {
        self.add_count(date, 1);
    }

    pub fn add_count(&mut self, date: NaiveDate, count: u64) {
        *self.counts.entry(date).or_default() += count;
    }

    pub fn get(&self, date: NaiveDate) -> u64 {
        self.counts.get(&date).copied().unwrap_or(0)
    }

    /// Removes the earliest `n` days. The session report discards the first
    /// days of its window because their data is incomplete.
    pub fn drop_leading_days(&mut self, n: usize) {
        let dates: Vec<NaiveDate> = self.counts.keys().take(n).copied().collect();
        for date in dates {
            self.counts.remove(&date);
        }
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.counts.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.counts.iter().map(|(date, count)| (*date, *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_does_not_affect_csv_bytes() {
        let mut forward = CountTable::new();
        forward.add("Ad banner", "ANDROID");
        forward.add("Ad banner", "IOS");
        forward.add("Coupon claim", "IOS");
        forward.add("Ad banner", "ANDROID");

        let mut backward = CountTable::new();
        backward.add("Coupon claim", "IOS");
        backward.add("Ad banner", "ANDROID");
        backward.add("Ad banner", "ANDROID");
        backward.add("Ad banner", "IOS");

        let mut left = Vec::new();
        let mut right = Vec::new();
        forward.write_csv(&mut left).unwrap();
        backward.write_csv(&mut right).unwrap();
        assert_eq!(left, right);
        assert!(!left.is_empty());
    }

    #[test]
    fn totals_and_zero_fill() {
        let mut table = CountTable::new();
        table.add_count("Search", "ANDROID", 3);
        table.add_count("Search", "IOS", 2);
        table.add_count("Add to cart", "ANDROID", 1);
        assert_eq!(table.row_total("Search"), 5);
        assert_eq!(table.column_total("ANDROID"), 4);
        // "Add to cart" never saw an IOS event but the column exists
        assert_eq!(table.get("Add to cart", "IOS"), 0);
        assert_eq!(table.row_total("nonexistent"), 0);
    }

    #[test]
    fn set_overwrites_instead_of_accumulating() {
        let mut table = CountTable::new();
        table.add_count("Session Start", "IOS", 5);
        table.set("Session Start", "IOS", 100);
        assert_eq!(table.get("Session Start", "IOS"), 100);
    }

    #[test]
    fn daily_counts_drop_leading_days() {
        let day = |d| NaiveDate::from_ymd_opt(2020, 6, d).unwrap();
        let mut counts = DailyCounts::new();
        for d in [3, 1, 2, 4] {
            counts.add_count(day(d), d as u64);
        }
        counts.drop_leading_days(2);
        assert_eq!(counts.dates().collect::<Vec<_>>(), vec![day(3), day(4)]);
        assert_eq!(counts.get(day(1)), 0);
        assert_eq!(counts.get(day(3)), 3);
        assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(day(3), 3), (day(4), 4)]);
    }
}
