use chrono::{DateTime, Datelike as _, Duration, NaiveDate, Utc};

/// An inclusive pair of calendar-day boundaries in the warehouse's
/// daily-table suffix format (`YYYYMMDD`, zero-padded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub start: String,
    pub end: String,
}

impl DateWindow {
    /// Builds a window from optional explicit boundaries. The end defaults
    /// to now, the start to 30 days before the end. Boundaries are ordered
    /// so that `start <= end` always holds.
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        let end = end.unwrap_or_else(Utc::now);
        let start = start.unwrap_or_else(|| end - Duration::days(30));
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self { start: suffix_date(start), end: suffix_date(end) }
    }

    /// The `YYYY/MM/DD~YYYY/MM/DD` string embedded in chart titles.
    pub fn title_span(&self) -> String {
        format!(
            "{}/{}/{}~{}/{}/{}",
            &self.start[..4],
            &self.start[4..6],
            &self.start[6..],
            &self.end[..4],
            &self.end[4..6],
            &self.end[6..],
        )
    }
}

fn suffix_date(time: DateTime<Utc>) -> String {
    format!("{:04}{:02}{:02}", time.year(), time.month(), time.day())
}

/// Event timestamps come from the warehouse as microseconds since the Unix
/// epoch; charts bucket them by calendar day.
pub fn micros_to_date(ts: i64) -> NaiveDate {
    DateTime::from_timestamp_micros(ts).unwrap_or(DateTime::UNIX_EPOCH).date_naive()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn explicit_range_is_zero_padded() {
        let window = DateWindow::new(Some(utc(2020, 6, 6)), Some(utc(2020, 7, 1)));
        assert_eq!(window.start, "20200606");
        assert_eq!(window.end, "20200701");
    }

    #[test]
    fn omitted_start_defaults_to_thirty_days_before_end() {
        let window = DateWindow::new(None, Some(utc(2020, 7, 1)));
        assert_eq!(window.start, "20200601");
        assert_eq!(window.end, "20200701");
    }

    #[test]
    fn omitted_end_defaults_to_today() {
        let window = DateWindow::new(None, None);
        assert_eq!(window.end, suffix_date(Utc::now()));
        assert!(window.start <= window.end);
        assert_eq!(window.start.len(), 8);
        assert_eq!(window.end.len(), 8);
    }

    #[test]
    fn reversed_boundaries_are_reordered() {
        let window = DateWindow::new(Some(utc(2020, 7, 1)), Some(utc(2020, 6, 6)));
        assert_eq!(window.start, "20200606");
        assert_eq!(window.end, "20200701");
    }

    #[test]
    fn title_span_format() {
        let window = DateWindow::new(Some(utc(2020, 6, 6)), Some(utc(2020, 7, 1)));
        assert_eq!(window.title_span(), "2020/06/06~2020/07/01");
    }

    #[test]
    fn micros_timestamps_bucket_by_day() {
        // 2020-06-06 00:00:00 UTC in microseconds
        assert_eq!(
            micros_to_date(1_591_401_600_000_000),
            NaiveDate::from_ymd_opt(2020, 6, 6).unwrap()
        );
    }
}
