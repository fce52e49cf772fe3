use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Datelike as _;
use plotters::style::colors::{BLUE, GREEN};

use crate::chart::{self, BarSeries};
use crate::config::{Config, ReportKind};
use crate::date_range::{micros_to_date, DateWindow};
use crate::events::SessionRow;
use crate::table::{CountTable, DailyCounts};
use crate::warehouse::{self, SqlClient};

/// The first two days of the window have incomplete session data, so they
/// are discarded before charting.
const INCOMPLETE_LEADING_DAYS: usize = 2;

pub fn generate(
    client: &SqlClient,
    config: &Config,
    window: &DateWindow,
) -> anyhow::Result<PathBuf> {
    let sql = format!(
        "SELECT user_pseudo_id AS id, event_timestamp AS ts \
         FROM {} \
         WHERE event_name='session_start' \
         AND {}",
        warehouse::events_table(&config.warehouse.dataset),
        warehouse::suffix_bounds(window),
    );
    let mut sessions: Vec<SessionRow> = client.rows(&sql)?;
    // ascending timestamp order, so the first occurrence of a device id is
    // its first launch
    sessions.sort_by_key(|row| row.ts);

    let mut all = DailyCounts::new();
    let mut first_launches = DailyCounts::new();
    let mut seen = HashSet::new();
    for row in &sessions {
        let date = micros_to_date(row.ts);
        all.add(date);
        if seen.insert(row.id.as_str()) {
            first_launches.add(date);
        }
    }
    all.drop_leading_days(INCOMPLETE_LEADING_DAYS);

    let mut table = CountTable::new();
    for date in all.dates() {
        table.set(&date.to_string(), "new", first_launches.get(date));
        table.set(&date.to_string(), "all", all.get(date));
    }
    let file = std::fs::File::create(config.table_path(ReportKind::DailySessions))?;
    table.write_csv(file)?;

    let labels: Vec<String> =
        all.dates().map(|date| format!("{}/{}", date.month(), date.day())).collect();
    let series = [
        BarSeries {
            label: "First launch".to_owned(),
            color: BLUE,
            values: all.dates().map(|date| first_launches.get(date) as f64).collect(),
        },
        BarSeries {
            label: "All sessions".to_owned(),
            color: GREEN,
            values: all.iter().map(|(_, count)| count as f64).collect(),
        },
    ];

    let chart_path = config.chart_path(ReportKind::DailySessions);
    chart::grouped_bar_chart(
        &chart_path,
        &format!("friDay App Daily Session Counts ({})", window.title_span()),
        &labels,
        &series,
    )?;
    Ok(chart_path)
}
