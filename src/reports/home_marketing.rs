use std::path::PathBuf;

use plotters::style::RGBColor;

use crate::chart::{self, BarSeries};
use crate::classify;
use crate::config::{Config, ReportKind};
use crate::date_range::DateWindow;
use crate::events::{MarketingRow, SessionCountRow};
use crate::table::CountTable;
use crate::warehouse::{self, SqlClient};

/// The denominator row appended below the category counts.
const SESSION_ROW: &str = "Session Start";

/// One color per platform column.
const PLATFORM_PALETTE: &[RGBColor] = &[
    RGBColor(0x7f, 0xc9, 0x7f),
    RGBColor(0xbe, 0xae, 0xd4),
    RGBColor(0xfd, 0xc0, 0x86),
    RGBColor(0xff, 0xff, 0x99),
];

pub fn generate(
    client: &SqlClient,
    config: &Config,
    window: &DateWindow,
) -> anyhow::Result<PathBuf> {
    let events_table = warehouse::events_table(&config.warehouse.dataset);
    let bounds = warehouse::suffix_bounds(window);

    let sql = format!(
        "SELECT event_name AS event, platform, \
         (SELECT value.string_value FROM UNNEST(event_params) WHERE key='content') AS content \
         FROM {events_table} \
         WHERE (event_name='mt_home_promo_click' \
         OR event_name='mt_home_banner_click' \
         OR event_name='mt_home_product_click') \
         AND {bounds}",
    );
    let clicks: Vec<MarketingRow> = client.rows(&sql)?;

    let sql = format!(
        "SELECT COUNT(event_name) AS count, platform \
         FROM {events_table} \
         WHERE event_name='session_start' \
         AND {bounds} \
         GROUP BY platform",
    );
    let sessions: Vec<SessionCountRow> = client.rows(&sql)?;

    let mut table = CountTable::new();
    for click in &clicks {
        // rows without a content payload carry no category signal
        let Some(content) = &click.content else { continue };
        let category = classify::marketing_category(&click.event, content);
        table.add(category.as_str(), &click.platform);
    }
    for row in &sessions {
        table.set(SESSION_ROW, &row.platform, row.count);
    }

    let file = std::fs::File::create(config.table_path(ReportKind::HomeMarketing))?;
    table.write_csv(file)?;

    let total_sessions: f64 =
        sessions.iter().map(|row| row.count as f64).sum::<f64>().max(1.0);
    let row_labels: Vec<String> = table.rows().map(str::to_owned).collect();
    let platforms: Vec<String> = table.columns().map(str::to_owned).collect();
    let series: Vec<BarSeries> = platforms
        .iter()
        .enumerate()
        .map(|(index, platform)| BarSeries {
            label: platform.clone(),
            color: PLATFORM_PALETTE[index % PLATFORM_PALETTE.len()],
            values: row_labels.iter().map(|row| table.get(row, platform) as f64).collect(),
        })
        .collect();
    // each category annotated with its share of all sessions
    let annotations: Vec<String> = row_labels
        .iter()
        .map(|row| {
            if row == SESSION_ROW {
                String::new()
            } else {
                format!("{:.2}% of sessions", table.row_total(row) as f64 / total_sessions * 100.0)
            }
        })
        .collect();

    let chart_path = config.chart_path(ReportKind::HomeMarketing);
    chart::stacked_hbar_chart(
        &chart_path,
        &format!("friDay App Home Marketing Clicks ({})", window.title_span()),
        "Event count",
        &row_labels,
        &series,
        &annotations,
    )?;
    Ok(chart_path)
}
