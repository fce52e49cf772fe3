use std::path::PathBuf;

use plotters::style::colors::{GREEN, YELLOW};
use plotters::style::RGBColor;

use crate::chart::{self, Bar, Panel};
use crate::classify::{self, SearchSource};
use crate::config::{Config, ReportKind};
use crate::date_range::DateWindow;
use crate::events::{OperationRow, SearchRow};
use crate::table::CountTable;
use crate::warehouse::{self, SqlClient};

/// Excluded from the per-session rate panels: session_start is the
/// denominator, and the view_item / checkout_progress counts are known to
/// be unreliable in the source data.
const EXCLUDED_FROM_RATES: &[&str] = &["session_start", "view_item", "checkout_progress"];

const SOURCE_PALETTE: &[RGBColor] = &[
    RGBColor(0xb3, 0xe2, 0xcd),
    RGBColor(0xfd, 0xcd, 0xac),
    RGBColor(0xcb, 0xd5, 0xe8),
    RGBColor(0xf4, 0xca, 0xe4),
];

pub fn generate(
    client: &SqlClient,
    config: &Config,
    window: &DateWindow,
) -> anyhow::Result<PathBuf> {
    let events_table = warehouse::events_table(&config.warehouse.dataset);
    let bounds = warehouse::suffix_bounds(window);

    let sql = format!(
        "SELECT platform, \
         (SELECT value.string_value FROM UNNEST(event_params) WHERE key='content') AS content \
         FROM {events_table}, UNNEST(event_params) AS params \
         WHERE event_name='UIOperation' \
         AND params.key='content' \
         AND params.value.string_value LIKE '%search_use%' \
         AND {bounds}",
    );
    let searches: Vec<SearchRow> = client.rows(&sql)?;

    let sql = format!(
        "SELECT event_name AS event, platform \
         FROM {events_table} \
         WHERE (event_name='ecommerce_purchase' \
         OR event_name='view_item' \
         OR event_name='search' \
         OR event_name='checkout_progress' \
         OR event_name='begin_check' \
         OR event_name='add_to_cart' \
         OR event_name='session_start') \
         AND {bounds}",
    );
    let operations: Vec<OperationRow> = client.rows(&sql)?;

    let mut operation_counts = CountTable::new();
    for operation in &operations {
        operation_counts.add(&operation.event, &operation.platform);
    }

    let mut search_counts = CountTable::new();
    for search in &searches {
        let Some(content) = &search.content else { continue };
        search_counts.add(classify::search_source(content).as_str(), &search.platform);
    }
    // keyboard searches leave no payload marker; they are whatever remains
    // of the funnel's search count after the marked sources are taken out
    let platforms: Vec<String> = operation_counts.columns().map(str::to_owned).collect();
    for platform in &platforms {
        let total = operation_counts.get("search", platform);
        let classified = search_counts.column_total(platform);
        search_counts.set(
            SearchSource::Keyboard.as_str(),
            platform,
            total.saturating_sub(classified),
        );
    }

    let file = std::fs::File::create(config.table_path(ReportKind::Operations))?;
    operation_counts.write_csv(file)?;

    let rate_bars = |platform: &str, color: RGBColor| -> Vec<Bar> {
        let sessions = operation_counts.get("session_start", platform).max(1) as f64;
        operation_counts
            .rows()
            .filter(|event| !EXCLUDED_FROM_RATES.contains(event))
            .map(|event| Bar {
                label: classify::operation_label(event).to_owned(),
                value: operation_counts.get(event, platform) as f64 / sessions,
                color,
            })
            .collect()
    };
    let source_bars = |platform: &str| -> Vec<Bar> {
        search_counts
            .rows()
            .enumerate()
            .map(|(index, source)| Bar {
                label: source.to_owned(),
                value: search_counts.get(source, platform) as f64,
                color: SOURCE_PALETTE[index % SOURCE_PALETTE.len()],
            })
            .collect()
    };

    let android = platforms.first().map(String::as_str).unwrap_or("ANDROID");
    let ios = platforms.get(1).map(String::as_str).unwrap_or("IOS");
    let panels = [
        Panel {
            title: format!("Events per session - {android}"),
            x_desc: "Event count / Session count".to_owned(),
            bars: rate_bars(android, GREEN),
            show_values: true,
        },
        Panel {
            title: format!("Events per session - {ios}"),
            x_desc: "Event count / Session count".to_owned(),
            bars: rate_bars(ios, YELLOW),
            show_values: true,
        },
        Panel {
            title: format!("Search sources - {android}"),
            x_desc: "Search count".to_owned(),
            bars: source_bars(android),
            show_values: false,
        },
        Panel {
            title: format!("Search sources - {ios}"),
            x_desc: "Search count".to_owned(),
            bars: source_bars(ios),
            show_values: false,
        },
    ];

    let chart_path = config.chart_path(ReportKind::Operations);
    chart::quad_hbar_chart(
        &chart_path,
        &format!("friDay App Operation Events ({})", window.title_span()),
        &panels,
    )?;
    Ok(chart_path)
}
