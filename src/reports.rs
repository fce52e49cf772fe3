//! The five report generators. Each one queries the warehouse, reshapes the
//! rows into a deterministic aggregate table, writes the table as a CSV
//! sidecar, and renders the chart PNG at its configured path.

use std::path::PathBuf;

use tracing::info;

use crate::config::{Config, ReportKind};
use crate::date_range::DateWindow;
use crate::warehouse::SqlClient;

pub mod banner_clicks;
pub mod daily_purchase;
pub mod daily_sessions;
pub mod home_marketing;
pub mod operations;

pub fn generate(
    kind: ReportKind,
    client: &SqlClient,
    config: &Config,
    window: &DateWindow,
) -> anyhow::Result<PathBuf> {
    match kind {
        ReportKind::DailySessions => daily_sessions::generate(client, config, window),
        ReportKind::HomeMarketing => home_marketing::generate(client, config, window),
        ReportKind::Operations => operations::generate(client, config, window),
        ReportKind::DailyPurchase => daily_purchase::generate(client, config, window),
        ReportKind::BannerClicks => banner_clicks::generate(client, config, window),
    }
}

/// Runs every report in order. The first failure aborts the run; charts
/// rendered before the failure stay on disk.
pub fn generate_all(
    client: &SqlClient,
    config: &Config,
    window: &DateWindow,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&config.charts_dir)?;
    let mut charts = Vec::new();
    for kind in ReportKind::ALL {
        let chart = generate(kind, client, config, window)?;
        info!("rendered {} to {}", kind.file_stem(), chart.display());
        charts.push(chart);
    }
    Ok(charts)
}
