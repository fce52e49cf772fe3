use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tracing::info;

/// The five report types, one chart file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    DailySessions,
    HomeMarketing,
    Operations,
    DailyPurchase,
    BannerClicks,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::DailySessions,
        ReportKind::HomeMarketing,
        ReportKind::Operations,
        ReportKind::DailyPurchase,
        ReportKind::BannerClicks,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            ReportKind::DailySessions => "daily_session_chart",
            ReportKind::HomeMarketing => "home_marketing_chart",
            ReportKind::Operations => "operations_chart",
            ReportKind::DailyPurchase => "daily_purchase_chart",
            ReportKind::BannerClicks => "banner_summary",
        }
    }
}

/// Static run configuration, read once at startup. Every field has a
/// default matching the production layout, so a config file only needs to
/// spell out what differs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the chart PNGs and table CSVs are written into.
    pub charts_dir: PathBuf,
    pub warehouse: WarehouseConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Query endpoint: accepts a POSTed SQL string, returns JSON rows.
    pub endpoint: String,
    /// Analytics dataset holding the daily `events_YYYYMMDD` tables.
    pub dataset: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub recipients: Vec<String>,
    /// Linked from the digest body for the full event summary.
    pub dashboard_url: String,
    /// The subset of reports whose charts are inlined into the digest.
    pub mailed_reports: Vec<ReportKind>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            charts_dir: PathBuf::from("charts"),
            warehouse: WarehouseConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://warehouse.internal/api/v1/query".to_owned(),
            dataset: "analytics_178973991".to_owned(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_owned(),
            smtp_port: 465,
            sender: "app.reports.bot@gmail.com".to_owned(),
            recipients: vec!["noel_chiang@friday.tw".to_owned()],
            dashboard_url: "https://mytesthosting20200630.firebaseapp.com".to_owned(),
            mailed_reports: vec![ReportKind::DailyPurchase, ReportKind::BannerClicks],
        }
    }
}

impl Config {
    /// Reads the config file if one was given, otherwise uses the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("error opening config file {}", path.display()))?;
                let config = serde_json::from_reader(file)
                    .with_context(|| format!("error parsing config file {}", path.display()))?;
                info!("loaded config from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn chart_path(&self, kind: ReportKind) -> PathBuf {
        self.charts_dir.join(format!("{}.png", kind.file_stem()))
    }

    pub fn table_path(&self, kind: ReportKind) -> PathBuf {
        self.charts_dir.join(format!("{}.csv", kind.file_stem()))
    }

    pub fn mailed_chart_paths(&self) -> Vec<PathBuf> {
        self.mail.mailed_reports.iter().map(|kind| self.chart_path(*kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_match_the_chart_layout() {
        let config = Config::default();
        assert_eq!(
            config.chart_path(ReportKind::DailySessions),
            PathBuf::from("charts/daily_session_chart.png")
        );
        assert_eq!(
            config.table_path(ReportKind::BannerClicks),
            PathBuf::from("charts/banner_summary.csv")
        );
        assert_eq!(
            config.mailed_chart_paths(),
            vec![
                PathBuf::from("charts/daily_purchase_chart.png"),
                PathBuf::from("charts/banner_summary.png"),
            ]
        );
    }

    #[test]
    fn partial_config_files_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "charts_dir": "/tmp/out",
                "mail": { "recipients": ["a@example.com", "b@example.com"] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.charts_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.mail.recipients, vec!["a@example.com", "b@example.com"]);
        // untouched sections keep their defaults
        assert_eq!(config.mail.smtp_port, 465);
        assert_eq!(config.warehouse.dataset, "analytics_178973991");
    }
}
