use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Datelike as _, NaiveDate};

use crate::chart;
use crate::config::{Config, ReportKind};
use crate::date_range::{micros_to_date, DateWindow};
use crate::events::{self, EventTimeRow, PurchaseRow};
use crate::table::DailyCounts;
use crate::warehouse::{self, SqlClient};

pub fn generate(
    client: &SqlClient,
    config: &Config,
    window: &DateWindow,
) -> anyhow::Result<PathBuf> {
    let events_table = warehouse::events_table(&config.warehouse.dataset);
    let bounds = warehouse::suffix_bounds(window);

    let sql = format!(
        "SELECT event_timestamp AS time, \
         (SELECT value.double_value FROM UNNEST(event_params) WHERE key='value') AS double_value, \
         (SELECT value.int_value FROM UNNEST(event_params) WHERE key='value') AS int_value, \
         (SELECT value.double_value FROM UNNEST(event_params) WHERE key='price') AS double_price, \
         (SELECT value.int_value FROM UNNEST(event_params) WHERE key='price') AS int_price \
         FROM {events_table} \
         WHERE event_name='ecommerce_purchase' \
         AND {bounds}",
    );
    let purchases: Vec<PurchaseRow> = client.rows(&sql)?;

    let sql = format!(
        "SELECT event_name AS event, event_timestamp AS time \
         FROM {events_table} \
         WHERE (event_name='session_start' OR event_name='ecommerce_purchase') \
         AND {bounds}",
    );
    let funnel: Vec<EventTimeRow> = client.rows(&sql)?;

    let mut revenue_per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for purchase in &purchases {
        if let Some(value) = events::resolve_revenue(purchase) {
            *revenue_per_day.entry(micros_to_date(purchase.time)).or_default() += value;
        }
    }

    let mut sessions_per_day = DailyCounts::new();
    let mut orders_per_day = DailyCounts::new();
    for row in &funnel {
        let date = micros_to_date(row.time);
        match row.event.as_str() {
            "session_start" => sessions_per_day.add(date),
            "ecommerce_purchase" => orders_per_day.add(date),
            _ => {}
        }
    }

    // only days with both sessions and orders yield a meaningful rate
    let dates: Vec<NaiveDate> =
        sessions_per_day.dates().filter(|date| orders_per_day.get(*date) > 0).collect();
    let labels: Vec<String> =
        dates.iter().map(|date| format!("{}/{}", date.month(), date.day())).collect();
    let revenue_millions: Vec<f64> = dates
        .iter()
        .map(|date| revenue_per_day.get(date).copied().unwrap_or(0.0) / 1_000_000.0)
        .collect();
    let orders: Vec<f64> = dates.iter().map(|date| orders_per_day.get(*date) as f64).collect();
    let rates: Vec<f64> = dates
        .iter()
        .map(|date| orders_per_day.get(*date) as f64 / sessions_per_day.get(*date) as f64)
        .collect();

    let mut csv = csv::Writer::from_path(config.table_path(ReportKind::DailyPurchase))?;
    csv.write_record(["date", "revenue_millions", "orders", "sessions", "conversion_rate"])?;
    for (index, date) in dates.iter().enumerate() {
        csv.write_record([
            date.to_string(),
            format!("{:.6}", revenue_millions[index]),
            orders_per_day.get(*date).to_string(),
            sessions_per_day.get(*date).to_string(),
            format!("{:.6}", rates[index]),
        ])?;
    }
    csv.flush()?;

    let chart_path = config.chart_path(ReportKind::DailyPurchase);
    chart::purchase_overview_chart(
        &chart_path,
        &format!("friDay App Daily Purchases ({})", window.title_span()),
        &labels,
        &revenue_millions,
        &orders,
        &rates,
    )?;
    Ok(chart_path)
}
