use std::collections::BTreeMap;
use std::path::PathBuf;

use plotters::style::RGBColor;

use crate::chart::{self, Bar};
use crate::classify::{self, Store};
use crate::config::{Config, ReportKind};
use crate::date_range::DateWindow;
use crate::events::BannerRow;
use crate::table::CountTable;
use crate::warehouse::{self, SqlClient};

/// How many banner topics make the chart.
const TOP_N: usize = 30;

/// Brand colors per store.
fn store_color(store: Store) -> RGBColor {
    match store {
        Store::Friday => RGBColor(0xf3, 0x4f, 0x59),
        Store::Sogo => RGBColor(0xff, 0xa5, 0x00),
        Store::FarEastern => RGBColor(0x00, 0x4e, 0xa2),
        Store::Amart => RGBColor(0xd5, 0x00, 0x39),
        Store::CitySuper => RGBColor(0x27, 0x78, 0x1e),
        Store::Others => RGBColor(0x80, 0x80, 0x80),
    }
}

pub fn generate(
    client: &SqlClient,
    config: &Config,
    window: &DateWindow,
) -> anyhow::Result<PathBuf> {
    let sql = format!(
        "SELECT \
         (SELECT value.string_value FROM UNNEST(event_params) WHERE key='content') AS content \
         FROM {}, UNNEST(event_params) AS params \
         WHERE event_name='mt_home_banner_click' \
         AND params.key='content' \
         AND params.value.string_value LIKE '%anner@%' \
         AND {}",
        warehouse::events_table(&config.warehouse.dataset),
        warehouse::suffix_bounds(window),
    );
    let banners: Vec<BannerRow> = client.rows(&sql)?;

    let mut counts: BTreeMap<(String, Store), u64> = BTreeMap::new();
    for banner in &banners {
        let Some(content) = &banner.content else { continue };
        let Some(topic) = classify::banner_topic(content) else { continue };
        // untagged banners carry a literal "null" topic
        if topic == "null" {
            continue;
        }
        *counts.entry((topic.to_owned(), classify::banner_store(content))).or_default() += 1;
    }

    let mut table = CountTable::new();
    for ((topic, store), count) in &counts {
        table.add_count(topic, store.as_str(), *count);
    }
    let file = std::fs::File::create(config.table_path(ReportKind::BannerClicks))?;
    table.write_csv(file)?;

    // ascending by click count so the busiest topics end up at the top of
    // the chart; ties broken by topic for deterministic output
    let mut entries: Vec<(&str, Store, u64)> =
        counts.iter().map(|((topic, store), count)| (topic.as_str(), *store, *count)).collect();
    entries.sort_by(|a, b| a.2.cmp(&b.2).then(a.0.cmp(b.0)));
    let top = &entries[entries.len().saturating_sub(TOP_N)..];

    let bars: Vec<Bar> = top
        .iter()
        .map(|(topic, store, count)| Bar {
            label: (*topic).to_owned(),
            value: *count as f64,
            color: store_color(*store),
        })
        .collect();
    let legend: Vec<(String, RGBColor)> = {
        let mut stores: Vec<Store> = top.iter().map(|(_, store, _)| *store).collect();
        stores.sort();
        stores.dedup();
        stores.into_iter().map(|store| (store.as_str().to_owned(), store_color(store))).collect()
    };

    let chart_path = config.chart_path(ReportKind::BannerClicks);
    chart::hbar_chart(
        &chart_path,
        &format!("friDay App Home Banner Clicks Top {TOP_N} ({})", window.title_span()),
        "Click count",
        &bars,
        &legend,
    )?;
    Ok(chart_path)
}
