//! Chart rendering on top of plotters. Every report renders into a
//! fixed-size PNG that is overwritten on each run; titles carry the date
//! window so a stale chart is recognizable at a glance.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

/// One bar of a horizontal bar panel.
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

/// One series of a grouped or stacked bar chart, with a value per x bucket.
pub struct BarSeries {
    pub label: String,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

/// One quadrant of the four-panel operations figure.
pub struct Panel {
    pub title: String,
    pub x_desc: String,
    pub bars: Vec<Bar>,
    pub show_values: bool,
}

fn max_or_one(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(1.0_f64, f64::max)
}

/// Vertical bars grouped per x bucket, one group member per series.
pub fn grouped_bar_chart(
    path: &Path,
    title: &str,
    x_labels: &[String],
    series: &[BarSeries],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (1280, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let buckets = x_labels.len().max(1);
    let y_max = max_or_one(series.iter().flat_map(|s| s.values.iter().copied())) * 1.2;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..buckets as f64, 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(buckets)
        .x_label_formatter(&|x: &f64| {
            if *x < 0.0 {
                return String::new();
            }
            x_labels.get(x.round() as usize).cloned().unwrap_or_default()
        })
        .draw()?;

    let bar_width = 0.8 / series.len().max(1) as f64;
    for (index, one) in series.iter().enumerate() {
        let color = one.color;
        let offset = 0.1 + index as f64 * bar_width;
        chart
            .draw_series(one.values.iter().enumerate().map(|(bucket, value)| {
                let x0 = bucket as f64 + offset;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, *value)], color.filled())
            }))?
            .label(one.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn draw_hbars(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    x_desc: &str,
    bars: &[Bar],
    legend: &[(String, RGBColor)],
    show_values: bool,
) -> anyhow::Result<()> {
    let rows = bars.len().max(1);
    let x_max = max_or_one(bars.iter().map(|bar| bar.value)) * 1.3;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(130)
        .build_cartesian_2d(0f64..x_max, 0f64..rows as f64)?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows)
        .y_label_formatter(&|y: &f64| {
            if *y < 0.0 {
                return String::new();
            }
            bars.get(y.round() as usize).map(|bar| bar.label.clone()).unwrap_or_default()
        })
        .x_desc(x_desc)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(row, bar)| {
        Rectangle::new(
            [(0.0, row as f64 + 0.25), (bar.value, row as f64 + 0.75)],
            bar.color.filled(),
        )
    }))?;
    if show_values {
        chart.draw_series(bars.iter().enumerate().map(|(row, bar)| {
            Text::new(
                format!("{:.2}", bar.value),
                (bar.value + x_max * 0.01, row as f64 + 0.4),
                ("sans-serif", 15),
            )
        }))?;
    }

    for (name, color) in legend {
        let color = *color;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(0.0, 0.0), (0.0, 0.0)],
                color.filled(),
            )))?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    if !legend.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

/// A single horizontal bar chart with per-bar colors and a manual legend.
pub fn hbar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    bars: &[Bar],
    legend: &[(String, RGBColor)],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (1280, 960)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_hbars(&root, title, x_desc, bars, legend, false)?;
    root.present()?;
    Ok(())
}

/// Horizontal bars stacked per row, one segment per series, with a free-text
/// annotation at the end of each row (used for percentage-of-sessions).
pub fn stacked_hbar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    row_labels: &[String],
    series: &[BarSeries],
    annotations: &[String],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (1280, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let rows = row_labels.len().max(1);
    let totals: Vec<f64> = (0..row_labels.len())
        .map(|row| series.iter().map(|s| s.values.get(row).copied().unwrap_or(0.0)).sum())
        .collect();
    let x_max = max_or_one(totals.iter().copied()) * 1.45;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(150)
        .build_cartesian_2d(0f64..x_max, 0f64..rows as f64)?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows)
        .y_label_formatter(&|y: &f64| {
            if *y < 0.0 {
                return String::new();
            }
            row_labels.get(y.round() as usize).cloned().unwrap_or_default()
        })
        .x_desc(x_desc)
        .draw()?;

    let mut offsets = vec![0.0_f64; row_labels.len()];
    for one in series {
        let color = one.color;
        let segments: Vec<(f64, f64)> = offsets
            .iter()
            .zip(one.values.iter().chain(std::iter::repeat(&0.0)))
            .map(|(offset, value)| (*offset, *value))
            .collect();
        chart
            .draw_series(segments.iter().enumerate().map(|(row, (offset, value))| {
                Rectangle::new(
                    [(*offset, row as f64 + 0.3), (offset + value, row as f64 + 0.7)],
                    color.filled(),
                )
            }))?
            .label(one.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        for (offset, (_, value)) in offsets.iter_mut().zip(segments) {
            *offset += value;
        }
    }

    chart.draw_series(annotations.iter().enumerate().map(|(row, text)| {
        Text::new(
            text.clone(),
            (totals.get(row).copied().unwrap_or(0.0) + x_max * 0.01, row as f64 + 0.4),
            ("sans-serif", 16),
        )
    }))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// The four-quadrant figure: one horizontal bar panel per quadrant.
pub fn quad_hbar_chart(path: &Path, title: &str, panels: &[Panel; 4]) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (1280, 1280)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, ("sans-serif", 30))?;
    let areas = root.split_evenly((2, 2));
    for (area, panel) in areas.iter().zip(panels.iter()) {
        draw_hbars(area, &panel.title, &panel.x_desc, &panel.bars, &[], panel.show_values)?;
    }
    root.present()?;
    Ok(())
}

/// The daily purchase figure: revenue bars with the conversion rate on a
/// secondary percentage axis, and order-count bars in a lower panel.
pub fn purchase_overview_chart(
    path: &Path,
    title: &str,
    x_labels: &[String],
    revenue: &[f64],
    orders: &[f64],
    rates: &[f64],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (1280, 960)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(580);

    let buckets = x_labels.len().max(1);
    let x_formatter = |x: &f64| {
        if *x < 0.0 {
            return String::new();
        }
        x_labels.get(x.round() as usize).cloned().unwrap_or_default()
    };

    let revenue_max = max_or_one(revenue.iter().copied()) * 1.2;
    let rate_max = max_or_one(rates.iter().copied()) * 1.2;
    let mut chart = ChartBuilder::on(&upper)
        .caption(title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .right_y_label_area_size(80)
        .build_cartesian_2d(0f64..buckets as f64, 0f64..revenue_max)?
        .set_secondary_coord(0f64..buckets as f64, 0f64..rate_max);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(buckets)
        .x_label_formatter(&x_formatter)
        .y_desc("Revenue (millions)")
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Conversion rate (checkouts / sessions)")
        .y_label_formatter(&|rate: &f64| format!("{:.2}%", rate * 100.0))
        .draw()?;

    chart
        .draw_series(revenue.iter().enumerate().map(|(bucket, value)| {
            Rectangle::new(
                [(bucket as f64 + 0.2, 0.0), (bucket as f64 + 0.8, *value)],
                GREEN.filled(),
            )
        }))?
        .label("Revenue")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], GREEN.filled()));
    chart
        .draw_secondary_series(LineSeries::new(
            rates.iter().enumerate().map(|(bucket, rate)| (bucket as f64 + 0.5, *rate)),
            RED.stroke_width(2),
        ))?
        .label("Conversion rate")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED.stroke_width(2)));
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    let orders_max = max_or_one(orders.iter().copied()) * 1.2;
    let mut orders_chart = ChartBuilder::on(&lower)
        .caption("Orders per day", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..buckets as f64, 0f64..orders_max)?;
    orders_chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(buckets)
        .x_label_formatter(&x_formatter)
        .y_desc("Orders")
        .draw()?;
    orders_chart.draw_series(orders.iter().enumerate().map(|(bucket, value)| {
        Rectangle::new([(bucket as f64 + 0.2, 0.0), (bucket as f64 + 0.8, *value)], CYAN.filled())
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_bars_render_to_a_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.png");
        let labels = vec!["6/1".to_owned(), "6/2".to_owned(), "6/3".to_owned()];
        let series = vec![
            BarSeries { label: "First launch".to_owned(), color: BLUE, values: vec![3.0, 1.0, 2.0] },
            BarSeries { label: "All sessions".to_owned(), color: GREEN, values: vec![9.0, 7.0, 8.0] },
        ];
        grouped_bar_chart(&path, "Daily sessions (2020/06/01~2020/06/03)", &labels, &series)
            .unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn horizontal_bars_render_with_a_manual_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banners.png");
        let bars = vec![
            Bar { label: "暑期特賣".to_owned(), value: 4.0, color: RED },
            Bar { label: "週年慶".to_owned(), value: 9.0, color: BLUE },
        ];
        let legend = vec![("friDay".to_owned(), RED), ("SOGO".to_owned(), BLUE)];
        hbar_chart(&path, "Banner clicks", "Click count", &bars, &legend).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn stacked_bars_render_with_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marketing.png");
        let rows = vec!["Ad banner".to_owned(), "Coupon claim".to_owned()];
        let series = vec![
            BarSeries { label: "ANDROID".to_owned(), color: GREEN, values: vec![5.0, 2.0] },
            BarSeries { label: "IOS".to_owned(), color: BLUE, values: vec![3.0, 4.0] },
        ];
        let annotations = vec!["1.23% of sessions".to_owned(), "0.45% of sessions".to_owned()];
        stacked_hbar_chart(&path, "Marketing clicks", "Event count", &rows, &series, &annotations)
            .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn quad_figure_renders_all_four_panels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operations.png");
        let panels: [Panel; 4] = std::array::from_fn(|index| Panel {
            title: format!("Panel {index}"),
            x_desc: "Count".to_owned(),
            bars: vec![
                Bar { label: "Search".to_owned(), value: 2.0, color: GREEN },
                Bar { label: "Add to cart".to_owned(), value: 0.5, color: GREEN },
            ],
            show_values: index < 2,
        });
        quad_hbar_chart(&path, "Operation events", &panels).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn empty_inputs_still_render_valid_files() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("no_bars.png");
        hbar_chart(&path, "No data", "Click count", &[], &[]).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let path = dir.path().join("no_groups.png");
        grouped_bar_chart(&path, "No data", &[], &[]).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn purchase_overview_renders_with_secondary_axis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purchase.png");
        let labels = vec!["6/1".to_owned(), "6/2".to_owned()];
        purchase_overview_chart(
            &path,
            "Daily purchases",
            &labels,
            &[1.5, 2.5],
            &[12.0, 20.0],
            &[0.01, 0.02],
        )
        .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
