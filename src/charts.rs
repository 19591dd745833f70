use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::element::Pie;
use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::{count_by, mean_by};
use crate::store::BrandedRecord;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const TEAL: RGBColor = RGBColor(0, 128, 128);

const PALETTE: &[RGBColor] = &[
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

type Renderer = fn(&[BrandedRecord], &Path) -> Result<()>;

const CHARTS: &[(&str, Renderer)] = &[
    ("avg_price_by_fuel.png", avg_price_by_fuel),
    ("price_vs_km.png", price_vs_km),
    ("avg_price_by_brand.png", avg_price_by_brand),
    ("owner_distribution.png", owner_distribution),
    ("avg_price_by_transmission.png", avg_price_by_transmission),
    ("count_by_transmission.png", count_by_transmission),
];

/// Render all six charts into `dir`. Returns the files written.
pub fn render_all(records: &[BrandedRecord], dir: &Path) -> Result<Vec<PathBuf>> {
    if records.is_empty() {
        warn!("No rows to chart");
        return Ok(Vec::new());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(CHARTS.len());
    for (file, render) in CHARTS {
        let path = dir.join(file);
        render(records, &path).with_context(|| format!("Failed to render {}", path.display()))?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

pub fn avg_price_by_fuel(records: &[BrandedRecord], path: &Path) -> Result<()> {
    let bars = mean_by(records, |r| r.fuel.as_str());
    column_chart(
        path,
        (800, 600),
        "Average Price by Fuel Type",
        "Fuel Type",
        "Average Price (INR)",
        &bars,
        SKY_BLUE,
    )
}

pub fn price_vs_km(records: &[BrandedRecord], path: &Path) -> Result<()> {
    let max_km = records.iter().map(|r| r.km_driven).max().unwrap_or(0).max(1) as f64;
    let max_price = records.iter().map(|r| r.price).max().unwrap_or(0).max(1) as f64;

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Price vs KM Driven", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..max_km * 1.05, 0f64..max_price * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("KM Driven")
        .y_desc("Price (INR)")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    chart.draw_series(records.iter().map(|r| {
        Circle::new(
            (r.km_driven as f64, r.price as f64),
            4,
            BLUE.mix(0.7).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

pub fn avg_price_by_brand(records: &[BrandedRecord], path: &Path) -> Result<()> {
    let mut bars = mean_by(records, |r| r.brand.as_str());
    bars.sort_by(|a, b| b.1.total_cmp(&a.1));
    column_chart(
        path,
        (1200, 600),
        "Average Price by Brand",
        "Brand",
        "Average Price (INR)",
        &bars,
        LIGHT_GREEN,
    )
}

pub fn owner_distribution(records: &[BrandedRecord], path: &Path) -> Result<()> {
    let counts = count_by(records, |r| r.owner.as_str());
    if counts.is_empty() {
        warn!("No owner data, skipping {}", path.display());
        return Ok(());
    }

    let root = BitMapBackend::new(path, (600, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Distribution of Cars by Owner Type", ("sans-serif", 24))?;

    let (w, h) = root.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = w.min(h) as f64 * 0.35;

    let sizes: Vec<f64> = counts.iter().map(|(_, n)| *n as f64).collect();
    let labels: Vec<&str> = counts.iter().map(|(k, _)| k.as_str()).collect();
    let colors: Vec<RGBColor> = (0..counts.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    // 12 o'clock; wedge width is 40% of the radius
    pie.start_angle(-90.0);
    pie.donut_hole(radius * 0.6);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&BLACK));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

pub fn avg_price_by_transmission(records: &[BrandedRecord], path: &Path) -> Result<()> {
    let bars = mean_by(records, |r| r.transmission.as_str());
    column_chart(
        path,
        (800, 600),
        "Average Price by Transmission",
        "Transmission Type",
        "Average Price (INR)",
        &bars,
        ORANGE,
    )
}

pub fn count_by_transmission(records: &[BrandedRecord], path: &Path) -> Result<()> {
    let bars: Vec<(String, f64)> = count_by(records, |r| r.transmission.as_str())
        .into_iter()
        .map(|(k, n)| (k, n as f64))
        .collect();
    if bars.is_empty() {
        warn!("No transmission data, skipping {}", path.display());
        return Ok(());
    }
    let labels: Vec<&str> = bars.iter().map(|(k, _)| k.as_str()).collect();
    let max = axis_max(&bars);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Count of Cars by Transmission Type", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..max, (0..bars.len()).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Count of Cars")
        .y_desc("Transmission Type")
        .y_labels(bars.len())
        .y_label_formatter(&|v| segment_label(v, &labels))
        .x_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(TEAL.filled())
            .margin(10)
            .data(bars.iter().enumerate().map(|(i, (_, n))| (i, *n))),
    )?;

    root.present()?;
    Ok(())
}

fn column_chart(
    path: &Path,
    size: (u32, u32),
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    bars: &[(String, f64)],
    color: RGBColor,
) -> Result<()> {
    if bars.is_empty() {
        warn!("Nothing to plot for {}", path.display());
        return Ok(());
    }
    let labels: Vec<&str> = bars.iter().map(|(k, _)| k.as_str()).collect();
    let max = axis_max(bars);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d((0..bars.len()).into_segmented(), 0f64..max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(bars.len())
        .x_label_formatter(&|v| segment_label(v, &labels))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.filled())
            .margin(10)
            .data(bars.iter().enumerate().map(|(i, (_, v))| (i, *v))),
    )?;

    root.present()?;
    Ok(())
}

/// Upper bound for a value axis with 10% headroom; never zero-width.
fn axis_max(bars: &[(String, f64)]) -> f64 {
    bars.iter().map(|(_, v)| *v).fold(0.0, f64::max).max(1.0) * 1.1
}

fn segment_label(v: &SegmentValue<usize>, labels: &[&str]) -> String {
    match v {
        SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    }
}
