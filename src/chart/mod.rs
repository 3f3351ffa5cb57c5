//! Bar-chart rendering with Plotters' SVG backend.
//!
//! Rendering is split in two steps:
//! - `build_chart_spec`: sort, truncate, compose labels/title (pure)
//! - `render_spec`: draw a `ChartSpec` to a file using a read-only `ChartStyle`
//!
//! `render` runs both for one metric.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontTransform;
use tracing::debug;

use crate::domain::{ChartSpec, ChartStyle, LocationRecord, MetricKey, title_case};
use crate::error::CovidError;

/// Sort, truncate and chart `records` by `metric`, writing an SVG to `output_path`.
///
/// `scope_label` is the state whose counties are being charted; `None` means
/// the records are U.S. states. Any existing file at `output_path` is replaced.
pub fn render(
    records: &[LocationRecord],
    metric: MetricKey,
    scope_label: Option<&str>,
    output_path: &Path,
    style: &ChartStyle,
) -> Result<(), CovidError> {
    if records.is_empty() {
        return Err(CovidError::render(output_path, "no records to plot"));
    }
    let spec = build_chart_spec(records, metric, scope_label, style.max_bars);
    render_spec(&spec, output_path, style)
}

/// Order records by `metric` (descending, stable) and keep at most `max_bars`.
pub fn build_chart_spec(
    records: &[LocationRecord],
    metric: MetricKey,
    scope_label: Option<&str>,
    max_bars: usize,
) -> ChartSpec {
    let mut sorted: Vec<&LocationRecord> = records.iter().collect();
    // `sort_by` is stable: equal values keep their resource order.
    sorted.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));
    sorted.truncate(max_bars);

    let bars = sorted
        .iter()
        .map(|r| (r.location_name.clone(), metric.value(r)))
        .collect();

    let date = records.first().map(|r| r.date.as_str()).unwrap_or("");

    ChartSpec {
        metric,
        title: chart_title(metric, scope_label, date),
        y_label: metric.axis_label().to_string(),
        bars,
    }
}

/// `COVID-19 Cases in Texas Counties, New York Times (2021-01-01)`
pub fn chart_title(metric: MetricKey, scope_label: Option<&str>, date: &str) -> String {
    let scope = match scope_label {
        Some(state) => format!("{} Counties", title_case(state)),
        None => "U.S. States".to_string(),
    };
    format!(
        "COVID-19 {} in {scope}, New York Times ({date})",
        metric.display_name()
    )
}

/// Draw `spec` as a vertical bar chart.
pub fn render_spec(spec: &ChartSpec, output_path: &Path, style: &ChartStyle) -> Result<(), CovidError> {
    draw_bars(spec, output_path, style).map_err(|e| CovidError::render(output_path, e))?;
    debug!(path = %output_path.display(), bars = spec.bars.len(), "rendered chart");
    Ok(())
}

fn draw_bars(spec: &ChartSpec, output_path: &Path, style: &ChartStyle) -> Result<(), Box<dyn std::error::Error>> {
    let n = spec.bars.len().max(1) as u32;
    let y_max = spec
        .bars
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    // Headroom above the tallest bar; a flat-zero chart still needs a range.
    let y_top = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let root = SVGBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", style.title_font_size).into_font())
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.y_label_area)
        .build_cartesian_2d((0u32..n).into_segmented(), 0.0..y_top)?;

    let labels = &spec.bars;
    let metric = spec.metric;
    let x_label_font = ("sans-serif", style.label_font_size).into_font();
    let x_label_font = if style.rotate_x_labels {
        x_label_font.transform(FontTransform::Rotate90)
    } else {
        x_label_font
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(BLACK.mix(0.15))
        .y_desc(&spec.y_label)
        // One key point per segment boundary, so every bar gets its label.
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(idx) => labels
                .get(*idx as usize)
                .map(|(name, _)| name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|v| metric.format_value(*v))
        .x_label_style(x_label_font)
        .label_style(("sans-serif", style.label_font_size + 2).into_font())
        .axis_desc_style(("sans-serif", style.label_font_size + 4).into_font())
        .draw()?;

    let (r, g, b) = style.bar_rgb;
    let bar_color = RGBColor(r, g, b);

    chart.draw_series(spec.bars.iter().enumerate().map(|(idx, (_, value))| {
        let idx = idx as u32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(idx), 0.0),
                (SegmentValue::Exact(idx + 1), *value),
            ],
            bar_color.filled(),
        );
        bar.set_margin(0, 0, 2, 2);
        bar
    }))?;

    root.present()?;
    Ok(())
}
