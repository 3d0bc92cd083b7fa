//! PNG charts for the monthly metrics table.
//!
//! Each chart is a pure function of the records and writes exactly one file,
//! overwriting any previous version. Text needs a TrueType font registered
//! with Plotters; without one the charts keep their series and gridlines but
//! lose captions, tick labels and legends.

use crate::{
    config::ChartConfig,
    error::{PipelineError, PipelineResult},
    histogram::{equal_width_bins, GaussianKde},
    metrics::MetricsRecord,
    types::month_label,
};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::OnceLock,
};

pub const REVENUE_VS_EXPENSES: &str = "revenue_vs_expenses.png";
pub const PROFIT_MARGIN_TREND: &str = "profit_margin_trend.png";
pub const REVENUE_PER_UNIT_HISTOGRAM: &str = "revenue_per_unit_histogram.png";
pub const PROFIT_BY_MONTH: &str = "profit_by_month.png";

const FONT_FAMILY: &str = "sans-serif";

// matplotlib's named colours, which Plotters' basic palette lacks.
const MPL_GREEN: RGBColor = RGBColor(0, 128, 0);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const GRID: RGBColor = RGBColor(220, 220, 220);

/// Horizontal gridlines drawn when no font is available.
const PLAIN_GRID_LINES: usize = 10;

/// Legend corner of the line chart; the y range leaves room above the data.
const LEGEND_POSITION: SeriesLabelPosition = SeriesLabelPosition::UpperRight;

type DrawResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Clone, Copy)]
struct Canvas {
    width: u32,
    height: u32,
    text: bool,
}

/// Render all four charts into `out_dir`. Returns the written paths.
pub fn render_all(
    records: &[MetricsRecord],
    config: &ChartConfig,
    out_dir: &Path,
) -> PipelineResult<Vec<PathBuf>> {
    let canvas = Canvas {
        width: config.width,
        height: config.height,
        text: ensure_font(&config.font_candidates),
    };

    let mut written = Vec::with_capacity(4);
    for name in [
        REVENUE_VS_EXPENSES,
        PROFIT_MARGIN_TREND,
        REVENUE_PER_UNIT_HISTOGRAM,
        PROFIT_BY_MONTH,
    ] {
        let path = out_dir.join(name);
        render_one(name, &path, records, config.histogram_bins, canvas)?;
        log::debug!("Chart written: {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn render_one(
    name: &str,
    path: &Path,
    records: &[MetricsRecord],
    bins: usize,
    canvas: Canvas,
) -> PipelineResult<()> {
    let chart_err = |message: String| PipelineError::Chart {
        chart: name.to_string(),
        message,
    };
    if records.is_empty() {
        return Err(chart_err("no rows to plot".to_string()));
    }

    let result = match name {
        REVENUE_VS_EXPENSES => draw_revenue_vs_expenses(path, records, canvas),
        PROFIT_MARGIN_TREND => draw_profit_margin_trend(path, records, canvas),
        REVENUE_PER_UNIT_HISTOGRAM => draw_revenue_per_unit_histogram(path, records, bins, canvas),
        PROFIT_BY_MONTH => draw_profit_by_month(path, records, canvas),
        other => return Err(chart_err(format!("unknown chart {other}"))),
    };
    result.map_err(|e| chart_err(e.to_string()))
}

/// Register the first readable font under the family the charts use.
/// Registration happens once per process; later calls reuse the outcome.
/// An empty candidate list always means text is off.
fn ensure_font(candidates: &[PathBuf]) -> bool {
    if candidates.is_empty() {
        log::warn!("No chart font candidates configured; charts will be drawn without text");
        return false;
    }
    static FONT_READY: OnceLock<bool> = OnceLock::new();
    *FONT_READY.get_or_init(|| {
        for path in candidates {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            // Plotters keeps registered font data for the life of the process.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
                log::debug!("Chart font: {}", path.display());
                return true;
            }
        }
        log::warn!("No usable chart font found; charts will be drawn without text");
        false
    })
}

// ── Line: revenue vs expenses ────────────────────────────────────

fn draw_revenue_vs_expenses(path: &Path, records: &[MetricsRecord], canvas: Canvas) -> DrawResult {
    let root = BitMapBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (y0, y1) = with_legend_headroom(padded_range(
        records.iter().flat_map(|r| [r.revenue, r.expenses]),
        false,
    ));
    let last = last_index(records);
    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(50).y_label_area_size(90);
    if canvas.text {
        builder.caption("Revenue vs Expenses Over Time", (FONT_FAMILY, 28));
    }
    let mut chart = builder.build_cartesian_2d(0..last, y0..y1)?;

    if canvas.text {
        let month_at = |i: &i32| month_tick(records, *i);
        let amount = |v: &f64| format!("{v:.0}");
        chart
            .configure_mesh()
            .x_desc("Month")
            .y_desc("Amount ($)")
            .x_labels(12)
            .x_label_formatter(&month_at)
            .y_label_formatter(&amount)
            .draw()?;
    } else {
        chart.draw_series(vertical_grid(last, y0, y1))?;
        chart.draw_series(horizontal_grid(0, last, y0, y1))?;
    }

    let revenue = chart.draw_series(LineSeries::new(
        finite_points(records, |r| r.revenue),
        BLUE.stroke_width(2),
    ))?;
    if canvas.text {
        revenue
            .label("Revenue")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    }

    let expenses = chart.draw_series(LineSeries::new(
        finite_points(records, |r| r.expenses),
        RED.stroke_width(2),
    ))?;
    if canvas.text {
        expenses
            .label("Expenses")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

        chart
            .configure_series_labels()
            .position(LEGEND_POSITION)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

// ── Area: profit margin ──────────────────────────────────────────

fn draw_profit_margin_trend(path: &Path, records: &[MetricsRecord], canvas: Canvas) -> DrawResult {
    let root = BitMapBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (y0, y1) = padded_range(records.iter().map(|r| r.profit_margin), true);
    let last = last_index(records);
    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(50).y_label_area_size(70);
    if canvas.text {
        builder.caption("Profit Margin Trend", (FONT_FAMILY, 28));
    }
    let mut chart = builder.build_cartesian_2d(0..last, y0..y1)?;

    if canvas.text {
        let month_at = |i: &i32| month_tick(records, *i);
        let percent = |v: &f64| format!("{v:.0}");
        chart
            .configure_mesh()
            .x_desc("Month")
            .y_desc("Profit Margin (%)")
            .x_labels(12)
            .x_label_formatter(&month_at)
            .y_label_formatter(&percent)
            .draw()?;
    } else {
        chart.draw_series(vertical_grid(last, y0, y1))?;
        chart.draw_series(horizontal_grid(0, last, y0, y1))?;
    }

    chart.draw_series(
        AreaSeries::new(finite_points(records, |r| r.profit_margin), 0.0, MPL_GREEN.mix(0.5))
            .border_style(MPL_GREEN),
    )?;

    root.present()?;
    Ok(())
}

// ── Histogram: revenue per unit ──────────────────────────────────

fn draw_revenue_per_unit_histogram(
    path: &Path,
    records: &[MetricsRecord],
    bins: usize,
    canvas: Canvas,
) -> DrawResult {
    let root = BitMapBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let values: Vec<f64> = records.iter().map(|r| r.revenue_per_unit).collect();
    let bins = equal_width_bins(&values, bins);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Err("no finite revenue-per-unit values".into());
    };
    let (x0, x1) = (first.start, last.end);

    // Density scaled to counts so both share the y axis.
    let sample_size = values.iter().filter(|v| v.is_finite()).count() as f64;
    let kde_curve = GaussianKde::fit(&values)
        .map(|kde| kde.curve(x0, x1, 200, sample_size * first.width()))
        .unwrap_or_default();

    let y_max = bins
        .iter()
        .map(|b| b.count as f64)
        .chain(kde_curve.iter().map(|&(_, y)| y))
        .fold(1.0, f64::max);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(50).y_label_area_size(60);
    if canvas.text {
        builder.caption("Revenue per Unit Distribution", (FONT_FAMILY, 28));
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, 0.0..y_max * 1.1)?;

    // No gridlines on the histogram, so the text-free variant has no mesh at all.
    if canvas.text {
        let dollars = |v: &f64| format!("{v:.0}");
        let counts = |v: &f64| count_label(*v);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc("Revenue per Unit ($)")
            .y_desc("Frequency")
            .x_label_formatter(&dollars)
            .y_label_formatter(&counts)
            .draw()?;
    }

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], PURPLE.mix(0.5).filled())
    }))?;
    chart.draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], PURPLE.stroke_width(1))
    }))?;
    if !kde_curve.is_empty() {
        chart.draw_series(LineSeries::new(kde_curve, PURPLE.stroke_width(2)))?;
    }

    root.present()?;
    Ok(())
}

// ── Bars: profit by month ────────────────────────────────────────

fn draw_profit_by_month(path: &Path, records: &[MetricsRecord], canvas: Canvas) -> DrawResult {
    let root = BitMapBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (y0, y1) = padded_range(records.iter().map(|r| r.profit), true);
    let mut builder = ChartBuilder::on(&root);
    builder.margin(20).x_label_area_size(90).y_label_area_size(90);
    if canvas.text {
        builder.caption("Profit by Month", (FONT_FAMILY, 28));
    }
    let mut chart = builder.build_cartesian_2d((0..last_index(records)).into_segmented(), y0..y1)?;

    // Horizontal gridlines only.
    if canvas.text {
        let month_at = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => month_tick(records, *i),
            SegmentValue::Last => String::new(),
        };
        let amount = |v: &f64| format!("{v:.0}");
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Month")
            .y_desc("Profit ($)")
            .x_labels(records.len())
            .x_label_formatter(&month_at)
            .x_label_style((FONT_FAMILY, 13).into_font().transform(FontTransform::Rotate90))
            .y_label_formatter(&amount)
            .draw()?;
    } else {
        chart.draw_series(horizontal_grid(SegmentValue::Exact(0), SegmentValue::Last, y0, y1))?;
    }

    chart.draw_series(
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.profit.is_finite())
            .map(|(i, r)| {
                let i = i as i32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), r.profit)],
                    ORANGE.filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }),
    )?;

    root.present()?;
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────

/// Right edge of the month axis. Never zero so a single month still
/// gets a non-empty range.
fn last_index(records: &[MetricsRecord]) -> i32 {
    (records.len() as i32 - 1).max(1)
}

fn finite_points(
    records: &[MetricsRecord],
    value: impl Fn(&MetricsRecord) -> f64,
) -> Vec<(i32, f64)> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| (i as i32, value(r)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

fn month_tick(records: &[MetricsRecord], index: i32) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| records.get(i))
        .map(|r| month_label(r.month))
        .unwrap_or_default()
}

/// Tick text for the frequency axis: whole counts only, so fractional
/// ticks on a short axis stay blank instead of rounding to duplicates.
fn count_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        String::new()
    }
}

/// Extra room above the data for the upper-corner legend.
fn with_legend_headroom((lo, hi): (f64, f64)) -> (f64, f64) {
    (lo, hi + (hi - lo) * 0.15)
}

/// Evenly spaced values strictly inside `(lo, hi)`.
fn grid_values(lo: f64, hi: f64, lines: usize) -> Vec<f64> {
    let step = (hi - lo) / (lines + 1) as f64;
    (1..=lines).map(|k| lo + step * k as f64).collect()
}

fn horizontal_grid<X: Clone>(x0: X, x1: X, y0: f64, y1: f64) -> Vec<PathElement<(X, f64)>> {
    grid_values(y0, y1, PLAIN_GRID_LINES)
        .into_iter()
        .map(|y| PathElement::new(vec![(x0.clone(), y), (x1.clone(), y)], GRID.stroke_width(1)))
        .collect()
}

fn vertical_grid(last: i32, y0: f64, y1: f64) -> Vec<PathElement<(i32, f64)>> {
    (0..=last)
        .map(|x| PathElement::new(vec![(x, y0), (x, y1)], GRID.stroke_width(1)))
        .collect()
}

/// Bounds of the finite values with 5% headroom on both sides.
/// `include_zero` stretches the range to the baseline for bars and areas.
fn padded_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}
