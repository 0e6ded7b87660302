use std::path::Path;

use eyre::{Result, eyre};
use plotters::{
    coord::{Shift, ranged1d::Ranged},
    drawing::DrawingAreaErrorKind,
    element::DashedPathElement,
    prelude::*,
};
use plotters_backend::DrawingBackend;

use crate::plot::ChartSpec;

/// Matplotlib's tab10 cycle
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const FONT: &str = "sans-serif";
const TITLE_FONT_SIZE: u32 = 22;
const AXIS_LABEL_FONT_SIZE: u32 = 16;
const TICK_LABEL_FONT_SIZE: u32 = 13;
const GRID_COLOR: RGBColor = RGBColor(190, 190, 190);
const GRID_POINTS: usize = 12;
const GRID_DASH: u32 = 4;
const GRID_GAP: u32 = 3;
const MARKER_SIZE: u32 = 4;

/// Power-of-two bracket around every x value of the chart
pub fn x_bounds(chart: &ChartSpec) -> (f64, f64) {
    let Some((min, max)) = bounds(chart, |p| p.0) else {
        return (1.0, 2.0);
    };
    let lo = min.log2().floor().exp2();
    let hi = max.log2().ceil().exp2();
    if lo == hi { (lo / 2.0, hi * 2.0) } else { (lo, hi) }
}

/// Metric range padded by 5%, flat ranges are opened up so the line is visible
pub fn y_bounds(chart: &ChartSpec) -> (f64, f64) {
    let Some((min, max)) = bounds(chart, |p| p.1) else {
        return (0.0, 1.0);
    };
    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else if max != 0.0 {
        max.abs() * 0.05
    } else {
        1.0
    };
    (min - pad, max + pad)
}

fn bounds(chart: &ChartSpec, axis: fn(&(f64, f64)) -> f64) -> Option<(f64, f64)> {
    chart
        .series
        .iter()
        .flat_map(|series| series.points.iter().map(axis))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
        })
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Draws a chart onto any drawing area: log2 x axis, dashed grid, one line
/// with circle markers per series and a legend in series order.
pub fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartSpec,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (x_min, x_max) = x_bounds(chart);
    let (y_min, y_max) = y_bounds(chart);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, TITLE_FONT_SIZE))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((x_min..x_max).log_scale().base(2.0), y_min..y_max)?;

    ctx.configure_mesh()
        .disable_mesh()
        .x_labels(GRID_POINTS)
        .y_labels(GRID_POINTS)
        .x_label_formatter(&|x| format_tick(*x))
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style((FONT, AXIS_LABEL_FONT_SIZE))
        .label_style((FONT, TICK_LABEL_FONT_SIZE))
        .draw()?;

    let x_ticks = ctx.as_coord_spec().x_spec().key_points(GRID_POINTS);
    let y_ticks = ctx.as_coord_spec().y_spec().key_points(GRID_POINTS);
    let grid = GRID_COLOR.stroke_width(1);
    ctx.draw_series(x_ticks.into_iter().map(|x| {
        DashedPathElement::new(vec![(x, y_min), (x, y_max)], GRID_DASH, GRID_GAP, grid)
    }))?;
    ctx.draw_series(y_ticks.into_iter().map(|y| {
        DashedPathElement::new(vec![(x_min, y), (x_max, y)], GRID_DASH, GRID_GAP, grid)
    }))?;

    for (idx, series) in chart.series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        ctx.draw_series(LineSeries::new(
            series.points.iter().copied(),
            color.stroke_width(2),
        ))?
        .label(series.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x - 10, y), (x + 10, y)], color.stroke_width(2))
        });
        ctx.draw_series(
            series
                .points
                .iter()
                .map(|&point| Circle::new(point, MARKER_SIZE, color.filled())),
        )?;
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, TICK_LABEL_FONT_SIZE))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .draw()?;
    Ok(())
}

/// Renders a chart to a PNG file, the bitmap is released before returning
pub fn save_png(path: &Path, chart: &ChartSpec, size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    draw_line_chart(&root, chart).map_err(|e| eyre!("Draw chart {path:?}: {e}"))?;
    root.present().map_err(|e| eyre!("Write chart {path:?}: {e}"))?;
    Ok(())
}
