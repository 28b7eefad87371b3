use std::{
    fs,
    path::{Path, PathBuf},
};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::{
    handlers::charts::{build_heatmap, build_histograms, build_scatter},
    models::{
        chart::{CircuitScatter, Heatmap, Histogram, HistogramPair},
        error::Error,
        race_result::RaceResult,
    },
    utils::config::Config,
};

pub const HISTOGRAMS_FILE: &str = "histograms.png";
pub const OVERVIEW_FILE: &str = "overview.png";

const HISTOGRAMS_SIZE: (u32, u32) = (1500, 500);
const OVERVIEW_SIZE: (u32, u32) = (1400, 600);
const COLORBAR_WIDTH: i32 = 90;

const STEEL_BLUE: RGBColor = RGBColor(31, 119, 180);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const GREY: RGBColor = RGBColor(128, 128, 128);

/// Piecewise-linear colour ramp through evenly spaced stops.
struct Gradient(&'static [(u8, u8, u8)]);

impl Gradient {
    fn at(&self, t: f64) -> RGBColor {
        let stops = self.0;
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - idx as f64;
        let (a, b) = (stops[idx], stops[idx + 1]);
        let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }

    fn normalized(&self, value: f64, lo: f64, hi: f64) -> RGBColor {
        if hi > lo {
            self.at((value - lo) / (hi - lo))
        } else {
            self.at(0.5)
        }
    }
}

const YL_OR_RD: Gradient = Gradient(&[
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
]);

const VIRIDIS: Gradient = Gradient(&[
    (68, 1, 84),
    (72, 40, 120),
    (62, 74, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (109, 205, 89),
    (180, 222, 44),
    (253, 231, 37),
]);

#[derive(Debug, Clone)]
pub struct RenderedFigures {
    pub histograms: PathBuf,
    pub overview: PathBuf,
}

/// Builds both chart views from the row set and writes them as PNG figures
/// into the configured output directory.
pub fn render_all(rows: &[RaceResult], config: &Config) -> Result<RenderedFigures, Error> {
    fs::create_dir_all(&config.output_dir)?;

    let histograms = config.output_dir.join(HISTOGRAMS_FILE);
    render_histograms(&build_histograms(rows), &histograms)?;
    info!(path = %histograms.display(), "Histogram figure written");

    let overview = config.output_dir.join(OVERVIEW_FILE);
    render_overview(&build_heatmap(rows), &build_scatter(rows), &overview)?;
    info!(path = %overview.display(), "Overview figure written");

    Ok(RenderedFigures {
        histograms,
        overview,
    })
}

pub fn render_histograms(histograms: &HistogramPair, path: &Path) -> Result<(), Error> {
    let root = BitMapBackend::new(path, HISTOGRAMS_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, 2));
    draw_histogram(
        &panels[0],
        &histograms.position,
        "Distribution of finishing positions",
        "Finishing position",
        STEEL_BLUE,
    )?;
    draw_histogram(
        &panels[1],
        &histograms.points,
        "Distribution of points scored",
        "Points",
        ORANGE,
    )?;

    root.present()?;
    Ok(())
}

pub fn render_overview(
    heatmap: &Heatmap,
    scatter: &CircuitScatter,
    path: &Path,
) -> Result<(), Error> {
    let root = BitMapBackend::new(path, OVERVIEW_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (left, right) = root.split_horizontally(OVERVIEW_SIZE.0 / 2);
    draw_heatmap(&left, heatmap)?;
    draw_scatter(&right, scatter)?;

    root.present()?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    histogram: &Histogram,
    title: &str,
    x_desc: &str,
    color: RGBColor,
) -> Result<(), Error> {
    let (x0, x1) = histogram.range();
    let y_max = histogram.counts.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Frequency")
        .y_label_formatter(&|v| format!("{:.0}", v))
        .bold_line_style(&BLACK.mix(0.15))
        .light_line_style(&BLACK.mix(0.05))
        .draw()?;

    chart.draw_series(histogram.bins().map(|(lo, hi, count)| {
        Rectangle::new([(lo, 0.0), (hi, count as f64)], color.mix(0.7).filled())
    }))?;
    chart.draw_series(
        histogram
            .bins()
            .filter(|(_, _, count)| *count > 0)
            .map(|(lo, hi, count)| {
                Rectangle::new([(lo, 0.0), (hi, count as f64)], BLACK.stroke_width(1))
            }),
    )?;

    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    heatmap: &Heatmap,
) -> Result<(), Error> {
    let cols = heatmap.years.len().max(1);
    let rows = heatmap.positions.len().max(1);
    let (lo, hi) = heatmap.value_range().unwrap_or((0.0, 1.0));

    let mut chart = ChartBuilder::on(area)
        .caption("Mean points by year and position", ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..cols as f64, 0f64..rows as f64)?;

    // Row 0 of the pivot (position 1) is drawn at the top.
    let year_label = |v: &f64| {
        cell_index(*v)
            .and_then(|idx| heatmap.years.get(idx))
            .map(|y| y.to_string())
            .unwrap_or_default()
    };
    let position_label = |v: &f64| {
        cell_index(*v)
            .and_then(|idx| (rows - 1).checked_sub(idx))
            .and_then(|idx| heatmap.positions.get(idx))
            .map(|p| p.to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(2 * cols + 1)
        .y_labels(2 * rows + 1)
        .x_label_formatter(&year_label)
        .y_label_formatter(&position_label)
        .x_desc("Year")
        .y_desc("Finishing position")
        .draw()?;

    let cells = heatmap.cells.iter().enumerate().flat_map(|(r, row)| {
        row.iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(move |(c, v)| (c as f64, (rows - 1 - r) as f64, *v))
    });

    for (x, y, value) in cells {
        let fill = YL_OR_RD.normalized(value, lo, hi);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x, y), (x + 1.0, y + 1.0)],
            fill.filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x, y), (x + 1.0, y + 1.0)],
            WHITE.stroke_width(1),
        )))?;

        let dark = hi > lo && (value - lo) / (hi - lo) > 0.6;
        let text_color = if dark { WHITE } else { BLACK };
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.1}", value),
            (x + 0.5, y + 0.5),
            ("sans-serif", 13)
                .into_font()
                .color(&text_color)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        )))?;
    }

    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scatter: &CircuitScatter,
) -> Result<(), Error> {
    let width = area.dim_in_pixel().0 as i32;
    let (plot_area, bar_area) = area.split_horizontally(width - COLORBAR_WIDTH);

    let (lng_range, lat_range) = coordinate_ranges(scatter);
    let (year_lo, year_hi) = scatter
        .year_range()
        .map(|(lo, hi)| (lo as f64, hi as f64))
        .unwrap_or((0.0, 1.0));

    let mut chart = ChartBuilder::on(&plot_area)
        .caption("Circuit locations by year and points", ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lng_range, lat_range)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .bold_line_style(&BLACK.mix(0.15))
        .light_line_style(&BLACK.mix(0.05))
        .draw()?;

    chart.draw_series(
        scatter
            .points
            .iter()
            .filter(|p| p.size > 0.0)
            .map(|p| {
                let color = VIRIDIS.normalized(p.year as f64, year_lo, year_hi);
                Circle::new((p.lng, p.lat), marker_radius(p.size), color.mix(0.6).filled())
            }),
    )?;

    chart
        .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
        .label("Points")
        .legend(|(x, y)| EmptyElement::at((x, y)));
    for entry in &scatter.legend {
        let radius = marker_radius(entry.size);
        chart
            .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
            .label(entry.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 8, y), radius, GREY.mix(0.6).filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .label_font(("sans-serif", 14))
        .draw()?;

    draw_colorbar(&bar_area, year_lo, year_hi)
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lo: f64,
    hi: f64,
) -> Result<(), Error> {
    let (y0, y1) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };

    let mut chart = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(60)
        .margin_right(10)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..1f64, y0..y1)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("Race year")
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    const STEPS: usize = 100;
    let step = (y1 - y0) / STEPS as f64;
    chart.draw_series((0..STEPS).map(|i| {
        let from = y0 + step * i as f64;
        Rectangle::new(
            [(0.0, from), (1.0, from + step)],
            VIRIDIS.normalized(from + step / 2.0, y0, y1).filled(),
        )
    }))?;

    Ok(())
}

/// Index of the heatmap cell whose centre sits on tick `v`; ticks on cell
/// borders get no label.
fn cell_index(v: f64) -> Option<usize> {
    let shifted = v - 0.5;
    let idx = shifted.round();
    (idx >= 0.0 && (shifted - idx).abs() < 1e-6).then_some(idx as usize)
}

/// Marker sizes are areas, so the drawn radius grows with the square root.
fn marker_radius(size: f64) -> i32 {
    (size.max(0.0).sqrt() * 0.7).round().max(1.0) as i32
}

fn coordinate_ranges(
    scatter: &CircuitScatter,
) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let bounds = scatter.points.iter().fold(None, |acc, p| match acc {
        None => Some((p.lng, p.lng, p.lat, p.lat)),
        Some((x0, x1, y0, y1)) => Some((
            f64::min(x0, p.lng),
            f64::max(x1, p.lng),
            f64::min(y0, p.lat),
            f64::max(y1, p.lat),
        )),
    });

    match bounds {
        Some((x0, x1, y0, y1)) => ((x0 - 10.0)..(x1 + 10.0), (y0 - 10.0)..(y1 + 10.0)),
        None => (-180.0..180.0, -90.0..90.0),
    }
}
