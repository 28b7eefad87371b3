use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    chart::{CircuitScatter, Heatmap, Histogram, HistogramPair, ScatterPoint, SizeLegendEntry},
    race_result::RaceResult,
};

pub const POSITION_BINS: usize = 20;
pub const POINTS_BINS: usize = 30;
pub const YEAR_STRIDE: usize = 10;
pub const HEATMAP_MAX_POSITION: i32 = 10;
pub const SCATTER_SIZE_FACTOR: f64 = 10.0;
pub const LEGEND_POINTS: [f64; 4] = [1.0, 5.0, 10.0, 25.0];

/// Equal-width bins over the observed `[min, max]`, last bin closed on the
/// right. A single distinct value gets a unit-wide range centred on it and
/// no values at all give `[0, 1]`.
pub fn histogram<I>(values: I, bins: usize) -> Histogram
where
    I: IntoIterator<Item = f64>,
{
    let bins = bins.max(1);
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() {
        lo = 0.0;
        hi = 1.0;
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| lo + width * i as f64).collect();
    edges.push(hi);

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

pub fn build_histograms(rows: &[RaceResult]) -> HistogramPair {
    HistogramPair {
        position: histogram(rows.iter().map(|r| r.position_order as f64), POSITION_BINS),
        points: histogram(rows.iter().map(RaceResult::points_f64), POINTS_BINS),
    }
}

/// Every tenth year of the sorted distinct years, starting with the first.
pub fn select_years(rows: &[RaceResult]) -> Vec<i32> {
    let years: BTreeSet<i32> = rows.iter().map(|r| r.race_year).collect();
    years.into_iter().step_by(YEAR_STRIDE).collect()
}

pub fn build_heatmap(rows: &[RaceResult]) -> Heatmap {
    let selected = select_years(rows);

    let mut sums: BTreeMap<(i32, i32), (f64, usize)> = BTreeMap::new();
    for row in rows.iter().filter(|r| {
        r.position_order <= HEATMAP_MAX_POSITION && selected.binary_search(&r.race_year).is_ok()
    }) {
        let cell = sums
            .entry((row.position_order, row.race_year))
            .or_insert((0.0, 0));
        cell.0 += row.points_f64();
        cell.1 += 1;
    }

    let positions: Vec<i32> = sums
        .keys()
        .map(|(position, _)| *position)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let years: Vec<i32> = sums
        .keys()
        .map(|(_, year)| *year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let cells = positions
        .iter()
        .map(|position| {
            years
                .iter()
                .map(|year| match sums.get(&(*position, *year)) {
                    Some((sum, count)) => sum / *count as f64,
                    None => f64::NAN,
                })
                .collect()
        })
        .collect();

    Heatmap {
        positions,
        years,
        cells,
    }
}

pub fn marker_size(points: f64) -> f64 {
    points * SCATTER_SIZE_FACTOR
}

pub fn size_legend() -> Vec<SizeLegendEntry> {
    LEGEND_POINTS
        .iter()
        .map(|&points| SizeLegendEntry {
            points,
            size: marker_size(points),
            label: if points == 1.0 {
                "1 point".to_string()
            } else {
                format!("{points} points")
            },
        })
        .collect()
}

pub fn build_scatter(rows: &[RaceResult]) -> CircuitScatter {
    let points = rows
        .iter()
        .map(|r| ScatterPoint {
            lng: r.circuit_lng,
            lat: r.circuit_lat,
            year: r.race_year,
            size: marker_size(r.points_f64()),
        })
        .collect();

    CircuitScatter {
        points,
        legend: size_legend(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    pub(crate) fn row(year: i32, position: i32, points: f64) -> RaceResult {
        RaceResult {
            race_year: year,
            race_date: NaiveDate::from_ymd_opt(year, 5, 14).unwrap(),
            circuit_country: "Italy".to_string(),
            circuit_lat: 45.6156,
            circuit_lng: 9.28111,
            driver_id: position,
            position_order: position,
            points: Decimal::try_from(points).unwrap(),
        }
    }

    #[test]
    fn histograms_use_fixed_bin_counts_over_observed_range() {
        let rows: Vec<RaceResult> = (1..=24)
            .map(|p| row(2010, p, if p <= 10 { 26.0 - p as f64 * 2.0 } else { 0.0 }))
            .collect();
        let hist = build_histograms(&rows);

        assert_eq!(hist.position.bin_count(), 20);
        assert_eq!(hist.position.edges.len(), 21);
        assert_eq!(hist.position.range(), (1.0, 24.0));
        assert_eq!(hist.position.total(), 24);

        assert_eq!(hist.points.bin_count(), 30);
        assert_eq!(hist.points.range(), (0.0, 24.0));
        assert_eq!(hist.points.total(), 24);
    }

    #[test]
    fn histogram_counts_maximum_in_last_bin() {
        let hist = histogram([0.0, 5.0, 10.0], 10);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[5], 1);
        assert_eq!(hist.counts[9], 1);
    }

    #[test]
    fn histogram_of_constant_values_widens_range() {
        let hist = histogram([3.0, 3.0], 20);
        assert_eq!(hist.range(), (2.5, 3.5));
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn histogram_of_nothing_is_empty_unit_range() {
        let hist = histogram(std::iter::empty(), POINTS_BINS);
        assert_eq!(hist.bin_count(), 30);
        assert_eq!(hist.range(), (0.0, 1.0));
        assert_eq!(hist.total(), 0);
    }

    #[test]
    fn selects_every_tenth_distinct_year() {
        let rows: Vec<RaceResult> = (1950..=2023).map(|y| row(y, 1, 9.0)).collect();
        assert_eq!(
            select_years(&rows),
            vec![1950, 1960, 1970, 1980, 1990, 2000, 2010, 2020]
        );
    }

    #[test]
    fn year_selection_counts_distinct_years_not_rows() {
        let mut rows = Vec::new();
        for year in [2001, 1999, 2003, 2000, 2002] {
            for position in 1..=3 {
                rows.push(row(year, position, 1.0));
            }
        }
        assert_eq!(select_years(&rows), vec![1999]);
    }

    #[test]
    fn heatmap_cells_hold_mean_points_per_position_and_year() {
        let mut rows: Vec<RaceResult> = (1950..=1969).map(|y| row(y, 20, 0.0)).collect();
        rows.extend([
            row(1950, 1, 8.0),
            row(1950, 1, 9.0),
            row(1950, 2, 6.0),
            row(1960, 1, 8.0),
            row(1960, 11, 0.0),
            row(1955, 1, 8.0),
        ]);
        let heatmap = build_heatmap(&rows);

        assert_eq!(heatmap.years, vec![1950, 1960]);
        assert_eq!(heatmap.positions, vec![1, 2]);
        assert_eq!(heatmap.value(1, 1950), Some(8.5));
        assert_eq!(heatmap.value(2, 1950), Some(6.0));
        assert_eq!(heatmap.value(1, 1960), Some(8.0));
        assert_eq!(heatmap.value(2, 1960), None);
        assert!(heatmap.cells[1][1].is_nan());
        assert_eq!(heatmap.value(1, 1955), None);
        assert_eq!(heatmap.value(11, 1960), None);
    }

    #[test]
    fn marker_size_scales_linearly_with_points() {
        assert_eq!(marker_size(0.0), 0.0);
        assert_eq!(marker_size(4.5), 45.0);
        assert_eq!(marker_size(25.0), 250.0);
    }

    #[test]
    fn size_legend_maps_representative_points() {
        let legend = size_legend();
        let points: Vec<f64> = legend.iter().map(|e| e.points).collect();
        let sizes: Vec<f64> = legend.iter().map(|e| e.size).collect();
        assert_eq!(points, vec![1.0, 5.0, 10.0, 25.0]);
        assert_eq!(sizes, vec![10.0, 50.0, 100.0, 250.0]);
        assert_eq!(legend[0].label, "1 point");
        assert_eq!(legend[3].label, "25 points");
    }

    #[test]
    fn scatter_keeps_one_point_per_row() {
        let rows = vec![row(1950, 1, 8.0), row(2023, 2, 18.0)];
        let scatter = build_scatter(&rows);
        assert_eq!(scatter.points.len(), 2);
        assert_eq!(scatter.points[1].size, 180.0);
        assert_eq!(scatter.points[1].lng, 9.28111);
        assert_eq!(scatter.year_range(), Some((1950, 2023)));
        assert_eq!(scatter.legend.len(), 4);
    }

    #[test]
    fn empty_row_set_builds_empty_views() {
        let rows: Vec<RaceResult> = Vec::new();
        let hist = build_histograms(&rows);
        assert_eq!(hist.position.bin_count(), 20);
        assert_eq!(hist.points.total(), 0);
        assert!(select_years(&rows).is_empty());
        assert!(build_heatmap(&rows).is_empty());
        let scatter = build_scatter(&rows);
        assert!(scatter.points.is_empty());
        assert_eq!(scatter.year_range(), None);
    }
}
