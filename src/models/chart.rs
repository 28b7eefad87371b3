/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn range(&self) -> (f64, f64) {
        let lo = self.edges.first().copied().unwrap_or(0.0);
        let hi = self.edges.last().copied().unwrap_or(1.0);
        (lo, hi)
    }

    /// Iterates `(lower edge, upper edge, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(edge, count)| (edge[0], edge[1], *count))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPair {
    pub position: Histogram,
    pub points: Histogram,
}

/// Mean points pivoted by finishing position (rows) and year (columns).
#[derive(Debug, Clone)]
pub struct Heatmap {
    pub positions: Vec<i32>,
    pub years: Vec<i32>,
    /// `cells[row][col]`, `NaN` where the pair has no results.
    pub cells: Vec<Vec<f64>>,
}

impl Heatmap {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.years.is_empty()
    }

    pub fn value(&self, position: i32, year: i32) -> Option<f64> {
        let row = self.positions.iter().position(|p| *p == position)?;
        let col = self.years.iter().position(|y| *y == year)?;
        let value = self.cells[row][col];
        (!value.is_nan()).then_some(value)
    }

    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub lng: f64,
    pub lat: f64,
    pub year: i32,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeLegendEntry {
    pub points: f64,
    pub size: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitScatter {
    pub points: Vec<ScatterPoint>,
    pub legend: Vec<SizeLegendEntry>,
}

impl CircuitScatter {
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let lo = self.points.iter().map(|p| p.year).min()?;
        let hi = self.points.iter().map(|p| p.year).max()?;
        Some((lo, hi))
    }
}
