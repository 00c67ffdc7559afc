use compute::SeriesPoint;
use scene::Variable;
use serde::Serialize;

use crate::labels;
use crate::ticks::nice_ticks;

const X_TICK_COUNT: usize = 6;
const Y_TICK_COUNT: usize = 10;
/// Fraction of the value extent added above and below the data.
const Y_PADDING: f64 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ChartSize {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl ChartSize {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 320.0,
            margin: Margin {
                top: 40.0,
                right: 20.0,
                bottom: 40.0,
                left: 55.0,
            },
        }
    }
}

/// Linear map from a data domain to a pixel range.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub scale: LinearScale,
    pub ticks: Vec<f64>,
}

impl Axis {
    fn new(domain: [f64; 2], range: [f64; 2], tick_count: usize) -> Self {
        Self {
            scale: LinearScale { domain, range },
            ticks: nice_ticks(domain[0], domain[1], tick_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: &'static str,
    pub stroke: &'static str,
    pub dash: Option<&'static str>,
    pub points: Vec<SeriesPoint>,
    /// SVG path in inner chart pixels; years without a value break the line.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub stroke: &'static str,
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub title: String,
    pub size: ChartSize,
    /// `None` when there is nothing to plot.
    pub x_axis: Option<Axis>,
    pub y_axis: Option<Axis>,
    pub baseline: LineSeries,
    /// Present only when the selection has cells.
    pub region: Option<LineSeries>,
    pub legend: Vec<LegendEntry>,
}

const BASELINE_LABEL: &str = "US baseline";
const BASELINE_STROKE: &str = "#aaa";
const BASELINE_DASH: &str = "4,2";
const REGION_LABEL: &str = "Selected region";
const REGION_STROKE: &str = "#d62728";

pub struct ChartLayer;

impl ChartLayer {
    /// Lays out the baseline and optional region series on shared axes.
    pub fn render(
        baseline: Vec<SeriesPoint>,
        region: Vec<SeriesPoint>,
        variable: Variable,
        first_year: i32,
        last_year: i32,
        size: ChartSize,
    ) -> ChartView {
        let mut region = (!region.is_empty()).then(|| LineSeries {
            label: REGION_LABEL,
            stroke: REGION_STROKE,
            dash: None,
            points: region,
            path: String::new(),
        });
        let mut baseline = LineSeries {
            label: BASELINE_LABEL,
            stroke: BASELINE_STROKE,
            dash: Some(BASELINE_DASH),
            points: baseline,
            path: String::new(),
        };

        let plotted = || baseline.points.iter().chain(region.iter().flat_map(|s| s.points.iter()));
        let x_axis = extent(plotted().map(|p| p.year as f64))
            .map(|domain| Axis::new(domain, [0.0, size.inner_width()], X_TICK_COUNT));
        let y_axis = extent(plotted().filter_map(|p| p.value)).map(|[lo, hi]| {
            let pad = match (hi - lo) * Y_PADDING {
                p if p > 0.0 => p,
                _ => 1.0,
            };
            Axis::new([lo - pad, hi + pad], [size.inner_height(), 0.0], Y_TICK_COUNT)
        });

        if let (Some(x), Some(y)) = (&x_axis, &y_axis) {
            baseline.path = line_path(&baseline.points, &x.scale, &y.scale);
            if let Some(series) = region.as_mut() {
                series.path = line_path(&series.points, &x.scale, &y.scale);
            }
        }

        ChartView {
            title: labels::chart_title(variable, first_year, last_year),
            size,
            x_axis,
            y_axis,
            baseline,
            region,
            legend: vec![
                LegendEntry {
                    label: BASELINE_LABEL,
                    stroke: BASELINE_STROKE,
                    dash: Some(BASELINE_DASH),
                },
                LegendEntry {
                    label: REGION_LABEL,
                    stroke: REGION_STROKE,
                    dash: None,
                },
            ],
        }
    }
}

fn line_path(points: &[SeriesPoint], x: &LinearScale, y: &LinearScale) -> String {
    let mut path = String::new();
    let mut pen_down = false;
    for point in points {
        let Some(value) = point.value.filter(|v| v.is_finite()) else {
            pen_down = false;
            continue;
        };
        let command = if pen_down { 'L' } else { 'M' };
        path.push_str(&format!(
            "{command}{:.2},{:.2}",
            x.apply(point.year as f64),
            y.apply(value)
        ));
        pen_down = true;
    }
    path
}

fn extent(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<[f64; 2]>, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}
