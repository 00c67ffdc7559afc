use scene::Variable;
use serde::Serialize;

use crate::labels;
use crate::symbology::DivergingScale;
use crate::ticks::nice_ticks;

pub const LEGEND_WIDTH: f64 = 260.0;
pub const LEGEND_HEIGHT: f64 = 10.0;
const STOP_COUNT: usize = 11;
const TICK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    /// Fraction along the bar, 0 at the domain minimum.
    pub offset: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendTick {
    pub value: f64,
    /// Pixel offset from the bar's left edge.
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendView {
    pub title: &'static str,
    pub domain: [f64; 2],
    pub width: f64,
    pub height: f64,
    pub stops: Vec<GradientStop>,
    pub ticks: Vec<LegendTick>,
}

pub struct Legend;

impl Legend {
    /// Horizontal color bar for `scale`, the same scale the map was filled with.
    pub fn render(scale: &DivergingScale, variable: Variable) -> LegendView {
        let [min, max] = scale.domain();
        let extent = max - min;

        let stops = (0..STOP_COUNT)
            .map(|i| {
                let offset = i as f64 / (STOP_COUNT - 1) as f64;
                GradientStop {
                    offset,
                    color: scale.color(min + offset * extent).to_hex(),
                }
            })
            .collect();

        let ticks = nice_ticks(min, max, TICK_COUNT)
            .into_iter()
            .map(|value| LegendTick {
                value,
                x: if extent > 0.0 {
                    (value - min) / extent * LEGEND_WIDTH
                } else {
                    0.0
                },
                label: format!("{value:.1}"),
            })
            .collect();

        LegendView {
            title: labels::legend_title(variable),
            domain: [min, max],
            width: LEGEND_WIDTH,
            height: LEGEND_HEIGHT,
            stops,
            ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LEGEND_WIDTH, Legend};
    use crate::symbology::DivergingScale;
    use scene::Variable;

    #[test]
    fn stops_run_blue_to_red_across_the_domain() {
        let scale = DivergingScale::new(0.6);
        let legend = Legend::render(&scale, Variable::Tas);

        assert_eq!(legend.title, "Temperature anomaly (°C)");
        assert_eq!(legend.domain, [-0.6, 0.6]);
        assert_eq!(legend.stops.len(), 11);
        assert_eq!(legend.stops[0].offset, 0.0);
        assert_eq!(legend.stops[10].offset, 1.0);
        assert_eq!(legend.stops[0].color, "#053061");
        assert_eq!(legend.stops[10].color, "#67001f");
    }

    #[test]
    fn ticks_are_labelled_with_one_decimal() {
        let legend = Legend::render(&DivergingScale::new(0.6), Variable::Pr);
        let labels: Vec<_> = legend.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["-0.6", "-0.4", "-0.2", "0.0", "0.2", "0.4", "0.6"]);
        assert_eq!(legend.ticks[0].x, 0.0);
        assert!((legend.ticks[6].x - LEGEND_WIDTH).abs() < 1e-9);
        assert_eq!(legend.title, "Precipitation anomaly (mm / year)");
    }
}
