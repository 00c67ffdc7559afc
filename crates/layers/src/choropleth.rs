use compute::SpatialAnalysis;
use scene::{DatasetStore, GeographyIndex, Scenario, Variable, scenario_for_year};
use serde::Serialize;

use crate::labels;
use crate::symbology::{DivergingScale, NO_DATA_FILL, color_domain};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStyle {
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub hover_stroke_width: f64,
    pub no_data_fill: &'static str,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            stroke: "#777",
            stroke_width: 0.8,
            hover_stroke_width: 2.0,
            no_data_fill: NO_DATA_FILL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionView {
    pub id: String,
    pub name: String,
    pub value: Option<f64>,
    pub fill: String,
}

/// One frame of the state choropleth for a `(year, variable)` slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub year: i32,
    pub scenario: Scenario,
    pub variable: Variable,
    pub scale: DivergingScale,
    /// In feature order.
    pub regions: Vec<RegionView>,
    pub style: MapStyle,
}

impl MapView {
    pub fn region(&self, id: &str) -> Option<&RegionView> {
        self.regions.iter().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub state_id: String,
    pub name: String,
    /// `"{scenario}, {year}"`.
    pub context: String,
    pub label: &'static str,
    pub value: Option<f64>,
    pub value_text: String,
    pub unit: &'static str,
}

pub struct ChoroplethLayer;

impl ChoroplethLayer {
    pub fn render(
        dataset: &DatasetStore,
        geography: &GeographyIndex,
        year: i32,
        variable: Variable,
    ) -> MapView {
        let scale = DivergingScale::from_domain(color_domain(dataset.slice(year, variable)));
        let means = SpatialAnalysis::mean_by_state(dataset.slice(year, variable), geography);
        let regions = geography
            .features()
            .iter()
            .map(|f| {
                let value = means.get(&f.id).copied();
                RegionView {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    value,
                    fill: scale.fill(value),
                }
            })
            .collect();

        MapView {
            year,
            scenario: scenario_for_year(year),
            variable,
            scale,
            regions,
            style: MapStyle::default(),
        }
    }

    /// Tooltip for the region `state_id` in `view`.
    pub fn tooltip(view: &MapView, state_id: &str) -> Option<Tooltip> {
        let region = view.region(state_id)?;
        Some(build_tooltip(&region.id, &region.name, view.year, view.variable, region.value))
    }

    /// Tooltip for feature `index`, aggregating only that state's cells.
    pub fn state_tooltip(
        dataset: &DatasetStore,
        geography: &GeographyIndex,
        year: i32,
        variable: Variable,
        index: usize,
    ) -> Option<Tooltip> {
        let feature = geography.features().get(index)?;
        let value = SpatialAnalysis::mean_for_state(dataset.slice(year, variable), geography, index);
        Some(build_tooltip(&feature.id, &feature.name, year, variable, value))
    }
}

fn build_tooltip(id: &str, name: &str, year: i32, variable: Variable, value: Option<f64>) -> Tooltip {
    Tooltip {
        state_id: id.to_string(),
        name: name.to_string(),
        context: format!("{}, {}", scenario_for_year(year), year),
        label: labels::tooltip_label(variable),
        value,
        value_text: labels::format_value(value),
        unit: variable.unit(),
    }
}

#[cfg(test)]
mod tests {
    use super::ChoroplethLayer;
    use crate::fixtures::{geography, row};
    use crate::symbology::NO_DATA_FILL;
    use scene::{DatasetStore, Variable};

    #[test]
    fn regions_follow_feature_order_with_means() {
        let ds = DatasetStore::load(vec![
            row(-105.0, 39.0, 2000, "tas", Some(1.0)),
            row(-104.0, 38.0, 2000, "tas", Some(3.0)),
            row(-100.0, 39.0, 2000, "tas", Some(-2.0)),
            row(-100.0, 39.0, 2001, "tas", Some(9.0)),
            row(-100.0, 39.0, 2000, "pr", Some(50.0)),
        ]);
        let view = ChoroplethLayer::render(&ds, &geography(), 2000, Variable::Tas);

        let ids: Vec<_> = view.regions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["08", "20", "36"]);
        assert_eq!(view.region("08").and_then(|r| r.value), Some(2.0));
        assert_eq!(view.region("20").and_then(|r| r.value), Some(-2.0));
        assert_eq!(view.region("36").and_then(|r| r.value), None);
        assert_eq!(view.region("36").map(|r| r.fill.as_str()), Some(NO_DATA_FILL));
        assert!((view.scale.span - 1.8).abs() < 1e-12);
    }

    #[test]
    fn tooltip_reports_value_or_na() {
        let ds = DatasetStore::load(vec![row(-105.0, 39.0, 2050, "pr", Some(12.345))]);
        let view = ChoroplethLayer::render(&ds, &geography(), 2050, Variable::Pr);

        let tip = ChoroplethLayer::tooltip(&view, "08").expect("colorado");
        assert_eq!(tip.name, "Colorado");
        assert_eq!(tip.context, "ssp585, 2050");
        assert_eq!(tip.label, "Precip anomaly:");
        assert_eq!(tip.value_text, "12.35");
        assert_eq!(tip.unit, "mm/yr");

        let tip = ChoroplethLayer::tooltip(&view, "36").expect("new york");
        assert_eq!(tip.value_text, "N/A");
        assert!(ChoroplethLayer::tooltip(&view, "99").is_none());
    }

    #[test]
    fn state_tooltip_agrees_with_the_rendered_map() {
        let ds = DatasetStore::load(vec![
            row(-105.0, 39.0, 2000, "tas", Some(1.0)),
            row(-104.0, 38.0, 2000, "tas", Some(3.0)),
            row(-100.0, 39.0, 2000, "tas", Some(-2.0)),
            row(-104.0, 38.0, 2001, "tas", Some(8.0)),
        ]);
        let geo = geography();
        let view = ChoroplethLayer::render(&ds, &geo, 2000, Variable::Tas);
        for (i, feature) in geo.features().iter().enumerate() {
            assert_eq!(
                ChoroplethLayer::state_tooltip(&ds, &geo, 2000, Variable::Tas, i),
                ChoroplethLayer::tooltip(&view, &feature.id)
            );
        }
        let tip = ChoroplethLayer::state_tooltip(&ds, &geo, 2000, Variable::Tas, 0).expect("colorado");
        assert_eq!(tip.value_text, "2.00");
        assert!(ChoroplethLayer::state_tooltip(&ds, &geo, 2000, Variable::Tas, 7).is_none());
    }
}
