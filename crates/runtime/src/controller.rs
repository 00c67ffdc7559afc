use std::fmt;

use compute::TemporalAnalysis;
use foundation::math::{AlbersUsa, Projection};
use layers::{
    ChartLayer, ChartSize, ChartView, ChoroplethLayer, Legend, LegendView, MapView, SummaryPanel,
    SummaryView, Tooltip,
};
use scene::{DatasetStore, GeographyIndex, GridCell, Scenario, StateFeature, scenario_for_year};
use serde::Serialize;

use crate::state::{Event, ViewMode, ViewState, reduce};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub map_width: f64,
    pub map_height: f64,
    pub map_scale: f64,
    pub chart: ChartSize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            map_width: 960.0,
            map_height: 600.0,
            map_scale: 900.0,
            chart: ChartSize::default(),
        }
    }
}

impl DashboardConfig {
    /// Albers-USA centred on the map surface.
    pub fn projection(&self) -> AlbersUsa {
        AlbersUsa::centered(self.map_scale, self.map_width, self.map_height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// No usable grid cells were loaded.
    EmptyDataset,
    /// The geography contains no state features.
    NoStates,
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::EmptyDataset => write!(f, "dataset contains no grid cells"),
            DashboardError::NoStates => write!(f, "geography contains no state features"),
        }
    }
}

impl std::error::Error for DashboardError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSlider {
    pub min: usize,
    pub max: usize,
    pub value: usize,
    pub label: String,
}

/// Complete render output for one view state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub state: ViewState,
    pub mode: ViewMode,
    pub year: i32,
    pub scenario: Scenario,
    pub slider: YearSlider,
    pub map: MapView,
    pub legend: LegendView,
    pub chart: ChartView,
    pub summary: SummaryView,
}

/// Owns the loaded data and the current view state.
///
/// Every event replaces the state through [`reduce`]; rendering is a pure
/// function of the data and that state.
pub struct Dashboard {
    config: DashboardConfig,
    dataset: DatasetStore,
    geography: GeographyIndex,
    projection: AlbersUsa,
    state: ViewState,
}

impl Dashboard {
    pub fn new(
        dataset: DatasetStore,
        geography: GeographyIndex,
        config: DashboardConfig,
    ) -> Result<Self, DashboardError> {
        if dataset.is_empty() {
            return Err(DashboardError::EmptyDataset);
        }
        if geography.is_empty() {
            return Err(DashboardError::NoStates);
        }
        tracing::info!(
            cells = dataset.len(),
            years = dataset.distinct_years_ascending().len(),
            states = geography.len(),
            "dashboard ready"
        );
        Ok(Self {
            projection: config.projection(),
            config,
            dataset,
            geography,
            state: ViewState::default(),
        })
    }

    pub fn dataset(&self) -> &DatasetStore {
        &self.dataset
    }

    pub fn geography(&self) -> &GeographyIndex {
        &self.geography
    }

    pub fn projection(&self) -> &AlbersUsa {
        &self.projection
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn years(&self) -> &[i32] {
        self.dataset.distinct_years_ascending()
    }

    pub fn current_year(&self) -> i32 {
        // `new` guarantees at least one year and `reduce` keeps the index in range.
        self.dataset.year_at(self.state.year_index).unwrap_or_default()
    }

    /// Applies one event. Returns whether the view state changed.
    pub fn dispatch(&mut self, event: Event) -> bool {
        let next = reduce(&self.state, &event, self.years().len());
        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Recomputes every view for the current state.
    pub fn render(&self) -> DashboardView {
        let year = self.current_year();
        let variable = self.state.variable;

        let map = ChoroplethLayer::render(&self.dataset, &self.geography, year, variable);
        let legend = Legend::render(&map.scale, variable);

        let selected: Option<Vec<&GridCell>> = self
            .state
            .selection
            .resolve(&self.dataset, &self.geography, &self.projection, variable)
            .map(|set| set.cells(&self.dataset).collect());
        let summary = SummaryPanel::render(selected.as_deref(), year, variable, &self.geography);

        let baseline = TemporalAnalysis::series_by_year(self.dataset.for_variable(variable));
        let region = selected
            .as_deref()
            .map(|cells| TemporalAnalysis::series_by_year(cells.iter().copied()))
            .unwrap_or_default();
        let years = self.years();
        let chart = ChartLayer::render(
            baseline,
            region,
            variable,
            years.first().copied().unwrap_or(year),
            years.last().copied().unwrap_or(year),
            self.config.chart,
        );

        DashboardView {
            state: self.state.clone(),
            mode: self.state.mode(),
            year,
            scenario: scenario_for_year(year),
            slider: YearSlider {
                min: 0,
                max: years.len().saturating_sub(1),
                value: self.state.year_index,
                label: year.to_string(),
            },
            map,
            legend,
            chart,
            summary,
        }
    }

    /// State under a map pixel, if the pixel inverts onto the map.
    pub fn state_at(&self, pixel: [f64; 2]) -> Option<&StateFeature> {
        let point = self.projection.invert(pixel)?;
        self.geography.membership(point)
    }

    /// Tooltip for the state under `pixel`; only that state is aggregated.
    pub fn hover(&self, pixel: [f64; 2]) -> Option<Tooltip> {
        let point = self.projection.invert(pixel)?;
        let index = self.geography.membership_index(point)?;
        ChoroplethLayer::state_tooltip(
            &self.dataset,
            &self.geography,
            self.current_year(),
            self.state.variable,
            index,
        )
    }

    /// Selects the state under `pixel`. Misses leave the state untouched.
    pub fn click(&mut self, pixel: [f64; 2]) -> Option<String> {
        let Some(id) = self.state_at(pixel).map(|f| f.id.clone()) else {
            tracing::debug!(x = pixel[0], y = pixel[1], "click missed every state");
            return None;
        };
        self.dispatch(Event::StateClicked { id: id.clone() });
        Some(id)
    }
}
