use compute::{SpatialAnalysis, Statistics};
use scene::{GeographyIndex, GridCell, Scenario, Variable, scenario_for_year};
use serde::Serialize;

const PLACEHOLDER: &str = "—";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    NoSelection,
    EmptySelection,
    NoDataForYear,
    Data,
}

/// Metric strip for the current selection. Every field is display-ready.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub status: SummaryStatus,
    pub year: String,
    pub scenario: String,
    pub mean: String,
    pub min: String,
    pub max: String,
    /// Touched state names, or the status message when there is nothing to list.
    pub states: String,
}

impl SummaryView {
    fn placeholder(status: SummaryStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            year: PLACEHOLDER.to_string(),
            scenario: PLACEHOLDER.to_string(),
            mean: PLACEHOLDER.to_string(),
            min: PLACEHOLDER.to_string(),
            max: PLACEHOLDER.to_string(),
            states: message.into(),
        }
    }
}

pub struct SummaryPanel;

impl SummaryPanel {
    /// `selected` is `None` when nothing is selected, otherwise the
    /// selection's cells for `variable` across all years.
    pub fn render(
        selected: Option<&[&GridCell]>,
        year: i32,
        variable: Variable,
        geography: &GeographyIndex,
    ) -> SummaryView {
        let Some(selected) = selected else {
            return SummaryView::placeholder(
                SummaryStatus::NoSelection,
                "No region selected. Showing US average.",
            );
        };
        if selected.is_empty() {
            return SummaryView::placeholder(
                SummaryStatus::EmptySelection,
                "No data in selected region.",
            );
        }

        let scenario = scenario_for_year(year);
        let current: Vec<&GridCell> = selected
            .iter()
            .copied()
            .filter(|c| c.year == year && c.scenario == scenario)
            .collect();

        match Statistics::summarize(current.iter().map(|c| c.anom)) {
            None => SummaryView {
                year: year.to_string(),
                scenario: scenario.to_string(),
                ..SummaryView::placeholder(
                    SummaryStatus::NoDataForYear,
                    no_data_message(scenario, year),
                )
            },
            Some(stats) => {
                let names = SpatialAnalysis::states_touched_by(current.iter().copied(), geography);
                let states = if names.is_empty() {
                    "(none)".to_string()
                } else {
                    names.into_iter().collect::<Vec<_>>().join(", ")
                };
                SummaryView {
                    status: SummaryStatus::Data,
                    year: year.to_string(),
                    scenario: scenario.to_string(),
                    mean: format!("{:.2} {}", stats.mean, variable.unit()),
                    min: format!("{:.2}", stats.min),
                    max: format!("{:.2}", stats.max),
                    states,
                }
            }
        }
    }
}

fn no_data_message(scenario: Scenario, year: i32) -> String {
    format!("No data in selection for {scenario}, {year}.")
}
