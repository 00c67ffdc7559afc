use foundation::bounds::Aabb2;
use scene::{Selection, Variable};
use serde::{Deserialize, Serialize};

/// Everything the dashboard renders from. Replaced, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Index into the ascending distinct-year list.
    pub year_index: usize,
    pub variable: Variable,
    pub selection: Selection,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    WholeCountry,
    RegionSelected,
}

impl ViewState {
    pub fn mode(&self) -> ViewMode {
        if self.selection.is_none() {
            ViewMode::WholeCountry
        } else {
            ViewMode::RegionSelected
        }
    }
}

/// User input, as delivered by the year slider, variable selector, brush and map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SetYearIndex { index: usize },
    SetVariable { variable: Variable },
    /// End of a brush gesture in map pixels; `None` when the brush was cleared.
    BrushEnd { rect: Option<Aabb2> },
    StateClicked { id: String },
    ClearSelection,
}

/// Applies `event` to `state`. `year_count` bounds the slider.
///
/// Year and variable changes keep the selection. A brush that encloses no
/// area clears it. An out-of-range year index leaves the state unchanged.
pub fn reduce(state: &ViewState, event: &Event, year_count: usize) -> ViewState {
    let mut next = state.clone();
    match event {
        Event::SetYearIndex { index } => {
            if *index < year_count {
                next.year_index = *index;
            } else {
                tracing::warn!(index, year_count, "year index out of range; ignored");
            }
        }
        Event::SetVariable { variable } => next.variable = *variable,
        Event::BrushEnd { rect } => {
            next.selection = match rect.map(|r| Aabb2::from_corners(r.min, r.max)) {
                Some(r) if !r.is_degenerate() => Selection::Brush { rect: r },
                _ => Selection::None,
            };
        }
        Event::StateClicked { id } => next.selection = Selection::State { id: id.clone() },
        Event::ClearSelection => next.selection = Selection::None,
    }
    tracing::debug!(?event, mode = ?next.mode(), year_index = next.year_index, "view state reduced");
    next
}
