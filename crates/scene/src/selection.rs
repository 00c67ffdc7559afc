use foundation::bounds::Aabb2;
use foundation::math::Projection;
use serde::{Deserialize, Serialize};

use crate::cell::{GridCell, Variable};
use crate::dataset::DatasetStore;
use crate::geography::{GeographyIndex, StateFeature};

/// What the user has selected on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// Whole-country view.
    #[default]
    None,
    /// Brushed rectangle in map pixel space; matches cells by projected position.
    Brush { rect: Aabb2 },
    /// A clicked state; matches every cell inside its boundary, all years.
    State { id: String },
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Resolves the selection into cells of `variable` across all years.
    ///
    /// Returns `None` for the whole-country view, which is distinct from a
    /// selection that matches nothing. An unknown state id resolves to an
    /// empty set.
    pub fn resolve<P: Projection>(
        &self,
        dataset: &DatasetStore,
        geography: &GeographyIndex,
        projection: &P,
        variable: Variable,
    ) -> Option<CellSet> {
        match self {
            Selection::None => None,
            Selection::Brush { rect } => Some(cells_in_rect(dataset, variable, rect, projection)),
            Selection::State { id } => Some(match geography.get(id) {
                Some(feature) => cells_in_state(dataset, variable, feature),
                None => CellSet::new(),
            }),
        }
    }
}

/// Cells of `variable` whose projected position lies inside `rect`.
///
/// Cells that do not project (outside the visible area) never match.
pub fn cells_in_rect<P: Projection>(
    dataset: &DatasetStore,
    variable: Variable,
    rect: &Aabb2,
    projection: &P,
) -> CellSet {
    let mut out = CellSet::with_capacity(dataset.len());
    for (i, cell) in dataset.cells().iter().enumerate() {
        if cell.variable != variable {
            continue;
        }
        let Some(xy) = projection.project(cell.point()) else {
            continue;
        };
        if rect.contains(xy) {
            out.insert(i as u32);
        }
    }
    out
}

/// Cells of `variable` inside a state's boundary, every year and scenario.
pub fn cells_in_state(dataset: &DatasetStore, variable: Variable, feature: &StateFeature) -> CellSet {
    let mut out = CellSet::with_capacity(dataset.len());
    for (i, cell) in dataset.cells().iter().enumerate() {
        if cell.variable == variable && feature.contains(cell.point()) {
            out.insert(i as u32);
        }
    }
    out
}

/// Deterministic set of cell indices backed by a bitset.
///
/// Ordering contract:
/// - Iteration yields indices in ascending order, i.e. dataset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSet {
    words: Vec<u64>,
    len: usize,
}

impl CellSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cells: usize) -> Self {
        Self {
            words: Vec::with_capacity(cells.div_ceil(64)),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, index: u32) -> bool {
        let (word, bit) = word_bit(index);
        self.words
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// Returns `true` if the set changed.
    pub fn insert(&mut self, index: u32) -> bool {
        let (word, bit) = word_bit(index);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let w = &mut self.words[word];
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        self.len += 1;
        true
    }

    /// Iterates selected indices in ascending order.
    pub fn iter_indices(&self) -> impl Iterator<Item = u32> + '_ {
        CellIndexIter {
            words: &self.words,
            word_index: 0,
            current_word: 0,
            base_index: 0,
        }
    }

    /// Iterates the selected cells of `dataset` in dataset order.
    ///
    /// The yielded cells borrow only from `dataset`, so they outlive the set.
    pub fn cells<'s, 'd>(
        &'s self,
        dataset: &'d DatasetStore,
    ) -> impl Iterator<Item = &'d GridCell> + use<'s, 'd> {
        self.iter_indices()
            .filter_map(move |i| dataset.cell(i as usize))
    }
}

fn word_bit(index: u32) -> (usize, u32) {
    ((index / 64) as usize, index % 64)
}

struct CellIndexIter<'a> {
    words: &'a [u64],
    word_index: usize,
    current_word: u64,
    base_index: u32,
}

impl Iterator for CellIndexIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let tz = self.current_word.trailing_zeros();
                self.current_word &= !(1u64 << tz);
                return Some(self.base_index + tz);
            }

            let w = *self.words.get(self.word_index)?;
            self.current_word = w;
            self.base_index = (self.word_index as u32) * 64;
            self.word_index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellSet, Selection, cells_in_rect, cells_in_state};
    use crate::cell::{GridCell, Variable};
    use crate::dataset::{DatasetStore, RawGridRow};
    use crate::geography::{GeographyIndex, StateFeature};
    use foundation::bounds::Aabb2;
    use foundation::math::{AlbersUsa, LonLat, MultiPolygon, Polygon, Projection};

    fn row(lon: f64, lat: f64, year: i32, variable: &str, anom: f64) -> RawGridRow {
        RawGridRow {
            lon: Some(lon),
            lat: Some(lat),
            year: Some(year),
            variable: Some(variable.to_string()),
            scenario: None,
            anom: Some(anom),
        }
    }

    fn colorado() -> StateFeature {
        let ring = vec![
            LonLat::new(-109.0, 37.0),
            LonLat::new(-102.0, 37.0),
            LonLat::new(-102.0, 41.0),
            LonLat::new(-109.0, 41.0),
        ];
        StateFeature::new("08", "Colorado", MultiPolygon::new(vec![Polygon::new(ring, vec![])]))
    }

    fn dataset() -> DatasetStore {
        DatasetStore::load(vec![
            row(-105.0, 39.0, 2000, "tas", 1.0),
            row(-105.0, 39.0, 2050, "tas", 3.0),
            row(-105.0, 39.0, 2000, "pr", 9.0),
            row(-75.0, 42.0, 2000, "tas", -0.4),
            row(10.0, 50.0, 2000, "tas", 7.0),
        ])
    }

    #[test]
    fn cell_set_insert_contains_and_sorted_iteration() {
        let mut s = CellSet::new();
        assert!(s.is_empty());
        assert!(s.insert(65));
        assert!(s.insert(2));
        assert!(!s.insert(2));
        assert!(s.contains(65));
        assert!(!s.contains(3));
        assert_eq!(s.len(), 2);
        assert_eq!(s.iter_indices().collect::<Vec<_>>(), vec![2, 65]);
    }

    #[test]
    fn state_selection_spans_all_years_of_one_variable() {
        let ds = dataset();
        let set = cells_in_state(&ds, Variable::Tas, &colorado());
        let years: Vec<i32> = set.cells(&ds).map(|c| c.year).collect();
        assert_eq!(years, vec![2000, 2050]);
    }

    #[test]
    fn resolved_cells_outlive_the_set() {
        let ds = dataset();
        let proj = AlbersUsa::centered(900.0, 960.0, 600.0);
        let geo = GeographyIndex::new(vec![colorado()]);
        let selected: Option<Vec<&GridCell>> = Selection::State { id: "08".into() }
            .resolve(&ds, &geo, &proj, Variable::Tas)
            .map(|set| set.cells(&ds).collect());
        let anoms: Vec<f64> = selected.unwrap().iter().map(|c| c.anom).collect();
        assert_eq!(anoms, vec![1.0, 3.0]);
    }

    #[test]
    fn brush_matches_projected_cells_only() {
        let ds = dataset();
        let proj = AlbersUsa::centered(900.0, 960.0, 600.0);
        let denver = proj.project(LonLat::new(-105.0, 39.0)).unwrap();
        let rect = Aabb2::from_corners(
            [denver[0] - 5.0, denver[1] - 5.0],
            [denver[0] + 5.0, denver[1] + 5.0],
        );
        let set = cells_in_rect(&ds, Variable::Tas, &rect, &proj);
        assert_eq!(set.iter_indices().collect::<Vec<_>>(), vec![0, 1]);

        // The whole canvas still excludes the cell in Europe, which never projects.
        let all = cells_in_rect(&ds, Variable::Tas, &Aabb2::new([0.0, 0.0], [960.0, 600.0]), &proj);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn resolve_distinguishes_none_from_empty() {
        let ds = dataset();
        let proj = AlbersUsa::centered(900.0, 960.0, 600.0);
        let geo = GeographyIndex::new(vec![colorado()]);

        assert!(Selection::None.resolve(&ds, &geo, &proj, Variable::Tas).is_none());

        let ocean = Selection::Brush {
            rect: Aabb2::new([0.0, 0.0], [3.0, 3.0]),
        };
        let set = ocean.resolve(&ds, &geo, &proj, Variable::Tas).unwrap();
        assert!(set.is_empty());

        let state = Selection::State { id: "08".into() };
        assert_eq!(state.resolve(&ds, &geo, &proj, Variable::Tas).unwrap().len(), 2);

        let missing = Selection::State { id: "99".into() };
        assert!(missing.resolve(&ds, &geo, &proj, Variable::Tas).unwrap().is_empty());
    }
}
