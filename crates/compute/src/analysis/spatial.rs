use std::collections::{BTreeMap, BTreeSet};

use scene::{GeographyIndex, GridCell};

use crate::analysis::statistics::Statistics;

/// Per-state aggregation of grid cells.
///
/// Every cell costs one membership lookup; the BVH in `GeographyIndex` keeps
/// that close to the handful of states whose bounds contain the point, while
/// the linear scan remains the reference semantics.
pub struct SpatialAnalysis;

impl SpatialAnalysis {
    /// Mean anomaly per state id.
    ///
    /// States without any cell carrying a value are absent from the map,
    /// never present as zero.
    pub fn mean_by_state<'a>(
        cells: impl IntoIterator<Item = &'a GridCell>,
        geography: &GeographyIndex,
    ) -> BTreeMap<String, f64> {
        let mut sums: Vec<(f64, usize)> = vec![(0.0, 0); geography.len()];
        for cell in cells {
            if !cell.has_value() {
                continue;
            }
            if let Some(i) = geography.membership_index(cell.point()) {
                sums[i].0 += cell.anom;
                sums[i].1 += 1;
            }
        }

        let mut out = BTreeMap::new();
        for (feature, (sum, count)) in geography.features().iter().zip(sums) {
            if count > 0 {
                out.entry(feature.id.clone())
                    .or_insert(sum / count as f64);
            }
        }
        out
    }

    /// Mean anomaly of the cells assigned to feature `index`.
    ///
    /// Agrees with `mean_by_state`: a cell inside overlapping features counts
    /// only toward the first of them. Cells outside the feature's bounds are
    /// rejected before any membership lookup.
    pub fn mean_for_state<'a>(
        cells: impl IntoIterator<Item = &'a GridCell>,
        geography: &GeographyIndex,
        index: usize,
    ) -> Option<f64> {
        let feature = geography.features().get(index)?;
        Statistics::mean(
            cells
                .into_iter()
                .filter(|cell| feature.contains(cell.point()))
                .filter(|cell| geography.membership_index(cell.point()) == Some(index))
                .map(|cell| cell.anom),
        )
    }

    /// Names of the states containing at least one of `cells`.
    pub fn states_touched_by<'a>(
        cells: impl IntoIterator<Item = &'a GridCell>,
        geography: &GeographyIndex,
    ) -> BTreeSet<String> {
        cells
            .into_iter()
            .filter_map(|cell| geography.membership(cell.point()))
            .map(|feature| feature.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::SpatialAnalysis;
    use foundation::math::{LonLat, MultiPolygon, Polygon};
    use scene::{DatasetStore, GeographyIndex, RawGridRow, StateFeature};

    fn rect_state(id: &str, name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> StateFeature {
        let ring = vec![
            LonLat::new(x0, y0),
            LonLat::new(x1, y0),
            LonLat::new(x1, y1),
            LonLat::new(x0, y1),
        ];
        StateFeature::new(id, name, MultiPolygon::new(vec![Polygon::new(ring, vec![])]))
    }

    fn geography() -> GeographyIndex {
        GeographyIndex::new(vec![
            rect_state("08", "Colorado", -109.0, 37.0, -102.0, 41.0),
            rect_state("36", "New York", -79.8, 40.5, -71.8, 45.0),
            rect_state("20", "Kansas", -102.0, 37.0, -94.6, 40.0),
        ])
    }

    fn store(cells: &[(f64, f64, f64)]) -> DatasetStore {
        DatasetStore::load(cells.iter().map(|&(lon, lat, anom)| RawGridRow {
            lon: Some(lon),
            lat: Some(lat),
            year: Some(2000),
            variable: Some("tas".into()),
            scenario: None,
            anom: Some(anom),
        }))
    }

    #[test]
    fn each_state_gets_the_mean_of_its_own_cells() {
        let ds = store(&[(-100.0, 39.0, 1.2), (-75.0, 42.0, -0.4), (-104.0, 38.0, 2.0), (-106.0, 40.0, 4.0)]);
        let means = SpatialAnalysis::mean_by_state(ds.cells(), &geography());
        assert_eq!(means.len(), 3);
        assert!((means["20"] - 1.2).abs() < 1e-12);
        assert!((means["36"] + 0.4).abs() < 1e-12);
        assert!((means["08"] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn states_without_cells_are_absent_not_zero() {
        let ds = store(&[(-75.0, 42.0, 0.0), (-60.0, 30.0, 9.0)]);
        let means = SpatialAnalysis::mean_by_state(ds.cells(), &geography());
        assert_eq!(means.keys().collect::<Vec<_>>(), vec!["36"]);
        assert_eq!(means["36"], 0.0);
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let ds = store(&[(-104.0, 38.0, 0.1), (-106.0, 40.0, 0.2), (-105.0, 39.0, 0.7), (-75.0, 42.0, 5.0)]);
        let forward = SpatialAnalysis::mean_by_state(ds.cells(), &geography());
        let backward = SpatialAnalysis::mean_by_state(ds.cells().iter().rev(), &geography());
        for (id, v) in &forward {
            let w = backward[id];
            assert!((v - w).abs() <= 1e-9 * v.abs().max(1.0));
        }
    }

    #[test]
    fn single_state_mean_matches_the_full_aggregation() {
        let ds = store(&[(-101.0, 38.0, 5.0), (-100.0, 39.0, 1.0), (-104.0, 38.0, 2.0), (-75.0, 42.0, 0.5)]);
        let geo = geography();
        let means = SpatialAnalysis::mean_by_state(ds.cells(), &geo);
        for (i, feature) in geo.features().iter().enumerate() {
            assert_eq!(
                SpatialAnalysis::mean_for_state(ds.cells(), &geo, i),
                means.get(&feature.id).copied()
            );
        }
        assert_eq!(SpatialAnalysis::mean_for_state(ds.cells(), &geo, 2), Some(3.0));
        assert_eq!(SpatialAnalysis::mean_for_state(ds.cells(), &geo, 9), None);
    }

    #[test]
    fn touched_states_are_distinct_names() {
        let ds = store(&[(-104.0, 38.0, 0.1), (-106.0, 40.0, 0.2), (-75.0, 42.0, 5.0), (-60.0, 30.0, 1.0)]);
        let names = SpatialAnalysis::states_touched_by(ds.cells(), &geography());
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["Colorado", "New York"]);
        assert!(SpatialAnalysis::states_touched_by(std::iter::empty(), &geography()).is_empty());
    }
}
