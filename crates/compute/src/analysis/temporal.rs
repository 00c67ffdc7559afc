use std::collections::BTreeMap;

use scene::GridCell;
use serde::Serialize;

/// One point of a year-ordered anomaly series.
///
/// `value` is `None` when every cell of that year lacks an anomaly.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: Option<f64>,
}

pub struct TemporalAnalysis;

impl TemporalAnalysis {
    /// Mean anomaly per year, ascending, one point per distinct year present.
    ///
    /// Scenario is not a grouping key: a year belongs to exactly one scenario.
    pub fn series_by_year<'a>(cells: impl IntoIterator<Item = &'a GridCell>) -> Vec<SeriesPoint> {
        let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for cell in cells {
            let acc = by_year.entry(cell.year).or_insert((0.0, 0));
            if cell.has_value() {
                acc.0 += cell.anom;
                acc.1 += 1;
            }
        }
        by_year
            .into_iter()
            .map(|(year, (sum, count))| SeriesPoint {
                year,
                value: (count > 0).then(|| sum / count as f64),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{SeriesPoint, TemporalAnalysis};
    use scene::{DatasetStore, RawGridRow};

    fn store(rows: &[(i32, f64, Option<f64>)]) -> DatasetStore {
        DatasetStore::load(rows.iter().map(|&(year, lon, anom)| RawGridRow {
            lon: Some(lon),
            lat: Some(40.0),
            year: Some(year),
            variable: Some("tas".into()),
            scenario: None,
            anom,
        }))
    }

    #[test]
    fn averages_cells_sharing_a_year() {
        let ds = store(&[(2000, -100.0, Some(1.2)), (2000, -75.0, Some(-0.4))]);
        let series = TemporalAnalysis::series_by_year(ds.cells());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].year, 2000);
        assert!((series[0].value.unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn strictly_ascending_without_duplicates() {
        let ds = store(&[
            (2050, -100.0, Some(3.0)),
            (1950, -100.0, Some(-1.0)),
            (2014, -100.0, Some(0.5)),
            (2050, -90.0, Some(1.0)),
            (2015, -90.0, Some(0.7)),
        ]);
        let series = TemporalAnalysis::series_by_year(ds.cells());
        let years: Vec<i32> = series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1950, 2014, 2015, 2050]);
        assert_eq!(series[3], SeriesPoint { year: 2050, value: Some(2.0) });
    }

    #[test]
    fn empty_in_empty_out_and_missing_year_is_explicit() {
        assert!(TemporalAnalysis::series_by_year(std::iter::empty()).is_empty());

        let ds = store(&[(2000, -100.0, None)]);
        let series = TemporalAnalysis::series_by_year(ds.cells());
        assert_eq!(series, vec![SeriesPoint { year: 2000, value: None }]);
    }
}
