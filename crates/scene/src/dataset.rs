use std::collections::BTreeSet;

use foundation::math::normalize_lon180;
use tracing::{info, warn};

use crate::cell::{GridCell, Scenario, Variable, scenario_for_year};

/// One source row after type coercion, before validation.
///
/// Every field is optional because the tabular source is loosely typed; the
/// store decides which gaps are fatal for a row and which are tolerated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGridRow {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub year: Option<i32>,
    pub variable: Option<String>,
    pub scenario: Option<String>,
    pub anom: Option<f64>,
}

/// Counters collected while loading rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub cells: usize,
    /// Rows dropped for a missing coordinate, year or a variable other than tas/pr.
    pub skipped_rows: usize,
    /// Rows kept with `anom = NaN`.
    pub missing_anom: usize,
    /// Rows whose scenario column disagreed with the year rule.
    pub scenario_mismatches: usize,
}

/// Read-only store of every grid cell plus the derived year list.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    cells: Vec<GridCell>,
    years: Vec<i32>,
    report: LoadReport,
}

impl DatasetStore {
    pub fn load(rows: impl IntoIterator<Item = RawGridRow>) -> Self {
        let mut report = LoadReport::default();
        let mut cells = Vec::new();

        for row in rows {
            report.rows += 1;
            let (Some(lon), Some(lat), Some(year)) = (row.lon, row.lat, row.year) else {
                report.skipped_rows += 1;
                continue;
            };
            if !(lon.is_finite() && lat.is_finite()) {
                report.skipped_rows += 1;
                continue;
            }
            let Some(variable) = row.variable.as_deref().and_then(Variable::parse) else {
                report.skipped_rows += 1;
                continue;
            };

            let scenario = scenario_for_year(year);
            if let Some(stored) = row.scenario.as_deref()
                && !stored.trim().is_empty()
                && Scenario::parse(stored) != Some(scenario)
            {
                report.scenario_mismatches += 1;
            }

            let anom = match row.anom {
                Some(v) if v.is_finite() => v,
                _ => {
                    report.missing_anom += 1;
                    f64::NAN
                }
            };

            cells.push(GridCell {
                year,
                scenario,
                variable,
                lon,
                lon180: normalize_lon180(lon),
                lat,
                anom,
            });
        }

        report.cells = cells.len();
        let years: Vec<i32> = cells
            .iter()
            .map(|c| c.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        info!(
            rows = report.rows,
            cells = report.cells,
            years = years.len(),
            skipped = report.skipped_rows,
            missing_anom = report.missing_anom,
            "grid dataset loaded"
        );
        if report.scenario_mismatches > 0 {
            warn!(
                count = report.scenario_mismatches,
                "scenario column disagrees with year rule; using year-derived scenario"
            );
        }

        Self {
            cells,
            years,
            report,
        }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    /// Ascending, de-duplicated list of every year present.
    pub fn distinct_years_ascending(&self) -> &[i32] {
        &self.years
    }

    pub fn year_at(&self, index: usize) -> Option<i32> {
        self.years.get(index).copied()
    }

    pub fn index_of_year(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    /// All cells for one variable across every year and scenario.
    pub fn for_variable(&self, variable: Variable) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells.iter().filter(move |c| c.variable == variable)
    }

    /// Cells for one displayed slice: a year, its scenario and a variable.
    pub fn slice(&self, year: i32, variable: Variable) -> impl Iterator<Item = &GridCell> + '_ {
        let scenario = scenario_for_year(year);
        self.cells
            .iter()
            .filter(move |c| c.year == year && c.scenario == scenario && c.variable == variable)
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetStore, RawGridRow};
    use crate::cell::{Scenario, Variable};

    fn row(lon: f64, lat: f64, year: i32, variable: &str, anom: Option<f64>) -> RawGridRow {
        RawGridRow {
            lon: Some(lon),
            lat: Some(lat),
            year: Some(year),
            variable: Some(variable.to_string()),
            scenario: None,
            anom,
        }
    }

    #[test]
    fn normalizes_longitude_and_derives_scenario() {
        let store = DatasetStore::load(vec![
            row(260.0, 40.0, 2014, "tas", Some(1.0)),
            row(-75.0, 42.0, 2015, "tas", Some(2.0)),
        ]);
        let cells = store.cells();
        assert_eq!(cells[0].lon, 260.0);
        assert_eq!(cells[0].lon180, -100.0);
        assert_eq!(cells[0].scenario, Scenario::Historical);
        assert_eq!(cells[1].lon180, -75.0);
        assert_eq!(cells[1].scenario, Scenario::Ssp585);
    }

    #[test]
    fn years_are_sorted_and_unique() {
        let store = DatasetStore::load(vec![
            row(-100.0, 40.0, 2050, "tas", Some(1.0)),
            row(-100.0, 40.0, 1950, "pr", Some(1.0)),
            row(-101.0, 40.0, 2050, "pr", Some(1.0)),
            row(-100.0, 40.0, 2000, "tas", Some(1.0)),
        ]);
        assert_eq!(store.distinct_years_ascending(), &[1950, 2000, 2050]);
        assert_eq!(store.year_at(1), Some(2000));
        assert_eq!(store.year_at(3), None);
        assert_eq!(store.index_of_year(2050), Some(2));
    }

    #[test]
    fn missing_anom_becomes_nan_and_bad_rows_are_skipped() {
        let mut no_year = row(-100.0, 40.0, 2000, "tas", Some(1.0));
        no_year.year = None;
        let store = DatasetStore::load(vec![
            row(-100.0, 40.0, 2000, "tas", None),
            row(-100.0, 40.0, 2000, "huss", Some(1.0)),
            no_year,
        ]);
        assert_eq!(store.len(), 1);
        assert!(store.cells()[0].anom.is_nan());
        assert!(!store.cells()[0].has_value());

        let report = store.report();
        assert_eq!(report.rows, 3);
        assert_eq!(report.skipped_rows, 2);
        assert_eq!(report.missing_anom, 1);
    }

    #[test]
    fn contradicting_scenario_column_is_counted_not_trusted() {
        let mut r = row(-100.0, 40.0, 2000, "tas", Some(1.0));
        r.scenario = Some("ssp585".to_string());
        let store = DatasetStore::load(vec![r]);
        assert_eq!(store.report().scenario_mismatches, 1);
        assert_eq!(store.cells()[0].scenario, Scenario::Historical);
    }

    #[test]
    fn slice_filters_year_and_variable() {
        let store = DatasetStore::load(vec![
            row(-100.0, 40.0, 2000, "tas", Some(1.0)),
            row(-100.0, 40.0, 2000, "pr", Some(5.0)),
            row(-100.0, 40.0, 2001, "tas", Some(2.0)),
        ]);
        let tas_2000: Vec<f64> = store.slice(2000, Variable::Tas).map(|c| c.anom).collect();
        assert_eq!(tas_2000, vec![1.0]);
        assert_eq!(store.for_variable(Variable::Tas).count(), 2);
    }
}
