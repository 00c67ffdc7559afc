use std::io;
use std::path::{Path, PathBuf};

use scene::{DatasetStore, RawGridRow};
use serde::Deserialize;

/// Columns every grid file must carry; `scenario` is optional.
pub const REQUIRED_COLUMNS: [&str; 5] = ["lon", "lat", "year", "variable", "anom"];

#[derive(Debug)]
pub enum GridCsvError {
    Io { path: PathBuf, source: io::Error },
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl std::fmt::Display for GridCsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridCsvError::Io { path, source } => {
                write!(f, "failed to read grid file {}: {source}", path.display())
            }
            GridCsvError::Csv(e) => write!(f, "grid CSV error: {e}"),
            GridCsvError::MissingColumn(c) => write!(f, "grid CSV is missing column `{c}`"),
        }
    }
}

impl std::error::Error for GridCsvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridCsvError::Io { source, .. } => Some(source),
            GridCsvError::Csv(e) => Some(e),
            GridCsvError::MissingColumn(_) => None,
        }
    }
}

impl From<csv::Error> for GridCsvError {
    fn from(e: csv::Error) -> Self {
        GridCsvError::Csv(e)
    }
}

// Unparseable numbers coerce to `None` instead of failing the whole file.
#[derive(Debug, Deserialize)]
struct GridRecord {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    lon: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    year: Option<f64>,
    #[serde(default)]
    variable: Option<String>,
    #[serde(default)]
    scenario: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    anom: Option<f64>,
}

impl From<GridRecord> for RawGridRow {
    fn from(r: GridRecord) -> Self {
        RawGridRow {
            lon: r.lon,
            lat: r.lat,
            year: r.year.and_then(whole_year),
            variable: r.variable,
            scenario: r.scenario,
            anom: r.anom,
        }
    }
}

fn whole_year(v: f64) -> Option<i32> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64).then_some(v as i32)
}

/// Reads grid rows from any CSV source with a header line.
pub fn read_grid_rows<R: io::Read>(reader: R) -> Result<Vec<RawGridRow>, GridCsvError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(GridCsvError::MissingColumn(column));
        }
    }

    let mut rows = Vec::new();
    for record in rdr.deserialize::<GridRecord>() {
        rows.push(record?.into());
    }
    Ok(rows)
}

pub fn parse_grid_csv_str(payload: &str) -> Result<DatasetStore, GridCsvError> {
    read_grid_rows(payload.as_bytes()).map(DatasetStore::load)
}

pub fn load_grid_csv(path: impl AsRef<Path>) -> Result<DatasetStore, GridCsvError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| GridCsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_grid_rows(io::BufReader::new(file)).map(DatasetStore::load)
}
