use std::fmt;
use std::path::PathBuf;

use formats::{GeographyError, GridCsvError};
use runtime::{Dashboard, DashboardError};
use scene::{DatasetStore, GeographyIndex};
use tracing::info;

use crate::config::ServerConfig;

/// Where a startup input comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Io { source: Source, err: std::io::Error },
    Http { source: Source, err: reqwest::Error },
    Grid(GridCsvError),
    Geography(GeographyError),
    Dashboard(DashboardError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { source, err } => write!(f, "failed to read {source}: {err}"),
            LoadError::Http { source, err } => write!(f, "failed to fetch {source}: {err}"),
            LoadError::Grid(e) => write!(f, "{e}"),
            LoadError::Geography(e) => write!(f, "{e}"),
            LoadError::Dashboard(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Reads a source into memory, from disk or over HTTP.
pub async fn fetch_text(client: &reqwest::Client, source: &Source) -> Result<String, LoadError> {
    match source {
        Source::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|err| LoadError::Io {
                source: source.clone(),
                err,
            }),
        Source::Url(url) => {
            let http_err = |err| LoadError::Http {
                source: source.clone(),
                err,
            };
            client
                .get(url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(http_err)?
                .text()
                .await
                .map_err(http_err)
        }
    }
}

pub async fn load_dataset(
    client: &reqwest::Client,
    source: &Source,
) -> Result<DatasetStore, LoadError> {
    let text = fetch_text(client, source).await?;
    let dataset = formats::parse_grid_csv_str(&text).map_err(LoadError::Grid)?;
    info!(%source, cells = dataset.len(), "grid dataset loaded");
    Ok(dataset)
}

pub async fn load_geography(
    client: &reqwest::Client,
    source: &Source,
    object: &str,
) -> Result<GeographyIndex, LoadError> {
    let text = fetch_text(client, source).await?;
    let geography = formats::parse_geography_str(&text, object).map_err(LoadError::Geography)?;
    info!(%source, states = geography.len(), "geography loaded");
    Ok(geography)
}

/// Loads both inputs concurrently; the dashboard is built only when both succeed.
pub async fn load_dashboard(
    client: &reqwest::Client,
    config: &ServerConfig,
) -> Result<Dashboard, LoadError> {
    let (dataset, geography) = tokio::try_join!(
        load_dataset(client, &config.grid_source),
        load_geography(client, &config.geo_source, &config.geo_object),
    )?;
    Dashboard::new(dataset, geography, config.dashboard.clone()).map_err(LoadError::Dashboard)
}
