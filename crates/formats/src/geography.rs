use std::path::{Path, PathBuf};

use scene::{GeographyIndex, StateFeature};
use serde_json::Value;
use tracing::info;

/// Default TopoJSON object holding state boundaries in the us-atlas topology.
pub const DEFAULT_STATES_OBJECT: &str = "states";

#[derive(Debug)]
pub enum GeographyError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    UnsupportedType(String),
    MissingObject(String),
    InvalidTopology(String),
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for GeographyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeographyError::Io { path, source } => {
                write!(f, "failed to read geography {}: {source}", path.display())
            }
            GeographyError::Json(e) => write!(f, "geography JSON parse error: {e}"),
            GeographyError::UnsupportedType(t) => {
                write!(f, "expected Topology or FeatureCollection, got {t}")
            }
            GeographyError::MissingObject(name) => {
                write!(f, "topology has no object named `{name}`")
            }
            GeographyError::InvalidTopology(reason) => write!(f, "invalid topology: {reason}"),
            GeographyError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for GeographyError {}

/// Decodes state boundaries from either a TopoJSON topology (reading
/// `object`) or a GeoJSON FeatureCollection.
pub fn decode_state_features(value: &Value, object: &str) -> Result<Vec<StateFeature>, GeographyError> {
    let ty = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("<missing>");
    match ty {
        "Topology" => crate::topojson::decode_topology(value, object),
        "FeatureCollection" => crate::geojson::decode_feature_collection(value),
        other => Err(GeographyError::UnsupportedType(other.to_string())),
    }
}

pub fn parse_geography_str(payload: &str, object: &str) -> Result<GeographyIndex, GeographyError> {
    let value: Value = serde_json::from_str(payload).map_err(GeographyError::Json)?;
    let features = decode_state_features(&value, object)?;
    info!(features = features.len(), "geography decoded");
    Ok(GeographyIndex::new(features))
}

pub fn load_geography(path: impl AsRef<Path>, object: &str) -> Result<GeographyIndex, GeographyError> {
    let path = path.as_ref();
    let payload = std::fs::read_to_string(path).map_err(|source| GeographyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_geography_str(&payload, object)
}

/// Feature id as a string; numeric ids are rendered without a fraction.
pub(crate) fn feature_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn feature_name(properties: Option<&Value>) -> Option<String> {
    properties?
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{GeographyError, parse_geography_str};

    #[test]
    fn rejects_unknown_document_type() {
        let err = parse_geography_str(r#"{"type":"Feature"}"#, "states").unwrap_err();
        assert!(matches!(err, GeographyError::UnsupportedType(t) if t == "Feature"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_geography_str("{not json", "states").unwrap_err();
        assert!(matches!(err, GeographyError::Json(_)));
    }
}
