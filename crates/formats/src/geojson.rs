use foundation::math::{LonLat, MultiPolygon, Polygon};
use scene::StateFeature;
use serde_json::Value;
use tracing::debug;

use crate::geography::{GeographyError, feature_id, feature_name};

/// Polygon and MultiPolygon features of a FeatureCollection.
///
/// Features with other geometry types (or a null geometry) are skipped.
pub fn decode_feature_collection(value: &Value) -> Result<Vec<StateFeature>, GeographyError> {
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| GeographyError::UnsupportedType("FeatureCollection without features".into()))?;

    let mut out = Vec::with_capacity(features.len());
    for (index, feat) in features.iter().enumerate() {
        let geometry = feat.get("geometry").unwrap_or(&Value::Null);
        let Some(polygons) = parse_area_geometry(geometry)
            .map_err(|reason| GeographyError::InvalidFeature { index, reason })?
        else {
            debug!(index, "skipping non-areal feature");
            continue;
        };

        let id = feature_id(feat.get("id")).unwrap_or_else(|| index.to_string());
        let name = feature_name(feat.get("properties")).unwrap_or_else(|| id.clone());
        out.push(StateFeature::new(id, name, polygons));
    }
    Ok(out)
}

fn parse_area_geometry(geometry: &Value) -> Result<Option<MultiPolygon>, String> {
    let Some(ty) = geometry.get("type").and_then(Value::as_str) else {
        return Ok(None);
    };
    let coords = geometry.get("coordinates");
    match ty {
        "Polygon" => {
            let rings = parse_rings(coords.ok_or("Polygon missing coordinates")?)?;
            Ok(Polygon::from_rings(rings).map(|p| MultiPolygon::new(vec![p])))
        }
        "MultiPolygon" => {
            let polys = coords
                .and_then(Value::as_array)
                .ok_or("MultiPolygon coordinates must be an array")?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                if let Some(p) = Polygon::from_rings(parse_rings(poly)?) {
                    out.push(p);
                }
            }
            Ok(Some(MultiPolygon::new(out)))
        }
        _ => Ok(None),
    }
}

fn parse_rings(value: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    let rings = value.as_array().ok_or("rings must be an array")?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        let positions = ring.as_array().ok_or("ring must be an array")?;
        let mut points = Vec::with_capacity(positions.len());
        for p in positions {
            points.push(parse_position(p)?);
        }
        out.push(points);
    }
    Ok(out)
}

pub(crate) fn parse_position(value: &Value) -> Result<LonLat, String> {
    let arr = value.as_array().ok_or("position must be an array")?;
    let lon = arr.first().and_then(Value::as_f64).ok_or("position missing lon")?;
    let lat = arr.get(1).and_then(Value::as_f64).ok_or("position missing lat")?;
    Ok(LonLat::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::decode_feature_collection;
    use foundation::math::LonLat;
    use serde_json::json;

    #[test]
    fn decodes_polygons_and_multipolygons() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "08",
                    "properties": {"name": "Colorado"},
                    "geometry": {"type": "Polygon", "coordinates": [[[-109, 37], [-102, 37], [-102, 41], [-109, 41], [-109, 37]]]}
                },
                {
                    "type": "Feature",
                    "id": 15,
                    "properties": {"name": "Hawaii"},
                    "geometry": {"type": "MultiPolygon", "coordinates": [
                        [[[-156, 19], [-155, 19], [-155, 20], [-156, 20], [-156, 19]]],
                        [[[-158, 21], [-157.5, 21], [-157.5, 21.5], [-158, 21.5], [-158, 21]]]
                    ]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "A point"},
                    "geometry": {"type": "Point", "coordinates": [0, 0]}
                }
            ]
        });

        let features = decode_feature_collection(&fc).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id, "08");
        assert_eq!(features[1].id, "15");
        assert_eq!(features[1].geometry.polygons().len(), 2);
        assert!(features[1].contains(LonLat::new(-157.75, 21.25)));
        assert!(features[0].contains(LonLat::new(-105.0, 39.0)));
    }

    #[test]
    fn malformed_position_is_reported_with_index() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[["x", 1]]]}}]
        });
        let err = decode_feature_collection(&fc).unwrap_err();
        assert!(err.to_string().contains("index 0"));
    }
}
