//! TopoJSON topology decoding.
//!
//! Arcs are shared between neighbouring polygons. A quantized topology stores
//! arc positions as integer deltas that are rebased per arc and mapped through
//! `transform`. Ring arc indices use one's complement (`!i`) for a reversed arc.

use foundation::math::{LonLat, MultiPolygon, Polygon};
use scene::StateFeature;
use serde_json::Value;
use tracing::debug;

use crate::geography::{GeographyError, feature_id, feature_name};
use crate::geojson::parse_position;

#[derive(Debug, Copy, Clone, PartialEq)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

/// Decodes the areal geometries of `object` into state features.
pub fn decode_topology(topology: &Value, object: &str) -> Result<Vec<StateFeature>, GeographyError> {
    let transform = parse_transform(topology.get("transform"))?;
    let arcs = decode_arcs(topology.get("arcs"), transform)?;

    let obj = topology
        .get("objects")
        .and_then(|o| o.get(object))
        .ok_or_else(|| GeographyError::MissingObject(object.to_string()))?;

    let mut geometries: Vec<&Value> = Vec::new();
    collect_geometries(obj, &mut geometries);

    let mut out = Vec::with_capacity(geometries.len());
    for (index, geom) in geometries.into_iter().enumerate() {
        let Some(polygons) = decode_area(geom, &arcs)
            .map_err(|reason| GeographyError::InvalidFeature { index, reason })?
        else {
            debug!(index, "skipping non-areal topology geometry");
            continue;
        };
        let id = feature_id(geom.get("id")).unwrap_or_else(|| index.to_string());
        let name = feature_name(geom.get("properties")).unwrap_or_else(|| id.clone());
        out.push(StateFeature::new(id, name, polygons));
    }
    Ok(out)
}

fn collect_geometries<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    if value.get("type").and_then(Value::as_str) == Some("GeometryCollection") {
        if let Some(children) = value.get("geometries").and_then(Value::as_array) {
            for child in children {
                collect_geometries(child, out);
            }
        }
    } else {
        out.push(value);
    }
}

fn parse_transform(value: Option<&Value>) -> Result<Option<Transform>, GeographyError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let pair = |key: &str| -> Result<[f64; 2], GeographyError> {
        let p = value
            .get(key)
            .map(parse_position)
            .transpose()
            .map_err(GeographyError::InvalidTopology)?
            .ok_or_else(|| GeographyError::InvalidTopology(format!("transform missing {key}")))?;
        Ok(p.as_array())
    };
    Ok(Some(Transform {
        scale: pair("scale")?,
        translate: pair("translate")?,
    }))
}

fn decode_arcs(value: Option<&Value>, transform: Option<Transform>) -> Result<Vec<Vec<LonLat>>, GeographyError> {
    let arcs = value
        .and_then(Value::as_array)
        .ok_or_else(|| GeographyError::InvalidTopology("missing arcs".into()))?;

    let mut out = Vec::with_capacity(arcs.len());
    for (arc_index, arc) in arcs.iter().enumerate() {
        let positions = arc.as_array().ok_or_else(|| {
            GeographyError::InvalidTopology(format!("arc {arc_index} is not an array"))
        })?;

        let mut points = Vec::with_capacity(positions.len());
        let (mut x, mut y) = (0.0, 0.0);
        for p in positions {
            let raw = parse_position(p)
                .map_err(|e| GeographyError::InvalidTopology(format!("arc {arc_index}: {e}")))?;
            let point = match transform {
                Some(t) => {
                    x += raw.lon;
                    y += raw.lat;
                    LonLat::new(
                        x * t.scale[0] + t.translate[0],
                        y * t.scale[1] + t.translate[1],
                    )
                }
                None => raw,
            };
            points.push(point);
        }
        out.push(points);
    }
    Ok(out)
}

fn decode_area(geom: &Value, arcs: &[Vec<LonLat>]) -> Result<Option<MultiPolygon>, String> {
    let ty = geom.get("type").and_then(Value::as_str);
    let geom_arcs = geom.get("arcs");
    match ty {
        Some("Polygon") => {
            let rings = decode_polygon(geom_arcs.ok_or("Polygon missing arcs")?, arcs)?;
            Ok(Polygon::from_rings(rings).map(|p| MultiPolygon::new(vec![p])))
        }
        Some("MultiPolygon") => {
            let polys = geom_arcs
                .and_then(Value::as_array)
                .ok_or("MultiPolygon arcs must be an array")?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                if let Some(p) = Polygon::from_rings(decode_polygon(poly, arcs)?) {
                    out.push(p);
                }
            }
            Ok(Some(MultiPolygon::new(out)))
        }
        _ => Ok(None),
    }
}

fn decode_polygon(value: &Value, arcs: &[Vec<LonLat>]) -> Result<Vec<Vec<LonLat>>, String> {
    let rings = value.as_array().ok_or("polygon arcs must be an array")?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        let indices = ring.as_array().ok_or("ring arcs must be an array")?;
        let mut points: Vec<LonLat> = Vec::new();
        for idx in indices {
            let i = idx.as_i64().ok_or("arc index must be an integer")?;
            append_arc(&mut points, i, arcs)?;
        }
        if points.len() < 4 && !points.is_empty() {
            points.push(points[0]);
        }
        out.push(points);
    }
    Ok(out)
}

/// Appends arc `i` to a ring, dropping the shared junction point.
fn append_arc(points: &mut Vec<LonLat>, i: i64, arcs: &[Vec<LonLat>]) -> Result<(), String> {
    let (index, reversed) = if i < 0 { (!i, true) } else { (i, false) };
    let arc = usize::try_from(index)
        .ok()
        .and_then(|ix| arcs.get(ix))
        .ok_or_else(|| format!("arc index {i} out of range"))?;

    points.pop();
    if reversed {
        points.extend(arc.iter().rev().copied());
    } else {
        points.extend(arc.iter().copied());
    }
    Ok(())
}
