//! Planar polygon containment in lon/lat degrees.
//!
//! Rings may be open or closed (first vertex repeated at the end); both are
//! handled identically by the even-odd crossing test.

use serde::{Deserialize, Serialize};

use super::LonLat;
use crate::bounds::Aabb2;

/// One polygon: an exterior ring plus zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<LonLat>,
    pub holes: Vec<Vec<LonLat>>,
}

impl Polygon {
    pub fn new(exterior: Vec<LonLat>, holes: Vec<Vec<LonLat>>) -> Self {
        Self { exterior, holes }
    }

    /// Builds a polygon from GeoJSON-style rings (first ring is the exterior).
    pub fn from_rings(mut rings: Vec<Vec<LonLat>>) -> Option<Self> {
        if rings.is_empty() {
            return None;
        }
        let exterior = rings.remove(0);
        Some(Self::new(exterior, rings))
    }

    pub fn contains(&self, p: LonLat) -> bool {
        ring_contains(&self.exterior, p) && !self.holes.iter().any(|h| ring_contains(h, p))
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        Aabb2::from_points(self.exterior.iter().map(LonLat::as_array))
    }
}

/// A set of polygons treated as one region (e.g. a state with islands).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon(pub Vec<Polygon>);

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self(polygons)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, p: LonLat) -> bool {
        self.0.iter().any(|poly| poly.contains(p))
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        self.0
            .iter()
            .filter_map(Polygon::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// Even-odd ray crossing test against a single ring.
pub fn ring_contains(ring: &[LonLat], p: LonLat) -> bool {
    if ring.len() < 3 || !p.is_finite() {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.lat > p.lat) != (b.lat > p.lat) {
            let x_cross = (b.lon - a.lon) * (p.lat - a.lat) / (b.lat - a.lat) + a.lon;
            if p.lon < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
