use std::collections::HashMap;

use foundation::bounds::Aabb2;
use foundation::math::{LonLat, MultiPolygon};
use tracing::{debug, warn};

use crate::spatial::{Bvh, Item as BvhItem};

/// A named state boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct StateFeature {
    pub id: String,
    pub name: String,
    pub geometry: MultiPolygon,
    bounds: Option<Aabb2>,
}

impl StateFeature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, geometry: MultiPolygon) -> Self {
        let bounds = geometry.bounds();
        Self {
            id: id.into(),
            name: name.into(),
            geometry,
            bounds,
        }
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        self.bounds
    }

    pub fn contains(&self, p: LonLat) -> bool {
        match self.bounds {
            Some(b) if b.contains(p.as_array()) => self.geometry.contains(p),
            _ => false,
        }
    }
}

/// Immutable state boundaries with point membership lookup.
///
/// `membership` consults a BVH over feature bounds and then runs the exact
/// polygon test on the candidates in feature order, so it always agrees with
/// `membership_linear`, the reference scan over every feature.
#[derive(Debug, Clone, Default)]
pub struct GeographyIndex {
    features: Vec<StateFeature>,
    by_id: HashMap<String, usize>,
    bvh: Bvh,
}

impl GeographyIndex {
    pub fn new(features: Vec<StateFeature>) -> Self {
        let mut by_id = HashMap::with_capacity(features.len());
        let mut items = Vec::with_capacity(features.len());

        for (i, f) in features.iter().enumerate() {
            if by_id.contains_key(&f.id) {
                warn!(id = %f.id, "duplicate state id; keeping the first feature");
            } else {
                by_id.insert(f.id.clone(), i);
            }
            if let Some(bounds) = f.bounds() {
                items.push(BvhItem {
                    index: i as u32,
                    bounds,
                });
            }
        }

        debug!(features = features.len(), "geography index built");
        Self {
            features,
            by_id,
            bvh: Bvh::build(items),
        }
    }

    pub fn features(&self) -> &[StateFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StateFeature> {
        self.by_id.get(id).map(|&i| &self.features[i])
    }

    /// First feature (in load order) containing `p`, or `None` over water or
    /// outside the covered area.
    pub fn membership(&self, p: LonLat) -> Option<&StateFeature> {
        self.membership_index(p).map(|i| &self.features[i])
    }

    pub fn membership_index(&self, p: LonLat) -> Option<usize> {
        if !p.is_finite() {
            return None;
        }
        self.bvh
            .query_point(p.as_array())
            .into_iter()
            .map(|i| i as usize)
            .find(|&i| self.features[i].contains(p))
    }

    /// Linear scan over every feature; O(features) per point.
    pub fn membership_linear(&self, p: LonLat) -> Option<&StateFeature> {
        self.features.iter().find(|f| f.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::{GeographyIndex, StateFeature};
    use foundation::math::{LonLat, MultiPolygon, Polygon};

    fn rect_state(id: &str, name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> StateFeature {
        let ring = vec![
            LonLat::new(x0, y0),
            LonLat::new(x1, y0),
            LonLat::new(x1, y1),
            LonLat::new(x0, y1),
            LonLat::new(x0, y0),
        ];
        StateFeature::new(id, name, MultiPolygon::new(vec![Polygon::new(ring, vec![])]))
    }

    fn index() -> GeographyIndex {
        GeographyIndex::new(vec![
            rect_state("08", "Colorado", -109.0, 37.0, -102.0, 41.0),
            rect_state("20", "Kansas", -102.0, 37.0, -94.6, 40.0),
            rect_state("36", "New York", -79.8, 40.5, -71.8, 45.0),
        ])
    }

    #[test]
    fn membership_finds_containing_state() {
        let geo = index();
        assert_eq!(geo.membership(LonLat::new(-105.0, 39.0)).unwrap().name, "Colorado");
        assert_eq!(geo.membership(LonLat::new(-75.0, 42.0)).unwrap().id, "36");
        assert!(geo.membership(LonLat::new(-60.0, 30.0)).is_none());
    }

    #[test]
    fn shared_edge_resolves_to_first_feature_like_linear_scan() {
        let geo = index();
        let p = LonLat::new(-102.0, 38.0);
        let fast = geo.membership(p).map(|f| f.id.clone());
        let slow = geo.membership_linear(p).map(|f| f.id.clone());
        assert_eq!(fast, slow);
    }

    #[test]
    fn lookup_by_id() {
        let geo = index();
        assert_eq!(geo.get("20").unwrap().name, "Kansas");
        assert!(geo.get("99").is_none());
        assert_eq!(geo.len(), 3);
    }
}
