use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in a planar coordinate space.
///
/// Used both for map pixel rectangles (brush selections, clip extents) and for
/// lon/lat bounds of state polygons. Edges are inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Builds a rectangle from two opposite corners given in any order.
    pub fn from_corners(a: [f64; 2], b: [f64; 2]) -> Self {
        Aabb2 {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    /// Smallest rectangle containing every point, or `None` for an empty slice.
    pub fn from_points(points: impl IntoIterator<Item = [f64; 2]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Aabb2::new(first, first);
        for p in iter {
            out.min[0] = out.min[0].min(p[0]);
            out.min[1] = out.min[1].min(p[1]);
            out.max[0] = out.max[0].max(p[0]);
            out.max[1] = out.max[1].max(p[1]);
        }
        Some(out)
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// True when the rectangle encloses no area (a click rather than a drag).
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    pub fn contains(&self, p: [f64; 2]) -> bool {
        self.min[0] <= p[0] && p[0] <= self.max[0] && self.min[1] <= p[1] && p[1] <= self.max[1]
    }

    pub fn union(&self, other: &Aabb2) -> Aabb2 {
        Aabb2::new(
            [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        )
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn from_corners_normalizes_drag_direction() {
        let r = Aabb2::from_corners([10.0, 40.0], [2.0, 5.0]);
        assert_eq!(r.min, [2.0, 5.0]);
        assert_eq!(r.max, [10.0, 40.0]);
    }

    #[test]
    fn contains_is_edge_inclusive() {
        let r = Aabb2::new([0.0, 0.0], [10.0, 10.0]);
        assert!(r.contains([0.0, 10.0]));
        assert!(r.contains([5.0, 5.0]));
        assert!(!r.contains([10.0001, 5.0]));
    }

    #[test]
    fn degenerate_when_zero_area() {
        assert!(Aabb2::new([3.0, 3.0], [3.0, 9.0]).is_degenerate());
        assert!(!Aabb2::new([3.0, 3.0], [4.0, 9.0]).is_degenerate());
    }

    #[test]
    fn from_points_covers_every_point() {
        let a = Aabb2::from_points([[0.0, 0.0], [2.0, -1.0], [1.0, 3.0]]).unwrap();
        assert_eq!(a.min, [0.0, -1.0]);
        assert_eq!(a.max, [2.0, 3.0]);
        assert!(Aabb2::from_points(std::iter::empty()).is_none());
    }
}
