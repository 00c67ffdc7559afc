//! Map projections from lon/lat degrees to map pixels.
//!
//! Pixel space has `x` growing right and `y` growing down, with the origin in
//! the top-left corner of the map surface.

use core::f64::consts::PI;

use super::LonLat;
use crate::bounds::Aabb2;

const TAU: f64 = 2.0 * PI;
const EPSILON: f64 = 1e-6;

pub trait Projection {
    /// Forward projection; `None` when the point falls outside the visible area.
    fn project(&self, p: LonLat) -> Option<[f64; 2]>;

    /// Inverse projection; `None` when the pixel has no geographic preimage.
    fn invert(&self, xy: [f64; 2]) -> Option<LonLat>;
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum RawConic {
    EqualArea { n: f64, c: f64, r0: f64 },
    // Degenerate case: standard parallels symmetric around the equator.
    Cylindrical { cos_phi0: f64 },
}

impl RawConic {
    fn new(phi0: f64, phi1: f64) -> Self {
        let sy0 = phi0.sin();
        let n = (sy0 + phi1.sin()) / 2.0;
        if n.abs() < EPSILON {
            return RawConic::Cylindrical {
                cos_phi0: phi0.cos(),
            };
        }
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        RawConic::EqualArea {
            n,
            c,
            r0: c.sqrt() / n,
        }
    }

    fn forward(&self, lambda: f64, phi: f64) -> [f64; 2] {
        match *self {
            RawConic::EqualArea { n, c, r0 } => {
                let r = (c - 2.0 * n * phi.sin()).sqrt() / n;
                let x = lambda * n;
                [r * x.sin(), r0 - r * x.cos()]
            }
            RawConic::Cylindrical { cos_phi0 } => [lambda * cos_phi0, phi.sin() / cos_phi0],
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        let (lambda, sin_phi) = match *self {
            RawConic::EqualArea { n, c, r0 } => {
                let r0y = r0 - y;
                let mut l = x.atan2(r0y.abs()) * sign(r0y);
                if r0y * n < 0.0 {
                    l -= PI * sign(x) * sign(r0y);
                }
                (l / n, (c - (x * x + r0y * r0y) * n * n) / (2.0 * n))
            }
            RawConic::Cylindrical { cos_phi0 } => (x / cos_phi0, y * cos_phi0),
        };
        if !(-1.0..=1.0).contains(&sin_phi) || !lambda.is_finite() {
            return None;
        }
        Some([lambda, sin_phi.asin()])
    }
}

/// Albers conic equal-area projection with rotation, centring and an optional
/// pixel clip rectangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConicEqualArea {
    raw: RawConic,
    rotate_rad: f64,
    raw_center: [f64; 2],
    scale: f64,
    translate: [f64; 2],
    clip: Option<Aabb2>,
}

impl ConicEqualArea {
    /// `parallels` are the two standard parallels in degrees; `rotate` is the
    /// longitude rotation in degrees; `center` is given in the rotated frame.
    pub fn new(parallels: [f64; 2], rotate: f64, center: LonLat) -> Self {
        let raw = RawConic::new(parallels[0].to_radians(), parallels[1].to_radians());
        let raw_center = raw.forward(center.lon.to_radians(), center.lat.to_radians());
        Self {
            raw,
            rotate_rad: rotate.to_radians(),
            raw_center,
            scale: 1.0,
            translate: [0.0, 0.0],
            clip: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, translate: [f64; 2]) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_clip(mut self, clip: Aabb2) -> Self {
        self.clip = Some(clip);
        self
    }
}

impl Projection for ConicEqualArea {
    fn project(&self, p: LonLat) -> Option<[f64; 2]> {
        if !p.is_finite() {
            return None;
        }
        let lambda = wrap_lambda(p.lon.to_radians() + self.rotate_rad);
        let [px, py] = self.raw.forward(lambda, p.lat.to_radians());
        let x = self.translate[0] + self.scale * (px - self.raw_center[0]);
        let y = self.translate[1] - self.scale * (py - self.raw_center[1]);
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        if let Some(clip) = self.clip
            && !clip.contains([x, y])
        {
            return None;
        }
        Some([x, y])
    }

    fn invert(&self, xy: [f64; 2]) -> Option<LonLat> {
        let x = (xy[0] - self.translate[0]) / self.scale + self.raw_center[0];
        let y = (self.translate[1] - xy[1]) / self.scale + self.raw_center[1];
        let [lambda, phi] = self.raw.inverse(x, y)?;
        let lon = wrap_lambda(lambda - self.rotate_rad);
        Some(LonLat::new(lon.to_degrees(), phi.to_degrees()))
    }
}

/// Composite projection of the United States: the lower 48 states with Alaska
/// and Hawaii drawn as insets below the south-west corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AlbersUsa {
    lower48: ConicEqualArea,
    alaska: ConicEqualArea,
    hawaii: ConicEqualArea,
    scale: f64,
    translate: [f64; 2],
}

impl AlbersUsa {
    pub fn new(scale: f64, translate: [f64; 2]) -> Self {
        let k = scale;
        let [x, y] = translate;

        let lower48 = ConicEqualArea::new([29.5, 45.5], 96.0, LonLat::new(-0.6, 38.7))
            .with_scale(k)
            .with_translate(translate)
            .with_clip(Aabb2::new(
                [x - 0.455 * k, y - 0.238 * k],
                [x + 0.455 * k, y + 0.238 * k],
            ));

        let alaska = ConicEqualArea::new([55.0, 65.0], 154.0, LonLat::new(-2.0, 58.5))
            .with_scale(k * 0.35)
            .with_translate([x - 0.307 * k, y + 0.201 * k])
            .with_clip(Aabb2::new(
                [x - 0.425 * k + EPSILON, y + 0.120 * k + EPSILON],
                [x - 0.214 * k - EPSILON, y + 0.234 * k - EPSILON],
            ));

        let hawaii = ConicEqualArea::new([8.0, 18.0], 157.0, LonLat::new(-3.0, 19.9))
            .with_scale(k)
            .with_translate([x - 0.205 * k, y + 0.212 * k])
            .with_clip(Aabb2::new(
                [x - 0.214 * k + EPSILON, y + 0.166 * k + EPSILON],
                [x - 0.115 * k - EPSILON, y + 0.234 * k - EPSILON],
            ));

        Self {
            lower48,
            alaska,
            hawaii,
            scale,
            translate,
        }
    }

    /// Projection centred on a map surface of the given pixel size.
    pub fn centered(scale: f64, width: f64, height: f64) -> Self {
        Self::new(scale, [width / 2.0, height / 2.0])
    }
}

impl Projection for AlbersUsa {
    fn project(&self, p: LonLat) -> Option<[f64; 2]> {
        self.lower48
            .project(p)
            .or_else(|| self.alaska.project(p))
            .or_else(|| self.hawaii.project(p))
    }

    fn invert(&self, xy: [f64; 2]) -> Option<LonLat> {
        let k = self.scale;
        let x = (xy[0] - self.translate[0]) / k;
        let y = (xy[1] - self.translate[1]) / k;

        let inset = if (0.120..0.234).contains(&y) && (-0.425..-0.214).contains(&x) {
            &self.alaska
        } else if (0.166..0.234).contains(&y) && (-0.214..-0.115).contains(&x) {
            &self.hawaii
        } else {
            &self.lower48
        };
        inset.invert(xy)
    }
}

fn wrap_lambda(lambda: f64) -> f64 {
    if lambda > PI {
        lambda - TAU
    } else if lambda < -PI {
        lambda + TAU
    } else {
        lambda
    }
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
