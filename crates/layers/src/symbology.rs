use compute::Statistics;
use scene::GridCell;
use serde::Serialize;

/// Fill for regions without an aggregate value.
pub const NO_DATA_FILL: &str = "#f0f0f0";

/// Fraction of the slice's extreme magnitude used as the color span. Values
/// beyond it saturate, which keeps contrast for typical anomalies.
pub const COLOR_COMPRESSION: f64 = 0.6;

/// RdBu, 11 classes, red (warm / wet surplus) to blue.
const RD_BU: [&str; 11] = [
    "67001f", "b2182b", "d6604d", "f4a582", "fddbc7", "f7f7f7", "d1e5f0", "92c5de", "4393c3",
    "2166ac", "053061",
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Samples the RdBu ramp at `t` in [0, 1] (clamped) with a uniform cubic
/// B-spline through the scheme's colors, per RGB channel.
pub fn interpolate_rd_bu(t: f64) -> Rgb {
    let stops: Vec<Rgb> = RD_BU.iter().filter_map(|h| Rgb::from_hex(h)).collect();
    let channel = |f: fn(&Rgb) -> u8| {
        let values: Vec<f64> = stops.iter().map(|c| f(c) as f64).collect();
        basis_spline(&values, t).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(channel(|c| c.r), channel(|c| c.g), channel(|c| c.b))
}

fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t.is_nan() || t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };

    let t1 = (t - i as f64 / n as f64) * n as f64;
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// Symmetric color domain `(-span, span)` for a displayed slice.
///
/// `span` is `COLOR_COMPRESSION` times the largest absolute anomaly; a slice
/// with no non-zero value falls back to a magnitude of 1.
pub fn color_domain<'a>(cells: impl IntoIterator<Item = &'a GridCell>) -> (f64, f64) {
    let max_abs = Statistics::max_abs(cells.into_iter().map(|c| c.anom))
        .filter(|m| *m > 0.0)
        .unwrap_or(1.0);
    let span = max_abs * COLOR_COMPRESSION;
    (-span, span)
}

/// Diverging scale: `+span` maps to the red end, zero to the neutral middle
/// and `-span` to the blue end. Values outside the domain saturate.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DivergingScale {
    pub span: f64,
}

impl DivergingScale {
    pub fn new(span: f64) -> Self {
        Self { span }
    }

    pub fn from_domain(domain: (f64, f64)) -> Self {
        Self::new(domain.0.abs().max(domain.1.abs()))
    }

    pub fn domain(&self) -> [f64; 2] {
        [-self.span, self.span]
    }

    /// Position on the ramp in [0, 1].
    pub fn ramp_position(&self, value: f64) -> f64 {
        if !(self.span > 0.0) {
            return 0.5;
        }
        (0.5 - value / (2.0 * self.span)).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        interpolate_rd_bu(self.ramp_position(value))
    }

    /// Fill string for an optional aggregate; missing values get `NO_DATA_FILL`.
    pub fn fill(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if v.is_finite() => self.color(v).to_hex(),
            _ => NO_DATA_FILL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DivergingScale, NO_DATA_FILL, Rgb, color_domain, interpolate_rd_bu};
    use scene::{DatasetStore, RawGridRow};

    fn cells(anoms: &[Option<f64>]) -> DatasetStore {
        DatasetStore::load(anoms.iter().map(|&anom| RawGridRow {
            lon: Some(-100.0),
            lat: Some(40.0),
            year: Some(2000),
            variable: Some("tas".into()),
            scenario: None,
            anom,
        }))
    }

    #[test]
    fn ramp_endpoints_are_scheme_extremes() {
        assert_eq!(interpolate_rd_bu(0.0).to_hex(), "#67001f");
        assert_eq!(interpolate_rd_bu(1.0).to_hex(), "#053061");
        assert_eq!(interpolate_rd_bu(-3.0), interpolate_rd_bu(0.0));
        assert_eq!(interpolate_rd_bu(7.0), interpolate_rd_bu(1.0));
    }

    #[test]
    fn ramp_midpoint_is_near_neutral() {
        let mid = interpolate_rd_bu(0.5);
        for c in [mid.r, mid.g, mid.b] {
            assert!(c > 230, "{mid:?}");
        }
    }

    #[test]
    fn domain_is_symmetric_and_compressed() {
        let ds = cells(&[Some(2.0), Some(-5.0), None]);
        let (lo, hi) = color_domain(ds.cells());
        assert!((hi - 3.0).abs() < 1e-12);
        assert_eq!(lo, -hi);
    }

    #[test]
    fn domain_falls_back_when_slice_is_flat_or_empty() {
        let ds = cells(&[Some(0.0)]);
        assert_eq!(color_domain(ds.cells()), (-0.6, 0.6));
        assert_eq!(color_domain(std::iter::empty()), (-0.6, 0.6));
    }

    #[test]
    fn positive_anomalies_are_red_and_saturate() {
        let scale = DivergingScale::new(3.0);
        assert_eq!(scale.ramp_position(3.0), 0.0);
        assert_eq!(scale.ramp_position(0.0), 0.5);
        assert_eq!(scale.ramp_position(-3.0), 1.0);
        assert_eq!(scale.color(30.0), scale.color(3.0));
        let warm = scale.color(2.0);
        assert!(warm.r > warm.b);
    }

    #[test]
    fn missing_values_use_neutral_fill() {
        let scale = DivergingScale::new(1.0);
        assert_eq!(scale.fill(None), NO_DATA_FILL);
        assert_eq!(scale.fill(Some(f64::NAN)), NO_DATA_FILL);
        assert_ne!(scale.fill(Some(0.2)), NO_DATA_FILL);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#2166ac"), Some(Rgb::new(0x21, 0x66, 0xac)));
        assert_eq!(Rgb::from_hex("zz0000"), None);
        assert_eq!(Rgb::from_hex("abc"), None);
    }
}
