use serde::{Deserialize, Serialize};

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Maps a 0..360 longitude into the -180..180 range.
///
/// Only values strictly above 180 are shifted; everything else passes through.
pub fn normalize_lon180(lon: f64) -> f64 {
    if lon > 180.0 { lon - 360.0 } else { lon }
}

#[cfg(test)]
mod tests {
    use super::normalize_lon180;

    #[test]
    fn shifts_only_eastern_hemisphere_overflow() {
        assert_eq!(normalize_lon180(260.0), -100.0);
        assert_eq!(normalize_lon180(180.0), 180.0);
        assert_eq!(normalize_lon180(-75.0), -75.0);
        assert_eq!(normalize_lon180(360.0), 0.0);
    }
}
