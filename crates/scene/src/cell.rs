use foundation::math::LonLat;
use serde::{Deserialize, Serialize};

/// Last year covered by the historical simulation; later years are projections.
pub const HISTORICAL_END_YEAR: i32 = 2014;

/// Emissions pathway a year belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Historical,
    Ssp585,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Historical => "historical",
            Scenario::Ssp585 => "ssp585",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "historical" => Some(Scenario::Historical),
            "ssp585" => Some(Scenario::Ssp585),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single source of truth for which scenario a year belongs to.
pub fn scenario_for_year(year: i32) -> Scenario {
    if year <= HISTORICAL_END_YEAR {
        Scenario::Historical
    } else {
        Scenario::Ssp585
    }
}

/// Climate variable carried by a cell.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    /// Near-surface air temperature.
    #[default]
    Tas,
    /// Precipitation.
    Pr,
}

impl Variable {
    pub const ALL: [Variable; 2] = [Variable::Tas, Variable::Pr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Tas => "tas",
            Variable::Pr => "pr",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "tas" => Some(Variable::Tas),
            "pr" => Some(Variable::Pr),
            _ => None,
        }
    }

    /// Short unit suffix used next to values.
    pub fn unit(&self) -> &'static str {
        match self {
            Variable::Tas => "°C",
            Variable::Pr => "mm/yr",
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One anomaly sample for a year, variable and grid location.
///
/// `anom` is `NaN` when the source row carried no numeric value; aggregates
/// treat such cells as absent.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub year: i32,
    pub scenario: Scenario,
    pub variable: Variable,
    /// Longitude as stored in the source, possibly in 0..360.
    pub lon: f64,
    /// Longitude normalized to -180..180.
    pub lon180: f64,
    pub lat: f64,
    pub anom: f64,
}

impl GridCell {
    pub fn point(&self) -> LonLat {
        LonLat::new(self.lon180, self.lat)
    }

    pub fn has_value(&self) -> bool {
        self.anom.is_finite()
    }
}
