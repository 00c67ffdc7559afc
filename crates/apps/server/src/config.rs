use std::net::SocketAddr;

use layers::ChartSize;
use runtime::DashboardConfig;

use crate::sources::Source;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub grid_source: Source,
    pub geo_source: Source,
    /// TopoJSON object holding the state boundaries.
    pub geo_object: String,
    pub dashboard: DashboardConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparsable numeric keys
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let num = |key: &str, default: f64| {
            lookup(key)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default)
        };

        let raw_addr = var("DASHBOARD_ADDR", "127.0.0.1:9200");
        let addr = raw_addr
            .parse()
            .map_err(|e| format!("invalid DASHBOARD_ADDR `{raw_addr}`: {e}"))?;

        let defaults = DashboardConfig::default();
        let chart = ChartSize {
            width: num("DASHBOARD_CHART_WIDTH", defaults.chart.width),
            height: num("DASHBOARD_CHART_HEIGHT", defaults.chart.height),
            ..defaults.chart
        };

        Ok(Self {
            addr,
            grid_source: Source::parse(&var(
                "DASHBOARD_GRID_SOURCE",
                "data/cmip_us_grid_tas_pr_anom2.csv",
            )),
            geo_source: Source::parse(&var(
                "DASHBOARD_GEO_SOURCE",
                "https://cdn.jsdelivr.net/npm/us-atlas@3/states-10m.json",
            )),
            geo_object: var("DASHBOARD_GEO_OBJECT", formats::geography::DEFAULT_STATES_OBJECT),
            dashboard: DashboardConfig {
                map_width: num("DASHBOARD_MAP_WIDTH", defaults.map_width),
                map_height: num("DASHBOARD_MAP_HEIGHT", defaults.map_height),
                map_scale: num("DASHBOARD_MAP_SCALE", defaults.map_scale),
                chart,
            },
        })
    }
}
