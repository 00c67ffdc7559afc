//! Display strings that depend on the active variable.

use scene::Variable;

pub fn legend_title(variable: Variable) -> &'static str {
    match variable {
        Variable::Tas => "Temperature anomaly (°C)",
        Variable::Pr => "Precipitation anomaly (mm / year)",
    }
}

pub fn tooltip_label(variable: Variable) -> &'static str {
    match variable {
        Variable::Tas => "Temp anomaly:",
        Variable::Pr => "Precip anomaly:",
    }
}

pub fn chart_title(variable: Variable, first_year: i32, last_year: i32) -> String {
    let quantity = match variable {
        Variable::Tas => "temperature anomaly (°C",
        Variable::Pr => "precipitation anomaly (mm / year",
    };
    format!("Average {quantity}, {first_year}–{last_year})")
}

/// Two-decimal value, or `N/A` when missing.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "N/A".to_string(),
    }
}
