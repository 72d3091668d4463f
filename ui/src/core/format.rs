//! Formatting helpers for presenting metrics.

/// Sentinel shown wherever a value is missing or not numeric.
pub const MISSING: &str = "-";

pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        MISSING.to_string()
    }
}

pub fn format_z(value: f64) -> String {
    format_number(value, 2)
}

/// Round to two decimals, the precision z-scores are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `Stride_Length` → `Stride Length`, `average_speed` → `Average Speed`.
pub fn display_metric_name(id: &str) -> String {
    id.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
