//! Shared formatting utilities for UI components.

/// Format a statistic value with smart precision.
pub fn format_stat_value(val: f64) -> String {
    if !val.is_finite() {
        return if val.is_nan() {
            "NaN".to_string()
        } else if val.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }
    let abs_val = val.abs();
    if abs_val == 0.0 {
        "0".to_string()
    } else if !(1e-3..1e6).contains(&abs_val) {
        format!("{:.3e}", val)
    } else if abs_val >= 100.0 {
        format!("{:.2}", val)
    } else if abs_val >= 1.0 {
        format!("{:.4}", val)
    } else {
        format!("{:.5}", val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_follows_magnitude() {
        assert_eq!(format_stat_value(0.0), "0");
        assert_eq!(format_stat_value(f64::NAN), "NaN");
        assert_eq!(format_stat_value(273.15), "273.15");
        assert_eq!(format_stat_value(1.5), "1.5000");
        assert_eq!(format_stat_value(0.25), "0.25000");
        assert_eq!(format_stat_value(1.0e7), "1.000e7");
    }
}
