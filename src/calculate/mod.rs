//! Deck and match history calculations.
//!
//! - [`metrics`]: aggregate metrics and the heuristic deck score
//! - [`history`]: statistics over a battle log
//!
//! The helpers below are shared by both.

pub mod history;
pub mod metrics;

pub use history::analyze;
pub use metrics::evaluate;

/// `part` as a percentage of `total`; zero when `total` is zero.
pub fn calculate_rate_percent(part: u32, total: u32) -> f64 {
    calculate_ratio(part, total) * 100.0
}

/// `part / total`; zero when `total` is zero.
pub fn calculate_ratio(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_rate_percent() {
        assert!((calculate_rate_percent(2, 3) - 66.666).abs() < 0.01);
        assert_eq!(calculate_rate_percent(0, 0), 0.0);
        assert_eq!(calculate_rate_percent(5, 5), 100.0);
    }

    #[test]
    fn test_calculate_ratio() {
        assert_eq!(calculate_ratio(1, 4), 0.25);
        assert_eq!(calculate_ratio(3, 0), 0.0);
    }

    #[test]
    fn test_calculate_mean() {
        assert_eq!(calculate_mean(&[]), 0.0);
        assert_eq!(calculate_mean(&[30.0, -30.0, 12.0]), 4.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(3.25), 3.3);
        assert_eq!(round1(3.24), 3.2);
        assert_eq!(round1(10.0), 10.0);
    }
}
