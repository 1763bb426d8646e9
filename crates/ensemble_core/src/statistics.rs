//! Pearson and Spearman correlation
//!
//! Degenerate inputs (fewer than two points, a constant series) have no defined
//! correlation. Instead of failing, the functions here return [`INVALID`] so callers
//! can skip the pair with a single [`is_valid`] check.

use serde::{Deserialize, Serialize};

/// Sentinel for "no correlation available"
pub const INVALID: f64 = f64::INFINITY;

/// True for finite values, i.e. anything but NaN, ±inf and the [`INVALID`] sentinel
#[inline]
pub fn is_valid(value: f64) -> bool {
    value.is_finite()
}

/// Correlation coefficient type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    #[default]
    Pearson,
    Spearman,
}

impl CorrelationKind {
    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            CorrelationKind::Pearson => "Pearson Correlation Coefficient",
            CorrelationKind::Spearman => "Spearman's Rank Correlation Coefficient",
        }
    }
}

/// Correlation between two equal-length series.
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
pub fn correlation(kind: CorrelationKind, x: &[f64], y: &[f64]) -> f64 {
    match kind {
        CorrelationKind::Pearson => pearson_correlation(x, y),
        CorrelationKind::Spearman => spearman_correlation(x, y),
    }
}

/// Linear (Pearson) correlation coefficient.
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(
        x.len(),
        y.len(),
        "correlation requires series of equal length"
    );
    if x.len() < 2 {
        return INVALID;
    }

    // Rounding in the mean leaves a float constant with a tiny nonzero variance
    if is_constant(x) || is_constant(y) {
        return INVALID;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x <= 0.0 || variance_y <= 0.0 {
        return INVALID;
    }

    let r = covariance / (variance_x.sqrt() * variance_y.sqrt());
    if !is_valid(r) {
        return INVALID;
    }
    r.clamp(-1.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Rank (Spearman) correlation: Pearson on the rank-transformed series.
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(
        x.len(),
        y.len(),
        "correlation requires series of equal length"
    );
    pearson_correlation(&ranks(x), &ranks(y))
}

/// 1-based ranks; tied values share the average of the ranks they span.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold ranks start+1..=end
        let average = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = average;
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_self_correlation_is_one() {
        let x = [3.0, -1.0, 4.5, 10.0, 2.2];
        assert!((pearson_correlation(&x, &x) - 1.0).abs() < EPS);
        assert!((spearman_correlation(&x, &x) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_perfect_linear() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        assert!((pearson_correlation(&x, &y) - 1.0).abs() < EPS);

        let inverse = [6.0, 4.0, 2.0];
        assert!((pearson_correlation(&x, &inverse) + 1.0).abs() < EPS);
    }

    #[test]
    fn test_known_pearson_value() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 2.0, 4.0];
        // cov = 4.0, var_x = var_y = 5.0
        assert!((pearson_correlation(&x, &y) - 0.8).abs() < EPS);
    }

    #[test]
    fn test_constant_series_is_invalid() {
        let x = [1.0, 2.0, 3.0];
        let constant = [5.0, 5.0, 5.0];
        assert_eq!(pearson_correlation(&x, &constant), INVALID);
        assert_eq!(spearman_correlation(&constant, &x), INVALID);
        assert!(!is_valid(correlation(CorrelationKind::Pearson, &x, &constant)));
    }

    #[test]
    fn test_inexact_float_constant_is_invalid() {
        // 0.1 and 0.7 have no exact binary form, so their mean is off by rounding
        assert_eq!(pearson_correlation(&[1.0, 2.0, 3.0], &[0.1; 3]), INVALID);
        assert_eq!(pearson_correlation(&[0.7; 7], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]), INVALID);
        assert_eq!(spearman_correlation(&[0.1; 3], &[3.0, 1.0, 2.0]), INVALID);
    }

    #[test]
    fn test_too_few_points_is_invalid() {
        assert_eq!(pearson_correlation(&[], &[]), INVALID);
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), INVALID);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_length_mismatch_panics() {
        pearson_correlation(&[1.0, 2.0], &[1.0]);
    }

    #[test]
    fn test_spearman_monotonic_nonlinear() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v: &f64| v.powi(3)).collect();
        assert!((spearman_correlation(&x, &y) - 1.0).abs() < EPS);
        assert!(pearson_correlation(&x, &y) < 1.0 - 1e-6);
    }

    #[test]
    fn test_ranks_average_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 5.0]), vec![2.0, 3.5, 3.5, 1.0]);
        assert_eq!(ranks(&[7.0, 7.0, 7.0]), vec![2.0, 2.0, 2.0]);
        assert!(ranks(&[]).is_empty());
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(0.5));
        assert!(!is_valid(INVALID));
        assert!(!is_valid(f64::NEG_INFINITY));
        assert!(!is_valid(f64::NAN));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(CorrelationKind::default(), CorrelationKind::Pearson);
        assert!(CorrelationKind::Spearman.label().contains("Spearman"));
    }
}
