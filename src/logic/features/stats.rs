//! Window Statistics
//!
//! Per-row aggregates over a six-month window.

/// Arithmetic mean; 0.0 for an empty window
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Sample standard deviation (n - 1 denominator); 0.0 below two values
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Least-squares slope of `values` against x = 0, 1, .., n - 1
///
/// Degree-1 polynomial fit; 0.0 below two values.
pub fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let (sxy, sxx) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = i as f64 - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });

    sxy / sxx
}

/// Count of values strictly above `threshold`
pub fn count_above(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|&&v| v > threshold).count()
}

/// Count of values at or above `threshold`
pub fn count_at_least(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|&&v| v >= threshold).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_mean_min_max_sum() {
        let v = [3.0, -1.0, 4.0, 1.0, 5.0, 9.0];
        assert!((mean(&v) - 3.5).abs() < EPS);
        assert_eq!(max(&v), 9.0);
        assert_eq!(min(&v), -1.0);
        assert_eq!(sum(&v), 21.0);
    }

    #[test]
    fn test_sample_std() {
        // var = 17.5 with n - 1 denominator
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0];
        let expected = (17.5f64).sqrt();
        assert!((sample_std(&v) - expected).abs() < EPS);
        assert_eq!(sample_std(&[5.0; 6]), 0.0);
        assert_eq!(sample_std(&[5.0]), 0.0);
    }

    #[test]
    fn test_ols_slope_linear() {
        let v = [20000.0, 21000.0, 22000.0, 23000.0, 24000.0, 25000.0];
        assert!((ols_slope(&v) - 1000.0).abs() < EPS);
    }

    #[test]
    fn test_ols_slope_is_not_two_point() {
        // Endpoints equal but interior rises: a two-point slope would be 0
        let v = [0.0, 10.0, 20.0, 20.0, 10.0, 0.0];
        assert!(ols_slope(&v).abs() < EPS);

        let v = [0.0, 0.0, 0.0, 0.0, 0.0, 10.0];
        // sxy = 2.5 * 10, sxx = 17.5
        assert!((ols_slope(&v) - 25.0 / 17.5).abs() < EPS);
    }

    #[test]
    fn test_counts() {
        let v = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        assert_eq!(count_above(&v, 0.0), 3);
        assert_eq!(count_at_least(&v, 2.0), 2);
    }
}
