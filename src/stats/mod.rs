//! Descriptive statistics and standard-normal helpers.
//!
//! Conventions match the engine's reporting side:
//!
//! - population variance (ddof = 0) for data and simulation summaries
//! - sample variance (ddof = 1) only where a summary line calls for it
//! - biased skewness (g1) and excess kurtosis (g2)
//! - linear-interpolation percentiles
//!
//! Statistics of an empty slice are `NaN`; callers that cannot tolerate
//! `NaN` must reject empty inputs at the loader boundary.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_pop(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64).sqrt()
}

/// Sample standard deviation (ddof = 1). `NaN` for fewer than two values.
pub fn std_sample(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64).sqrt()
}

pub fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NAN, f64::min)
}

pub fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NAN, f64::max)
}

/// Biased sample skewness `g1 = m3 / m2^(3/2)`.
pub fn skewness(xs: &[f64]) -> f64 {
    let (m2, m3, _) = central_moments(xs);
    m3 / m2.powf(1.5)
}

/// Biased excess kurtosis `g2 = m4 / m2^2 - 3`.
pub fn excess_kurtosis(xs: &[f64]) -> f64 {
    let (m2, _, m4) = central_moments(xs);
    m4 / (m2 * m2) - 3.0
}

fn central_moments(xs: &[f64]) -> (f64, f64, f64) {
    if xs.is_empty() {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    let m = mean(xs);
    let n = xs.len() as f64;
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for x in xs {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Percentile in `[0, 100]` with linear interpolation between order
/// statistics.
pub fn percentile(xs: &[f64], p: f64) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

pub fn median(xs: &[f64]) -> f64 {
    percentile(xs, 50.0)
}

/// Standard-normal quantile (inverse CDF).
pub fn normal_quantile(p: f64) -> f64 {
    // N(0, 1) construction cannot fail; the fallback keeps this total.
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(p))
        .unwrap_or(f64::NAN)
}

/// Standard-normal density.
pub fn normal_pdf(x: f64) -> f64 {
    Normal::new(0.0, 1.0).map(|n| n.pdf(x)).unwrap_or(f64::NAN)
}

/// Two-sided z-score for a confidence level, e.g. 0.95 -> 1.959964.
pub fn confidence_z(level: f64) -> f64 {
    normal_quantile((1.0 + level) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_moments() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&xs) - 2.5).abs() < 1e-12);
        assert!((std_pop(&xs) - 1.25_f64.sqrt()).abs() < 1e-12);
        assert!((std_sample(&xs) - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(skewness(&xs).abs() < 1e-12);
        assert!((excess_kurtosis(&xs) - (-1.36)).abs() < 1e-9);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&xs, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&xs, 25.0) - 1.75).abs() < 1e-12);
        assert!((percentile(&xs, 100.0) - 4.0).abs() < 1e-12);
        assert!((median(&xs) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(std_pop(&[]).is_nan());
        assert!(min(&[]).is_nan());
        assert!(max(&[]).is_nan());
        assert!(skewness(&[]).is_nan());
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn two_sided_z_scores() {
        assert!((confidence_z(0.95) - 1.959964).abs() < 1e-4);
        assert!((confidence_z(0.68) - 0.994458).abs() < 1e-4);
    }

    #[test]
    fn standard_normal_density_peak() {
        assert!((normal_pdf(0.0) - 0.3989422804014327).abs() < 1e-12);
    }
}
