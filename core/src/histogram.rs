//! Binning and kernel density estimation for the revenue-per-unit histogram.
//!
//! Kept free of drawing code so the numbers can be checked directly.

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// `bins` equal-width bins spanning [min, max] of the finite values.
/// Every bin is half-open except the last, which also holds the maximum.
/// A constant sample gets a unit-wide range centred on the value.
pub fn equal_width_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Gaussian kernel density estimate with Scott's rule bandwidth.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// `None` when fewer than two finite samples or zero spread.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let samples: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let n = samples.len();
        if n < 2 {
            return None;
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std_dev = variance.sqrt();
        if std_dev <= 0.0 {
            return None;
        }
        let bandwidth = std_dev * (n as f64).powf(-0.2);
        Some(Self { samples, bandwidth })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Probability density at `x`.
    pub fn density(&self, x: f64) -> f64 {
        let norm = 1.0 / (self.samples.len() as f64 * self.bandwidth * (2.0 * PI).sqrt());
        self.samples
            .iter()
            .map(|s| {
                let z = (x - s) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            * norm
    }

    /// `points` evenly spaced (x, density * scale) pairs over [lo, hi].
    /// Pass `n * bin_width` as `scale` to overlay on a count histogram.
    pub fn curve(&self, lo: f64, hi: f64, points: usize, scale: f64) -> Vec<(f64, f64)> {
        if points < 2 {
            return Vec::new();
        }
        let step = (hi - lo) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                (x, self.density(x) * scale)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_range_and_count_everything() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = equal_width_bins(&values, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[19].end, 99.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let bins = equal_width_bins(&[0.0, 1.0, 2.0, 10.0], 5);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 1);
    }

    #[test]
    fn constant_sample_gets_unit_range() {
        let bins = equal_width_bins(&[3.0, 3.0, 3.0], 4);
        assert_eq!(bins[0].start, 2.5);
        assert_eq!(bins[3].end, 3.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn nan_values_are_ignored() {
        let bins = equal_width_bins(&[f64::NAN, 1.0, 2.0], 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(equal_width_bins(&[f64::NAN], 3).is_empty());
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values = [140.0, 145.0, 150.0, 152.0, 160.0, 171.0];
        let kde = GaussianKde::fit(&values).unwrap();
        let curve = kde.curve(50.0, 260.0, 2001, 1.0);
        let step = 210.0 / 2000.0;
        let area: f64 = curve.iter().map(|(_, y)| y * step).sum();
        assert!((area - 1.0).abs() < 0.01, "area {area}");
    }

    #[test]
    fn kde_bandwidth_follows_scott_rule() {
        // Sample std dev of [1, 3] is sqrt(2).
        let kde = GaussianKde::fit(&[1.0, 3.0]).unwrap();
        let expected = 2f64.sqrt() * 2f64.powf(-0.2);
        assert!((kde.bandwidth() - expected).abs() < 1e-12);
    }

    #[test]
    fn kde_needs_spread() {
        assert!(GaussianKde::fit(&[5.0]).is_none());
        assert!(GaussianKde::fit(&[5.0, 5.0, 5.0]).is_none());
    }
}
