//! Gaussian kernel density estimate, the smooth curve drawn over a histogram.
//!
//! The bandwidth follows Scott's rule, `σ̂ · n^(-1/5)` with the sample
//! standard deviation.

use statrs::distribution::{Continuous, Normal};

use batrat_core::Histogram;

#[derive(Debug, Clone, PartialEq)]
pub struct KernelDensity {
    values: Vec<f64>,
    bandwidth: f64,
}

impl KernelDensity {
    /// Estimate from finite sample values. `None` with fewer than two values
    /// or when every value is equal, where no bandwidth exists.
    pub fn new(values: &[f64]) -> Option<Self> {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let bandwidth = scott_bandwidth(&values)?;
        Some(Self { values, bandwidth })
    }

    /// Density at `x`.
    pub fn density(&self, x: f64) -> f64 {
        let kernel = Normal::standard();
        let h = self.bandwidth;
        let sum: f64 = self.values.iter().map(|xi| kernel.pdf((x - xi) / h)).sum();
        sum / (self.values.len() as f64 * h)
    }

    /// Density scaled to histogram counts at each bin midpoint, so the curve
    /// can be drawn on the same axis as the bars.
    pub fn expected_counts(&self, histogram: &Histogram) -> Vec<f64> {
        let n = self.values.len() as f64;
        histogram
            .bins
            .iter()
            .map(|b| {
                let mid = 0.5 * (b.lower + b.upper);
                self.density(mid) * n * (b.upper - b.lower)
            })
            .collect()
    }
}

/// Scott's rule bandwidth; `None` without spread.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    let h = var.sqrt() * n.powf(-0.2);
    (h > 0.0 && h.is_finite()).then_some(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use batrat_core::HistogramBin;

    #[test]
    fn bandwidth_follows_scotts_rule() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let std = (5.0f64 / 3.0).sqrt();
        let h = scott_bandwidth(&values).unwrap();
        assert!((h - std * 4.0f64.powf(-0.2)).abs() < 1e-12);
        assert!(scott_bandwidth(&[2.0, 2.0, 2.0]).is_none());
        assert!(scott_bandwidth(&[2.0]).is_none());
    }

    #[test]
    fn density_integrates_to_one() {
        let kde = KernelDensity::new(&[0.0, 0.5, 1.0, 3.0, 3.5]).unwrap();
        let step = 0.01;
        let area: f64 = (-2000..2000)
            .map(|i| kde.density(i as f64 * step) * step)
            .sum();
        assert!((area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn density_peaks_near_the_data() {
        let kde = KernelDensity::new(&[0.0, 0.1, -0.1, 0.05]).unwrap();
        assert!(kde.density(0.0) > kde.density(1.0));
        assert!(kde.density(0.0) > 0.0);
    }

    #[test]
    fn expected_counts_track_bins() {
        let values = [0.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 4.0];
        let kde = KernelDensity::new(&values).unwrap();
        let histogram = Histogram {
            field: "rat_minutes",
            bins: (0..4)
                .map(|i| HistogramBin {
                    lower: i as f64,
                    upper: i as f64 + 1.0,
                    count: 0,
                })
                .collect(),
            total: values.len(),
            missing: 0,
        };
        let counts = kde.expected_counts(&histogram);
        assert_eq!(counts.len(), 4);
        // Symmetric data around 2: inner bins are equal and larger.
        assert!((counts[1] - counts[2]).abs() < 1e-9);
        assert!((counts[0] - counts[3]).abs() < 1e-9);
        assert!(counts[1] > counts[0]);
    }
}
