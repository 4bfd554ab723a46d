use hypostats_core::SampleSummary;
use statrs::statistics::Statistics;

/// Size, mean and unbiased (n − 1) spread of a sample.
pub fn summarize(sample: &[f64]) -> SampleSummary {
    let variance = if sample.len() >= 2 {
        Some(sample.variance())
    } else {
        None
    };

    SampleSummary {
        size: sample.len(),
        mean: sample.mean(),
        std_dev: variance.map(f64::sqrt),
        variance,
    }
}

/// Standard error of the mean for a known or estimated standard deviation.
pub fn standard_error(std_dev: f64, size: usize) -> f64 {
    std_dev / (size as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_single_observation_has_no_spread() {
        let summary = summarize(&[4.2]);
        assert_eq!(summary.size, 1);
        assert_eq!(summary.mean, 4.2);
        assert_eq!(summary.std_dev, None);
        assert_eq!(summary.variance, None);
    }

    #[test]
    fn test_summarize_uses_unbiased_variance() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(summary.mean, 5.0);
        assert!((summary.variance.unwrap() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_error() {
        assert!((standard_error(15.0, 25) - 3.0).abs() < 1e-12);
    }
}
