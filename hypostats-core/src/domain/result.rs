use serde::{Deserialize, Serialize};
use std::fmt;

/// Named test the engine applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    OneSampleZ,
    OneSampleT,
    TwoSampleZ,
    WelchT,
    ChiSquareVariance,
    FVarianceRatio,
}

impl TestKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OneSampleZ => "one-sample z-test",
            Self::OneSampleT => "one-sample t-test",
            Self::TwoSampleZ => "two-sample z-test",
            Self::WelchT => "two-sample t-test (Welch)",
            Self::ChiSquareVariance => "chi-square variance test",
            Self::FVarianceRatio => "F-test for equality of variances",
        }
    }

    /// Short tag used for metric labels and log fields.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::OneSampleZ => "one_sample_z",
            Self::OneSampleT => "one_sample_t",
            Self::TwoSampleZ => "two_sample_z",
            Self::WelchT => "welch_t",
            Self::ChiSquareVariance => "chi_square_variance",
            Self::FVarianceRatio => "f_variance_ratio",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejection region of the reference distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "tail", rename_all = "snake_case")]
pub enum CriticalRegion {
    /// Reject when the statistic exceeds `value`.
    Upper { value: f64 },
    /// Reject when the statistic is below `value`.
    Lower { value: f64 },
    /// Reject outside `[lower, upper]`.
    TwoSided { lower: f64, upper: f64 },
}

impl CriticalRegion {
    pub fn rejects(&self, statistic: f64) -> bool {
        match *self {
            Self::Upper { value } => statistic > value,
            Self::Lower { value } => statistic < value,
            Self::TwoSided { lower, upper } => statistic < lower || statistic > upper,
        }
    }

    pub fn lower(&self) -> Option<f64> {
        match *self {
            Self::Lower { value } => Some(value),
            Self::TwoSided { lower, .. } => Some(lower),
            Self::Upper { .. } => None,
        }
    }

    pub fn upper(&self) -> Option<f64> {
        match *self {
            Self::Upper { value } => Some(value),
            Self::TwoSided { upper, .. } => Some(upper),
            Self::Lower { .. } => None,
        }
    }

    /// Single boundary to report. Two-sided regions report the side the
    /// statistic falls on relative to `center`.
    pub fn reported_boundary(&self, statistic: f64, center: f64) -> f64 {
        match *self {
            Self::Upper { value } | Self::Lower { value } => value,
            Self::TwoSided { lower, upper } => {
                if statistic >= center {
                    upper
                } else {
                    lower
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DegreesOfFreedom {
    /// Normal reference distribution.
    None,
    Single(f64),
    Pair(f64, f64),
}

/// Size, location and spread of one sample.
///
/// Spread is `None` for a single observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SampleSummary {
    pub size: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub test_type: TestKind,
    pub reject_null: bool,
    pub conclusion: String,
    pub test_statistic: f64,
    pub critical_region: CriticalRegion,
    pub critical_value: f64,
    pub p_value: f64,
    pub significance: f64,
    pub degrees_of_freedom: DegreesOfFreedom,
    pub descriptive: Vec<SampleSummary>,
}
