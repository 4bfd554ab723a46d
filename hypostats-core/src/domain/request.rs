use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, FieldErrors, Result};

/// α used when a caller does not supply one.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Population parameter under test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    Mean,
    Variance,
}

impl ClaimKind {
    /// Decode the numeric `claimType` used on the wire (1 = mean, 2 = variance).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Mean),
            2 => Some(Self::Variance),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Mean => 1,
            Self::Variance => 2,
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Variance => write!(f, "variance"),
        }
    }
}

/// Direction of the alternative hypothesis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TailDirection {
    Greater,
    Less,
    Equal,
}

impl TailDirection {
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Greater => "greater than",
            Self::Less => "less than",
            Self::Equal => "different from",
        }
    }
}

impl fmt::Display for TailDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greater => write!(f, "greater"),
            Self::Less => write!(f, "less"),
            Self::Equal => write!(f, "equal"),
        }
    }
}

impl FromStr for TailDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "greater" | ">" => Ok(Self::Greater),
            "less" | "<" => Ok(Self::Less),
            "equal" | "!=" | "≠" | "two-sided" => Ok(Self::Equal),
            other => Err(CoreError::validation(
                "claimDirection",
                format!("unknown direction '{}'", other),
            )),
        }
    }
}

/// A fully shaped hypothesis test request.
///
/// `hypothesized_value` is μ₀ for one-sample mean tests, the hypothesized
/// difference μ₁ − μ₂ for two-sample mean tests and σ₀ (a standard
/// deviation) for the one-sample variance test. The F-test ignores it.
/// `known_param`/`known_param2` carry σ for mean tests and μ for variance
/// tests, one per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub sample_count: usize,
    pub claim_kind: ClaimKind,
    pub significance: f64,
    pub samples: Vec<Vec<f64>>,
    pub population_param_known: bool,
    pub hypothesized_value: Option<f64>,
    pub known_param: Option<f64>,
    pub known_param2: Option<f64>,
    pub tail_direction: TailDirection,
}

impl TestRequest {
    pub fn one_sample(claim_kind: ClaimKind, sample: Vec<f64>) -> Self {
        Self::with_samples(claim_kind, vec![sample])
    }

    pub fn two_sample(claim_kind: ClaimKind, sample1: Vec<f64>, sample2: Vec<f64>) -> Self {
        Self::with_samples(claim_kind, vec![sample1, sample2])
    }

    fn with_samples(claim_kind: ClaimKind, samples: Vec<Vec<f64>>) -> Self {
        Self {
            sample_count: samples.len(),
            claim_kind,
            significance: DEFAULT_SIGNIFICANCE,
            samples,
            population_param_known: false,
            hypothesized_value: None,
            known_param: None,
            known_param2: None,
            tail_direction: TailDirection::Equal,
        }
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn with_hypothesized_value(mut self, value: f64) -> Self {
        self.hypothesized_value = Some(value);
        self
    }

    pub fn with_tail(mut self, tail: TailDirection) -> Self {
        self.tail_direction = tail;
        self
    }

    /// Mark the population parameter as known for sample 1.
    pub fn with_known_param(mut self, param: f64) -> Self {
        self.population_param_known = true;
        self.known_param = Some(param);
        self
    }

    /// Mark the population parameters as known for both samples.
    pub fn with_known_params(mut self, param1: f64, param2: f64) -> Self {
        self.population_param_known = true;
        self.known_param = Some(param1);
        self.known_param2 = Some(param2);
        self
    }

    /// Smallest sample size the selected test can work with.
    pub fn min_observations(&self) -> usize {
        match (self.claim_kind, self.population_param_known) {
            (ClaimKind::Mean, true) => 1,
            (ClaimKind::Mean, false) => 2,
            (ClaimKind::Variance, _) => 2,
        }
    }

    /// The F-test compares two sample variances directly; every other test
    /// measures against a hypothesized value.
    pub fn requires_hypothesized_value(&self) -> bool {
        !(self.claim_kind == ClaimKind::Variance && self.sample_count == 2)
    }

    /// Check every invariant and report all violations at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = self.parameter_errors();
        errors.extend(self.sample_errors());
        errors.into_result()
    }

    /// Problems with everything except the observed data.
    pub fn parameter_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.sample_count != 1 && self.sample_count != 2 {
            errors.push("numSamples", "must be 1 or 2");
        }

        if !self.significance.is_finite() || self.significance <= 0.0 || self.significance >= 1.0 {
            errors.push("pValue", "significance level must be strictly between 0 and 1");
        }

        match self.hypothesized_value {
            None if self.requires_hypothesized_value() => {
                errors.push("hypothesizedValue", "is required for this test");
            }
            Some(value) if !value.is_finite() => {
                errors.push("hypothesizedValue", "must be a finite number");
            }
            Some(value)
                if value <= 0.0
                    && self.claim_kind == ClaimKind::Variance
                    && self.sample_count == 1 =>
            {
                errors.push(
                    "hypothesizedValue",
                    "hypothesized standard deviation must be positive",
                );
            }
            _ => {}
        }

        if self.population_param_known {
            self.check_known_param("knownParam", self.known_param, &mut errors);
            if self.sample_count == 2 {
                self.check_known_param("knownParam2", self.known_param2, &mut errors);
            }
        }

        errors
    }

    /// Problems with the observed data.
    pub fn sample_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if (self.sample_count == 1 || self.sample_count == 2)
            && self.samples.len() != self.sample_count
        {
            errors.push(
                "csvData",
                format!(
                    "expected {} sample(s), found {}",
                    self.sample_count,
                    self.samples.len()
                ),
            );
        }

        let min = self.min_observations();
        for (index, sample) in self.samples.iter().enumerate() {
            if sample.len() < min {
                errors.push(
                    "csvData",
                    format!(
                        "sample {} has {} observation(s), at least {} required",
                        index + 1,
                        sample.len(),
                        min
                    ),
                );
            }
            if let Some(position) = sample.iter().position(|v| !v.is_finite()) {
                errors.push(
                    "csvData",
                    format!(
                        "sample {} contains a non-finite value at position {}",
                        index + 1,
                        position + 1
                    ),
                );
            }
        }

        errors
    }

    fn check_known_param(&self, field: &str, value: Option<f64>, errors: &mut FieldErrors) {
        match value {
            None => errors.push(field, "is required when the population parameter is known"),
            Some(v) if !v.is_finite() => errors.push(field, "must be a finite number"),
            Some(v) if v <= 0.0 && self.claim_kind == ClaimKind::Mean => {
                errors.push(field, "known population standard deviation must be positive")
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_kind_codes() {
        assert_eq!(ClaimKind::from_code(1), Some(ClaimKind::Mean));
        assert_eq!(ClaimKind::from_code(2), Some(ClaimKind::Variance));
        assert_eq!(ClaimKind::from_code(3), None);
        assert_eq!(ClaimKind::Variance.code(), 2);
    }

    #[test]
    fn test_min_observations() {
        let mean = TestRequest::one_sample(ClaimKind::Mean, vec![1.0]);
        assert_eq!(mean.min_observations(), 2);
        assert_eq!(mean.with_known_param(1.0).min_observations(), 1);

        let variance = TestRequest::one_sample(ClaimKind::Variance, vec![1.0]).with_known_param(0.0);
        assert_eq!(variance.min_observations(), 2);
    }

    #[test]
    fn test_known_mean_for_variance_may_be_zero() {
        let request = TestRequest::one_sample(ClaimKind::Variance, vec![1.0, 2.0, 3.0])
            .with_hypothesized_value(1.0)
            .with_known_param(0.0);
        assert!(request.validate().is_ok());
    }
}
