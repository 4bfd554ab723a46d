//! JSON shapes exchanged with the hypothesis-test endpoint.
//!
//! Requests use the camelCase names of the web form; response details use
//! snake_case and omit every field that does not apply to the test that ran.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::request::{ClaimKind, TailDirection, TestRequest, DEFAULT_SIGNIFICANCE};
use super::result::{CriticalRegion, DegreesOfFreedom, TestResult};
use crate::error::{CoreError, FieldErrors, Result};
use crate::samples::parse_samples;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisTestRequest {
    #[validate(
        required(message = "is required"),
        range(min = 1, max = 2, message = "must be 1 or 2")
    )]
    pub num_samples: Option<u8>,

    #[validate(
        required(message = "is required"),
        range(min = 1, max = 2, message = "must be 1 (mean) or 2 (variance)")
    )]
    pub claim_type: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,

    #[validate(
        required(message = "is required"),
        length(min = 1, message = "must not be empty")
    )]
    pub csv_data: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_known: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypothesized_value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_param: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_param2: Option<f64>,

    #[validate(required(message = "is required"))]
    pub claim_direction: Option<TailDirection>,
}

impl HypothesisTestRequest {
    /// Validate the wire form, parse `csvData` and produce an engine request.
    ///
    /// All field problems, including unreadable CSV cells, are reported together.
    pub fn into_test_request(self) -> Result<TestRequest> {
        self.validate()?;

        let sample_count = self
            .num_samples
            .map(usize::from)
            .ok_or_else(|| CoreError::validation("numSamples", "is required"))?;
        let claim_kind = self
            .claim_type
            .and_then(ClaimKind::from_code)
            .ok_or_else(|| CoreError::validation("claimType", "must be 1 (mean) or 2 (variance)"))?;
        let tail_direction = self
            .claim_direction
            .ok_or_else(|| CoreError::validation("claimDirection", "is required"))?;

        let mut errors = FieldErrors::new();
        let population_param_known = parse_known_flag(self.is_known.as_deref(), &mut errors);

        let mut request = TestRequest {
            sample_count,
            claim_kind,
            significance: self.p_value.unwrap_or(DEFAULT_SIGNIFICANCE),
            samples: Vec::new(),
            population_param_known,
            hypothesized_value: self.hypothesized_value,
            known_param: self.known_param,
            known_param2: self.known_param2,
            tail_direction,
        };
        errors.extend(request.parameter_errors());

        match parse_samples(self.csv_data.as_deref().unwrap_or_default(), sample_count) {
            Ok(samples) => {
                request.samples = samples;
                errors.extend(request.sample_errors());
            }
            Err(CoreError::Validation(csv_errors)) => errors.extend(csv_errors),
            Err(other) => return Err(other),
        }

        errors.into_result()?;
        Ok(request)
    }
}

impl TryFrom<HypothesisTestRequest> for TestRequest {
    type Error = CoreError;

    fn try_from(value: HypothesisTestRequest) -> Result<Self> {
        value.into_test_request()
    }
}

fn parse_known_flag(value: Option<&str>, errors: &mut FieldErrors) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) if v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("true") => true,
        Some(v) if v.eq_ignore_ascii_case("no") || v.eq_ignore_ascii_case("false") => false,
        Some(other) => {
            errors.push("isKnown", format!("must be \"yes\" or \"no\", got '{}'", other));
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisTestResponse {
    pub conclusion: String,
    pub details: TestDetails,
}

impl HypothesisTestResponse {
    /// True when the conclusion rejects H₀.
    pub fn rejects_null(&self) -> bool {
        self.conclusion.starts_with("Reject")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_statistic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_value_lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_value_upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees_of_freedom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub df1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub df2: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_variance: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size1: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size2: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_mean1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_mean2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_std1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_std2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_variance1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_variance2: Option<f64>,
}

impl From<&TestResult> for HypothesisTestResponse {
    fn from(result: &TestResult) -> Self {
        let mut details = TestDetails {
            test_type: Some(result.test_type.label().to_string()),
            test_statistic: Some(result.test_statistic),
            critical_value: Some(result.critical_value),
            p_value: Some(result.p_value),
            significance: Some(result.significance),
            ..Default::default()
        };

        if let CriticalRegion::TwoSided { lower, upper } = result.critical_region {
            details.critical_value_lower = Some(lower);
            details.critical_value_upper = Some(upper);
        }

        match result.degrees_of_freedom {
            DegreesOfFreedom::None => {}
            DegreesOfFreedom::Single(df) => details.degrees_of_freedom = Some(df),
            DegreesOfFreedom::Pair(df1, df2) => {
                details.df1 = Some(df1);
                details.df2 = Some(df2);
            }
        }

        match result.descriptive.as_slice() {
            [only] => {
                details.sample_size = Some(only.size);
                details.sample_mean = Some(only.mean);
                details.sample_std = only.std_dev;
                details.sample_variance = only.variance;
            }
            [first, second, ..] => {
                details.sample_size1 = Some(first.size);
                details.sample_size2 = Some(second.size);
                details.sample_mean1 = Some(first.mean);
                details.sample_mean2 = Some(second.mean);
                details.sample_std1 = first.std_dev;
                details.sample_std2 = second.std_dev;
                details.sample_variance1 = first.variance;
                details.sample_variance2 = second.variance;
            }
            [] => {}
        }

        Self {
            conclusion: result.conclusion.clone(),
            details,
        }
    }
}

impl From<TestResult> for HypothesisTestResponse {
    fn from(result: TestResult) -> Self {
        Self::from(&result)
    }
}
