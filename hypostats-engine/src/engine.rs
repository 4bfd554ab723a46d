//! The hypothesis-testing engine.
//!
//! Selection order:
//!
//! | samples | claim    | parameter known | test                         |
//! |---------|----------|-----------------|------------------------------|
//! | 1       | mean     | yes             | one-sample z                 |
//! | 1       | mean     | no              | one-sample t, df = n − 1     |
//! | 2       | mean     | yes             | two-sample z                 |
//! | 2       | mean     | no              | Welch t, Satterthwaite df    |
//! | 1       | variance | either          | chi-square, df = n − 1       |
//! | 2       | variance | either          | F = s₁² / s₂², df = (n₁−1, n₂−1) |

use hypostats_core::{
    ClaimKind, CoreError, CriticalRegion, Result, SampleSummary, TailDirection, TestKind,
    TestRequest, TestResult,
};
use tracing::debug;

use crate::descriptive::{standard_error, summarize};
use crate::distribution::ReferenceDistribution;

/// Stateless engine; every call is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HypothesisTestEngine;

impl HypothesisTestEngine {
    pub fn new() -> Self {
        Self
    }

    /// Validate `request`, run the selected test and return the verdict.
    pub fn run(&self, request: &TestRequest) -> Result<TestResult> {
        request.validate()?;

        let kind = select_test(request);
        let descriptive: Vec<SampleSummary> = request.samples.iter().map(|s| summarize(s)).collect();
        check_finite(&descriptive)?;
        let (statistic, distribution) = compute_statistic(kind, request, &descriptive)?;

        let region = critical_region(&distribution, request.tail_direction, request.significance)?;
        let reject_null = region.rejects(statistic);
        let p_value = p_value(&distribution, request.tail_direction, statistic)?;
        let critical_value = region.reported_boundary(statistic, distribution.median()?);

        debug!(
            test_type = kind.tag(),
            statistic,
            critical_value,
            p_value,
            reject_null,
            "Hypothesis test evaluated"
        );

        Ok(TestResult {
            test_type: kind,
            reject_null,
            conclusion: conclusion(kind, request, reject_null),
            test_statistic: statistic,
            critical_region: region,
            critical_value,
            p_value,
            significance: request.significance,
            degrees_of_freedom: distribution.degrees_of_freedom(),
            descriptive,
        })
    }
}

/// Pick the test for a request according to the selection table.
pub fn select_test(request: &TestRequest) -> TestKind {
    match (request.sample_count, request.claim_kind, request.population_param_known) {
        (1, ClaimKind::Mean, true) => TestKind::OneSampleZ,
        (1, ClaimKind::Mean, false) => TestKind::OneSampleT,
        (_, ClaimKind::Mean, true) => TestKind::TwoSampleZ,
        (_, ClaimKind::Mean, false) => TestKind::WelchT,
        (1, ClaimKind::Variance, _) => TestKind::ChiSquareVariance,
        (_, ClaimKind::Variance, _) => TestKind::FVarianceRatio,
    }
}

/// Rejection region for `tail` at significance `alpha`.
pub fn critical_region(
    distribution: &ReferenceDistribution,
    tail: TailDirection,
    alpha: f64,
) -> Result<CriticalRegion> {
    Ok(match tail {
        TailDirection::Greater => CriticalRegion::Upper {
            value: distribution.upper_quantile(alpha)?,
        },
        TailDirection::Less => CriticalRegion::Lower {
            value: distribution.quantile(alpha)?,
        },
        TailDirection::Equal => CriticalRegion::TwoSided {
            lower: distribution.quantile(alpha / 2.0)?,
            upper: distribution.upper_quantile(alpha / 2.0)?,
        },
    })
}

/// Probability under H₀ of a statistic at least as extreme as `statistic`.
pub fn p_value(
    distribution: &ReferenceDistribution,
    tail: TailDirection,
    statistic: f64,
) -> Result<f64> {
    Ok(match tail {
        TailDirection::Greater => distribution.sf(statistic)?,
        TailDirection::Less => distribution.cdf(statistic)?,
        TailDirection::Equal => {
            let lower = distribution.cdf(statistic)?;
            let upper = distribution.sf(statistic)?;
            (2.0 * lower.min(upper)).min(1.0)
        }
    })
}

fn compute_statistic(
    kind: TestKind,
    request: &TestRequest,
    descriptive: &[SampleSummary],
) -> Result<(f64, ReferenceDistribution)> {
    let (statistic, distribution) = match kind {
        TestKind::OneSampleZ => {
            let sample = first(descriptive)?;
            let sigma = known(request.known_param, "knownParam")?;
            let z = (sample.mean - hypothesized(request)?) / standard_error(sigma, sample.size);
            (z, ReferenceDistribution::StandardNormal)
        }
        TestKind::OneSampleT => {
            let sample = first(descriptive)?;
            let s = spread(sample, 1)?;
            if s == 0.0 {
                return Err(CoreError::Computation(
                    "sample standard deviation is zero, the t statistic is undefined".to_string(),
                ));
            }
            let t = (sample.mean - hypothesized(request)?) / standard_error(s, sample.size);
            let df = (sample.size - 1) as f64;
            (t, ReferenceDistribution::StudentsT { df })
        }
        TestKind::TwoSampleZ => {
            let (a, b) = pair(descriptive)?;
            let sigma1 = known(request.known_param, "knownParam")?;
            let sigma2 = known(request.known_param2, "knownParam2")?;
            let se = (sigma1.powi(2) / a.size as f64 + sigma2.powi(2) / b.size as f64).sqrt();
            let z = (a.mean - b.mean - hypothesized(request)?) / se;
            (z, ReferenceDistribution::StandardNormal)
        }
        TestKind::WelchT => {
            let (a, b) = pair(descriptive)?;
            let va = spread(a, 1)?.powi(2) / a.size as f64;
            let vb = spread(b, 2)?.powi(2) / b.size as f64;
            let se = (va + vb).sqrt();
            if se == 0.0 {
                return Err(CoreError::Computation(
                    "both samples have zero variance, the t statistic is undefined".to_string(),
                ));
            }
            let t = (a.mean - b.mean - hypothesized(request)?) / se;
            let df = (va + vb).powi(2)
                / (va.powi(2) / (a.size - 1) as f64 + vb.powi(2) / (b.size - 1) as f64);
            (t, ReferenceDistribution::StudentsT { df })
        }
        TestKind::ChiSquareVariance => {
            let sample = first(descriptive)?;
            let variance = spread(sample, 1)?.powi(2);
            let sigma0 = hypothesized(request)?;
            let df = (sample.size - 1) as f64;
            (df * variance / sigma0.powi(2), ReferenceDistribution::ChiSquared { df })
        }
        TestKind::FVarianceRatio => {
            let (a, b) = pair(descriptive)?;
            let numerator = spread(a, 1)?.powi(2);
            let denominator = spread(b, 2)?.powi(2);
            if denominator == 0.0 {
                return Err(CoreError::Computation(
                    "sample 2 has zero variance, the variance ratio is undefined".to_string(),
                ));
            }
            let df1 = (a.size - 1) as f64;
            let df2 = (b.size - 1) as f64;
            (
                numerator / denominator,
                ReferenceDistribution::FisherSnedecor { df1, df2 },
            )
        }
    };

    if !statistic.is_finite() {
        return Err(CoreError::Computation(format!(
            "{} produced a non-finite statistic",
            kind.label()
        )));
    }

    Ok((statistic, distribution))
}

/// Huge observations can overflow the mean or variance even when every value is finite.
fn check_finite(descriptive: &[SampleSummary]) -> Result<()> {
    for (index, sample) in descriptive.iter().enumerate() {
        let variance_overflow = sample.variance.is_some_and(|v| !v.is_finite());
        if !sample.mean.is_finite() || variance_overflow {
            return Err(CoreError::Computation(format!(
                "sample {} statistics overflow, rescale the data",
                index + 1
            )));
        }
    }
    Ok(())
}

fn first(descriptive: &[SampleSummary]) -> Result<&SampleSummary> {
    descriptive
        .first()
        .ok_or_else(|| CoreError::validation("csvData", "sample 1 is missing"))
}

fn pair(descriptive: &[SampleSummary]) -> Result<(&SampleSummary, &SampleSummary)> {
    match descriptive {
        [a, b] => Ok((a, b)),
        _ => Err(CoreError::validation("csvData", "two samples are required")),
    }
}

fn spread(sample: &SampleSummary, index: usize) -> Result<f64> {
    sample.std_dev.ok_or_else(|| {
        CoreError::validation(
            "csvData",
            format!("sample {} needs at least 2 observations", index),
        )
    })
}

fn known(value: Option<f64>, field: &str) -> Result<f64> {
    value.ok_or_else(|| CoreError::validation(field, "is required when the population parameter is known"))
}

fn hypothesized(request: &TestRequest) -> Result<f64> {
    request
        .hypothesized_value
        .ok_or_else(|| CoreError::validation("hypothesizedValue", "is required for this test"))
}

fn conclusion(kind: TestKind, request: &TestRequest, reject_null: bool) -> String {
    let phrase = request.tail_direction.phrase();
    let target = request.hypothesized_value.unwrap_or_default();
    let claim = match kind {
        TestKind::OneSampleZ | TestKind::OneSampleT => {
            format!("the population mean is {} {}", phrase, target)
        }
        TestKind::TwoSampleZ | TestKind::WelchT => format!(
            "the difference between the population means (μ₁ − μ₂) is {} {}",
            phrase, target
        ),
        TestKind::ChiSquareVariance => {
            format!("the population standard deviation is {} {}", phrase, target)
        }
        TestKind::FVarianceRatio => format!(
            "the variance of population 1 is {} the variance of population 2",
            phrase
        ),
    };

    if reject_null {
        format!(
            "Reject the null hypothesis. At the {} significance level there is sufficient evidence that {}.",
            request.significance, claim
        )
    } else {
        format!(
            "Fail to reject the null hypothesis. At the {} significance level there is not sufficient evidence that {}.",
            request.significance, claim
        )
    }
}
