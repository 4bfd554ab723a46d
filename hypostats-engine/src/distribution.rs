//! Reference distributions for test statistics.
//!
//! CDFs come from `statrs` (error function and regularized incomplete
//! gamma/beta functions). The standard normal quantile uses the library's
//! inverse; t, chi-square and F quantiles are found by bracketing and
//! bisecting the CDF, which keeps them accurate well past the four decimals
//! shown to users. Upper-tail quantiles bisect the survival function
//! directly, since `1 - p` rounds to 1 for very small `p`.

use hypostats_core::{CoreError, DegreesOfFreedom, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};

// Enough halvings to walk from 1 down to the smallest subnormal.
const MAX_BISECTIONS: usize = 1100;
const RELATIVE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceDistribution {
    StandardNormal,
    StudentsT { df: f64 },
    ChiSquared { df: f64 },
    FisherSnedecor { df1: f64, df2: f64 },
}

impl ReferenceDistribution {
    pub fn degrees_of_freedom(&self) -> DegreesOfFreedom {
        match *self {
            Self::StandardNormal => DegreesOfFreedom::None,
            Self::StudentsT { df } | Self::ChiSquared { df } => DegreesOfFreedom::Single(df),
            Self::FisherSnedecor { df1, df2 } => DegreesOfFreedom::Pair(df1, df2),
        }
    }

    /// Symmetric about zero (normal and t).
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::StandardNormal | Self::StudentsT { .. })
    }

    pub fn cdf(&self, x: f64) -> Result<f64> {
        Ok(match *self {
            Self::StandardNormal => standard_normal()?.cdf(x),
            Self::StudentsT { df } => students_t(df)?.cdf(x),
            Self::ChiSquared { df } => chi_squared(df)?.cdf(x),
            Self::FisherSnedecor { df1, df2 } => fisher_snedecor(df1, df2)?.cdf(x),
        })
    }

    /// Upper tail probability, P(X > x).
    pub fn sf(&self, x: f64) -> Result<f64> {
        Ok(match *self {
            Self::StandardNormal => standard_normal()?.sf(x),
            Self::StudentsT { df } => students_t(df)?.sf(x),
            Self::ChiSquared { df } => chi_squared(df)?.sf(x),
            Self::FisherSnedecor { df1, df2 } => fisher_snedecor(df1, df2)?.sf(x),
        })
    }

    /// Inverse CDF for `p` strictly inside (0, 1).
    pub fn quantile(&self, p: f64) -> Result<f64> {
        check_probability(p)?;

        if self.is_symmetric() && p < 0.5 {
            return self.upper_quantile(p).map(|q| -q);
        }

        let q = match *self {
            Self::StandardNormal => standard_normal()?.inverse_cdf(p),
            Self::StudentsT { df } => {
                let dist = students_t(df)?;
                bisect(|x| dist.cdf(x) >= p)
            }
            Self::ChiSquared { df } => {
                let dist = chi_squared(df)?;
                bisect(|x| dist.cdf(x) >= p)
            }
            Self::FisherSnedecor { df1, df2 } => {
                let dist = fisher_snedecor(df1, df2)?;
                bisect(|x| dist.cdf(x) >= p)
            }
        };

        self.finite_quantile(q, p)
    }

    /// The x with P(X > x) = `q`, for `q` strictly inside (0, 1).
    pub fn upper_quantile(&self, q: f64) -> Result<f64> {
        check_probability(q)?;

        if self.is_symmetric() && q > 0.5 {
            return self.quantile(q).map(|x| -x);
        }

        let x = match *self {
            Self::StandardNormal => -standard_normal()?.inverse_cdf(q),
            Self::StudentsT { df } => {
                let dist = students_t(df)?;
                bisect(|x| dist.sf(x) <= q)
            }
            Self::ChiSquared { df } => {
                let dist = chi_squared(df)?;
                bisect(|x| dist.sf(x) <= q)
            }
            Self::FisherSnedecor { df1, df2 } => {
                let dist = fisher_snedecor(df1, df2)?;
                bisect(|x| dist.sf(x) <= q)
            }
        };

        self.finite_quantile(x, 1.0 - q)
    }

    fn finite_quantile(&self, x: f64, p: f64) -> Result<f64> {
        if x.is_finite() {
            Ok(x)
        } else {
            Err(CoreError::Computation(format!(
                "quantile {} of {:?} is not finite",
                p, self
            )))
        }
    }

    pub fn median(&self) -> Result<f64> {
        if self.is_symmetric() {
            return Ok(0.0);
        }
        self.quantile(0.5)
    }
}

fn check_probability(p: f64) -> Result<()> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(CoreError::Computation(format!(
            "quantile probability {} is outside (0, 1)",
            p
        )))
    }
}

/// Smallest x ≥ 0 at which `reached` turns true. `reached` must be monotone.
fn bisect(reached: impl Fn(f64) -> bool) -> f64 {
    let mut low = 0.0_f64;
    let mut high = 1.0_f64;
    while !reached(high) {
        low = high;
        high *= 2.0;
        if !high.is_finite() {
            return f64::INFINITY;
        }
    }

    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (low + high);
        if reached(mid) {
            high = mid;
        } else {
            low = mid;
        }
        if high - low <= RELATIVE_TOLERANCE * high {
            break;
        }
    }

    0.5 * (low + high)
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| CoreError::Computation(e.to_string()))
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| CoreError::Computation(format!("t distribution with df = {}: {}", df, e)))
}

fn chi_squared(df: f64) -> Result<ChiSquared> {
    ChiSquared::new(df)
        .map_err(|e| CoreError::Computation(format!("chi-square distribution with df = {}: {}", df, e)))
}

fn fisher_snedecor(df1: f64, df2: f64) -> Result<FisherSnedecor> {
    FisherSnedecor::new(df1, df2).map_err(|e| {
        CoreError::Computation(format!(
            "F distribution with df = ({}, {}): {}",
            df1, df2, e
        ))
    })
}
