use approx::assert_relative_eq;
use hypostats_engine::ReferenceDistribution;
use test_case::test_case;

#[test_case(ReferenceDistribution::StandardNormal, 0.975, 1.959964 ; "normal 97.5%")]
#[test_case(ReferenceDistribution::StandardNormal, 0.95, 1.644854 ; "normal 95%")]
#[test_case(ReferenceDistribution::StudentsT { df: 9.0 }, 0.975, 2.262157 ; "t9 97.5%")]
#[test_case(ReferenceDistribution::StudentsT { df: 24.0 }, 0.975, 2.063899 ; "t24 97.5%")]
#[test_case(ReferenceDistribution::StudentsT { df: 9.0 }, 0.95, 1.833113 ; "t9 95%")]
#[test_case(ReferenceDistribution::ChiSquared { df: 9.0 }, 0.95, 16.918978 ; "chi2 9 95%")]
#[test_case(ReferenceDistribution::ChiSquared { df: 9.0 }, 0.05, 3.325113 ; "chi2 9 5%")]
#[test_case(ReferenceDistribution::ChiSquared { df: 1.0 }, 0.95, 3.841459 ; "chi2 1 95%")]
#[test_case(ReferenceDistribution::FisherSnedecor { df1: 9.0, df2: 9.0 }, 0.95, 3.178893 ; "F 9 9 95%")]
#[test_case(ReferenceDistribution::FisherSnedecor { df1: 9.0, df2: 9.0 }, 0.975, 4.025994 ; "F 9 9 97.5%")]
#[test_case(ReferenceDistribution::FisherSnedecor { df1: 5.0, df2: 10.0 }, 0.95, 3.325835 ; "F 5 10 95%")]
fn test_quantile_matches_tables(dist: ReferenceDistribution, p: f64, expected: f64) {
    let q = dist.quantile(p).unwrap();
    assert_relative_eq!(q, expected, epsilon = 1e-5);
}

#[test]
fn test_quantile_inverts_cdf() {
    let distributions = [
        ReferenceDistribution::StandardNormal,
        ReferenceDistribution::StudentsT { df: 3.5 },
        ReferenceDistribution::ChiSquared { df: 12.0 },
        ReferenceDistribution::FisherSnedecor { df1: 3.0, df2: 17.0 },
    ];

    for dist in distributions {
        for p in [0.001, 0.025, 0.3, 0.5, 0.9, 0.995] {
            let q = dist.quantile(p).unwrap();
            assert_relative_eq!(dist.cdf(q).unwrap(), p, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_f_quantile_reciprocal_property() {
    let forward = ReferenceDistribution::FisherSnedecor { df1: 4.0, df2: 7.0 };
    let swapped = ReferenceDistribution::FisherSnedecor { df1: 7.0, df2: 4.0 };

    let lower = forward.quantile(0.05).unwrap();
    let upper = swapped.quantile(0.95).unwrap();
    assert_relative_eq!(lower, 1.0 / upper, epsilon = 1e-8);
}

#[test]
fn test_cdf_and_sf_are_complementary() {
    let dist = ReferenceDistribution::ChiSquared { df: 5.0 };
    for x in [0.5, 2.0, 4.35, 11.07, 20.0] {
        assert_relative_eq!(dist.cdf(x).unwrap() + dist.sf(x).unwrap(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_median_of_skewed_distribution_is_positive() {
    let chi = ReferenceDistribution::ChiSquared { df: 9.0 };
    let median = chi.median().unwrap();
    assert!(median > 8.0 && median < 9.0);
    assert_eq!(ReferenceDistribution::StudentsT { df: 4.0 }.median().unwrap(), 0.0);
}
