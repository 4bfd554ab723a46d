use approx::relative_eq;
use hypostats_core::*;
use hypostats_engine::{critical_region, HypothesisTestEngine, ReferenceDistribution};
use proptest::prelude::*;

fn sample(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000.0..1_000.0_f64, min_len..40)
        .prop_filter("needs spread", |v| v.iter().any(|x| (x - v[0]).abs() > 1.0))
}

fn tail() -> impl Strategy<Value = TailDirection> {
    prop_oneof![
        Just(TailDirection::Greater),
        Just(TailDirection::Less),
        Just(TailDirection::Equal),
    ]
}

proptest! {
    #[test]
    fn prop_row_order_does_not_change_the_verdict(
        data in sample(3),
        mu0 in -100.0..100.0_f64,
        tail in tail(),
        rotation in 0usize..40,
    ) {
        let engine = HypothesisTestEngine::new();
        let mut shuffled = data.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left(rotation % len);

        let base = TestRequest::one_sample(ClaimKind::Mean, data)
            .with_hypothesized_value(mu0)
            .with_tail(tail);
        let mut permuted = base.clone();
        permuted.samples = vec![shuffled];

        let a = engine.run(&base).unwrap();
        let b = engine.run(&permuted).unwrap();

        prop_assert!(relative_eq!(a.test_statistic, b.test_statistic, epsilon = 1e-9, max_relative = 1e-9));
        prop_assert_eq!(a.critical_value, b.critical_value);
        prop_assert_eq!(a.descriptive[0].size, b.descriptive[0].size);
    }

    #[test]
    fn prop_symmetric_critical_values_mirror(alpha in 0.001..0.5_f64, df in 1.0..200.0_f64) {
        for dist in [ReferenceDistribution::StandardNormal, ReferenceDistribution::StudentsT { df }] {
            let region = critical_region(&dist, TailDirection::Equal, alpha).unwrap();
            prop_assert_eq!(region.lower().unwrap(), -region.upper().unwrap());

            let upper = critical_region(&dist, TailDirection::Greater, alpha).unwrap();
            let lower = critical_region(&dist, TailDirection::Less, alpha).unwrap();
            prop_assert_eq!(upper.upper().unwrap(), -lower.lower().unwrap());
        }
    }

    #[test]
    fn prop_skewed_two_sided_region_straddles_median(
        alpha in 0.001..0.5_f64,
        df1 in 1.0..60.0_f64,
        df2 in 1.0..60.0_f64,
    ) {
        for dist in [
            ReferenceDistribution::ChiSquared { df: df1 },
            ReferenceDistribution::FisherSnedecor { df1, df2 },
        ] {
            let region = critical_region(&dist, TailDirection::Equal, alpha).unwrap();
            let median = dist.median().unwrap();
            prop_assert!(region.lower().unwrap() > 0.0);
            prop_assert!(region.lower().unwrap() < median);
            prop_assert!(median < region.upper().unwrap());
        }
    }

    #[test]
    fn prop_decision_agrees_with_p_value(
        data in sample(2),
        mu0 in -100.0..100.0_f64,
        tail in tail(),
        alpha in 0.01..0.2_f64,
    ) {
        let request = TestRequest::one_sample(ClaimKind::Mean, data)
            .with_hypothesized_value(mu0)
            .with_significance(alpha)
            .with_tail(tail);
        let result = HypothesisTestEngine::new().run(&request).unwrap();

        prop_assert!((0.0..=1.0).contains(&result.p_value));
        // Away from the boundary the two criteria must agree.
        if (result.p_value - alpha).abs() > 1e-6 {
            prop_assert_eq!(result.reject_null, result.p_value < alpha);
        }
    }
}
