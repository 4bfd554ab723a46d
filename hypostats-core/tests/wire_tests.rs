use hypostats_core::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn wire(value: serde_json::Value) -> HypothesisTestRequest {
    serde_json::from_value(value).unwrap()
}

// ===== Request Conversion =====

#[test]
fn test_wire_request_from_form_json() {
    let request = wire(json!({
        "numSamples": 1,
        "claimType": 1,
        "pValue": 0.01,
        "csvData": "1\n2\n3\n4",
        "isKnown": "yes",
        "hypothesizedValue": 2.0,
        "knownParam": 1.5,
        "knownParam2": null,
        "claimDirection": "greater"
    }));

    let test_request = request.into_test_request().unwrap();
    assert_eq!(test_request.sample_count, 1);
    assert_eq!(test_request.claim_kind, ClaimKind::Mean);
    assert_eq!(test_request.significance, 0.01);
    assert_eq!(test_request.samples, vec![vec![1.0, 2.0, 3.0, 4.0]]);
    assert!(test_request.population_param_known);
    assert_eq!(test_request.known_param, Some(1.5));
    assert_eq!(test_request.tail_direction, TailDirection::Greater);
}

#[test]
fn test_wire_request_defaults() {
    let request = wire(json!({
        "numSamples": 2,
        "claimType": 2,
        "csvData": "1,2\n3,5\n4,9",
        "claimDirection": "equal"
    }));

    let test_request = TestRequest::try_from(request).unwrap();
    assert_eq!(test_request.significance, DEFAULT_SIGNIFICANCE);
    assert!(!test_request.population_param_known);
    assert_eq!(test_request.samples.len(), 2);
}

#[test]
fn test_wire_request_empty_is_known_means_unknown() {
    let request = wire(json!({
        "numSamples": 1,
        "claimType": 1,
        "csvData": "1\n2",
        "isKnown": "",
        "hypothesizedValue": 0,
        "claimDirection": "less"
    }));
    assert!(!request.into_test_request().unwrap().population_param_known);
}

#[test]
fn test_wire_request_missing_fields() {
    let err = wire(json!({ "pValue": 0.05 })).into_test_request().unwrap_err();
    match err {
        CoreError::Validation(errors) => {
            assert!(errors.contains("numSamples"));
            assert!(errors.contains("claimType"));
            assert!(errors.contains("csvData"));
            assert!(errors.contains("claimDirection"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_wire_request_out_of_range_codes() {
    let err = wire(json!({
        "numSamples": 3,
        "claimType": 1,
        "csvData": "1",
        "claimDirection": "equal"
    }))
    .into_test_request()
    .unwrap_err();
    assert!(err.to_string().contains("numSamples"));
}

#[test]
fn test_wire_request_combines_csv_and_parameter_errors() {
    let err = wire(json!({
        "numSamples": 1,
        "claimType": 1,
        "pValue": 1.2,
        "csvData": "1\nfoo",
        "isKnown": "maybe",
        "hypothesizedValue": 0,
        "claimDirection": "equal"
    }))
    .into_test_request()
    .unwrap_err();

    match err {
        CoreError::Validation(errors) => {
            assert!(errors.contains("pValue"));
            assert!(errors.contains("isKnown"));
            assert!(errors.contains("csvData"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_wire_request_rejects_unknown_direction() {
    let result = serde_json::from_value::<HypothesisTestRequest>(json!({
        "numSamples": 1,
        "claimDirection": "sideways"
    }));
    assert!(result.is_err());
}

#[test]
fn test_wire_request_serializes_camel_case() {
    let request = HypothesisTestRequest {
        num_samples: Some(1),
        claim_type: Some(1),
        csv_data: Some("1\n2".to_string()),
        claim_direction: Some(TailDirection::Less),
        ..Default::default()
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["numSamples"], json!(1));
    assert_eq!(value["csvData"], json!("1\n2"));
    assert_eq!(value["claimDirection"], json!("less"));
    assert!(value.get("knownParam").is_none());
}

// ===== Response Shape =====

fn one_sample_result() -> TestResult {
    TestResult {
        test_type: TestKind::OneSampleZ,
        reject_null: false,
        conclusion: "Fail to reject the null hypothesis.".to_string(),
        test_statistic: -1.6667,
        critical_region: CriticalRegion::TwoSided { lower: -1.96, upper: 1.96 },
        critical_value: -1.96,
        p_value: 0.0956,
        significance: 0.05,
        degrees_of_freedom: DegreesOfFreedom::None,
        descriptive: vec![SampleSummary {
            size: 25,
            mean: 495.0,
            std_dev: Some(0.0),
            variance: Some(0.0),
        }],
    }
}

#[test]
fn test_response_one_sample_fields() {
    let response = HypothesisTestResponse::from(&one_sample_result());
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["conclusion"], json!("Fail to reject the null hypothesis."));
    assert_eq!(value["details"]["test_type"], json!("one-sample z-test"));
    assert_eq!(value["details"]["sample_size"], json!(25));
    assert_eq!(value["details"]["critical_value_lower"], json!(-1.96));
    assert_eq!(value["details"]["critical_value_upper"], json!(1.96));
    assert!(value["details"].get("sample_size1").is_none());
    assert!(value["details"].get("degrees_of_freedom").is_none());
    assert!(!response.rejects_null());
}

#[test]
fn test_response_two_sample_fields() {
    let result = TestResult {
        test_type: TestKind::FVarianceRatio,
        reject_null: true,
        conclusion: "Reject the null hypothesis.".to_string(),
        test_statistic: 4.2,
        critical_region: CriticalRegion::Upper { value: 3.18 },
        critical_value: 3.18,
        p_value: 0.02,
        significance: 0.05,
        degrees_of_freedom: DegreesOfFreedom::Pair(9.0, 9.0),
        descriptive: vec![
            SampleSummary { size: 10, mean: 1.0, std_dev: Some(2.0), variance: Some(4.0) },
            SampleSummary { size: 10, mean: 3.0, std_dev: Some(1.0), variance: Some(1.0) },
        ],
    };

    let response = HypothesisTestResponse::from(result);
    let details = &response.details;
    assert_eq!(details.sample_size1, Some(10));
    assert_eq!(details.sample_variance1, Some(4.0));
    assert_eq!(details.sample_variance2, Some(1.0));
    assert_eq!(details.df1, Some(9.0));
    assert_eq!(details.critical_value_lower, None);
    assert!(response.rejects_null());

    let json = serde_json::to_string(&response).unwrap();
    let parsed: HypothesisTestResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, response);
}

#[test]
fn test_response_accepts_sparse_upstream_payload() {
    let parsed: HypothesisTestResponse = serde_json::from_value(json!({
        "conclusion": "Reject the null hypothesis",
        "details": { "test_statistic": 2.5, "sample_size": 12 }
    }))
    .unwrap();
    assert_eq!(parsed.details.test_statistic, Some(2.5));
    assert_eq!(parsed.details.p_value, None);
}
