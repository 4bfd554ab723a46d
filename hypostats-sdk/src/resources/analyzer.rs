//! Question analyzer
//!
//! Sends a free-text hypothesis testing question to an OpenAI-compatible
//! chat completion endpoint and turns the model's reply into test
//! parameters.

use std::sync::{Arc, OnceLock};

use hypostats_core::{HypothesisTestRequest, TailDirection};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::HttpClient;
use crate::config::AnalyzerSettings;
use crate::error::{SdkError, SdkResult};

const COMPLETIONS_PATH: &str = "/chat/completions";
const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 1000;

/// Fields the model must always return.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "numSamples",
    "claimType",
    "pValue",
    "isKnown",
    "hypothesizedValue",
    "claimDirection",
];

const UNEXPECTED_FORMAT: &str =
    "Failed to parse AI analysis. The AI response was not in the expected format.";

/// Parameters extracted from a question, in the same shape as the test form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedQuestion {
    pub num_samples: u8,
    pub claim_type: u8,
    pub p_value: f64,
    pub is_known: String,
    pub hypothesized_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_param: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_param2: Option<f64>,
    pub claim_direction: TailDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl AnalyzedQuestion {
    /// Combine the extracted parameters with observed data.
    pub fn into_request(self, csv_data: impl Into<String>) -> HypothesisTestRequest {
        HypothesisTestRequest {
            num_samples: Some(self.num_samples),
            claim_type: Some(self.claim_type),
            p_value: Some(self.p_value),
            csv_data: Some(csv_data.into()),
            is_known: Some(self.is_known),
            hypothesized_value: Some(self.hypothesized_value),
            known_param: self.known_param,
            known_param2: self.known_param2,
            claim_direction: Some(self.claim_direction),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct QuestionAnalyzer {
    client: Arc<HttpClient>,
    model: String,
}

impl QuestionAnalyzer {
    pub fn new(client: Arc<HttpClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_settings(settings: &AnalyzerSettings) -> SdkResult<Self> {
        let client = HttpClient::new(settings.to_sdk_config()?)?;
        Ok(Self::new(Arc::new(client), settings.model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extract test parameters from `question`.
    pub async fn analyze(&self, question: &str) -> SdkResult<AnalyzedQuestion> {
        if question.trim().is_empty() {
            return Err(SdkError::ValidationError(
                "questionText must not be empty".to_string(),
            ));
        }

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(question),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %self.model, "Requesting question analysis");
        let reply: ChatCompletionResponse = self.client.post(COMPLETIONS_PATH, request).await?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .ok_or_else(|| {
                SdkError::MalformedResponse("Invalid response format from AI service".to_string())
            })?;

        parse_analysis(&content).map_err(|e| {
            warn!(reply = %content, "Could not interpret analyzer reply");
            e
        })
    }
}

/// Prompt asking the model for a single JSON object.
pub fn build_prompt(question: &str) -> String {
    format!(
        r#"
You are an expert statistician. Analyze the following hypothesis testing question and extract the key parameters. Return your response as a JSON object with the following structure:

{{
  "numSamples": 1 or 2,
  "claimType": 1 for mean testing, 2 for standard deviation/variance testing,
  "pValue": significance level (e.g., 0.05),
  "isKnown": "yes" if population parameter is known, "no" if unknown,
  "hypothesizedValue": the value being tested (μ₀ or σ₀),
  "knownParam": known population parameter if applicable (σ for mean tests, μ for variance tests),
  "knownParam2": second known parameter for two-sample tests if applicable,
  "claimDirection": "greater" for >, "less" for <, "equal" for ≠ (two-tailed),
  "explanation": "Brief explanation of your analysis"
}}

Guidelines:
- For mean tests: claimType = 1
- For variance/standard deviation tests: claimType = 2
- If testing μ > μ₀ or μ ≥ μ₀: claimDirection = "greater"
- If testing μ < μ₀ or μ ≤ μ₀: claimDirection = "less"
- If testing μ ≠ μ₀ or μ = μ₀ (two-tailed): claimDirection = "equal"
- If population σ is given: isKnown = "yes", knownParam = σ value
- If population μ is given for variance tests: isKnown = "yes", knownParam = μ value
- Default significance level is 0.05 if not specified
- For two-sample tests, numSamples = 2

Question to analyze:
{question}

Return only the JSON object, no additional text.
"#
    )
}

/// Interpret the model's reply text.
///
/// The outermost `{...}` span is parsed when present, otherwise the whole
/// reply. Numbers given as strings are accepted.
pub fn parse_analysis(reply: &str) -> SdkResult<AnalyzedQuestion> {
    let text = extract_json(reply).unwrap_or(reply);
    let value: Value = serde_json::from_str(text)
        .map_err(|_| SdkError::MalformedResponse(UNEXPECTED_FORMAT.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| SdkError::MalformedResponse(UNEXPECTED_FORMAT.to_string()))?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(SdkError::MalformedResponse(format!(
            "Missing required field: {}",
            missing
        )));
    }

    Ok(AnalyzedQuestion {
        num_samples: small_integer(object, "numSamples")?,
        claim_type: small_integer(object, "claimType")?,
        p_value: number(object, "pValue")?,
        is_known: known_flag(object)?,
        hypothesized_value: number(object, "hypothesizedValue")?,
        known_param: optional_number(object, "knownParam")?,
        known_param2: optional_number(object, "knownParam2")?,
        claim_direction: direction(object)?,
        explanation: object
            .get("explanation")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn extract_json(reply: &str) -> Option<&str> {
    static OBJECT: OnceLock<Regex> = OnceLock::new();
    let object = OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid object pattern"));
    object.find(reply).map(|m| m.as_str())
}

fn coerce(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn number(object: &Map<String, Value>, field: &str) -> SdkResult<f64> {
    object.get(field).and_then(coerce).ok_or_else(|| {
        SdkError::MalformedResponse(format!("Field {} is not a number", field))
    })
}

fn small_integer(object: &Map<String, Value>, field: &str) -> SdkResult<u8> {
    let value = number(object, field)?;
    if value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(SdkError::MalformedResponse(format!(
            "Field {} must be a small whole number, got {}",
            field, value
        )))
    }
}

/// Absent, null, false and empty all mean "not given". Zero is a real value.
fn optional_number(object: &Map<String, Value>, field: &str) -> SdkResult<Option<f64>> {
    match object.get(field) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => match coerce(value) {
            Some(v) => Ok(Some(v)),
            None => Err(SdkError::MalformedResponse(format!(
                "Field {} is not a number",
                field
            ))),
        },
    }
}

fn known_flag(object: &Map<String, Value>) -> SdkResult<String> {
    match object.get("isKnown") {
        Some(Value::Bool(true)) => Ok("yes".to_string()),
        Some(Value::Bool(false)) => Ok("no".to_string()),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "yes" | "true" => Ok("yes".to_string()),
            "no" | "false" => Ok("no".to_string()),
            other => Err(SdkError::MalformedResponse(format!(
                "Field isKnown must be \"yes\" or \"no\", got '{}'",
                other
            ))),
        },
        _ => Err(SdkError::MalformedResponse(
            "Field isKnown must be \"yes\" or \"no\"".to_string(),
        )),
    }
}

fn direction(object: &Map<String, Value>) -> SdkResult<TailDirection> {
    object
        .get("claimDirection")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<TailDirection>().ok())
        .ok_or_else(|| {
            SdkError::MalformedResponse(
                "Field claimDirection must be \"greater\", \"less\" or \"equal\"".to_string(),
            )
        })
}
