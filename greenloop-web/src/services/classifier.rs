//! Waste classification client
//!
//! Sends the uploaded image plus a fixed instruction prompt to the
//! hosted generative model and validates the reply against the domain
//! rules: waste type from the fixed set, quantity as number-plus-unit,
//! confidence in [0, 1]. One attempt per call - the user re-triggers
//! manually on failure.

use greenloop_common::{VerificationResult, WasteType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MODEL_NAME: &str = "gemini-1.5-flash";
const USER_AGENT: &str = "GreenLoop/0.1.0 (waste-reporting)";

/// Fixed instruction prompt. Demands a bare JSON object so the reply
/// can be parsed without free-text heuristics.
const CLASSIFY_PROMPT: &str = r#"Analyze this waste image and respond ONLY with a valid JSON object in exactly this format, no other text:
{
  "wasteType": "plastic",
  "quantity": "2.5 kg",
  "confidence": 0.95
}

Notes:
- wasteType must be one of: plastic, paper, glass, metal, organic
- quantity must include a number and unit (kg or L)
- confidence must be a number between 0 and 1
- Do not include any explanations or additional text
- Ensure the response is valid JSON"#;

/// Models wrap JSON replies in Markdown fences despite instructions;
/// strip the fences before parsing.
static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\n?|\n?```").expect("code fence regex"));

/// Quantity format: leading number, optional decimals, unit kg or L
static QUANTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d+\.?\d*\s*(kg|l)$").expect("quantity regex"));

/// Classifier client errors. Parse and validation failures are
/// distinguished from network failures for diagnostics only; callers
/// treat them all as a failed verification.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Model returned no text")]
    EmptyReply,

    #[error("Failed to parse model reply: {0}")]
    ParseError(String),

    #[error("Model reply failed validation: {0}")]
    InvalidReply(String),
}

/// Reply JSON as the prompt demands it on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReply {
    waste_type: String,
    quantity: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Waste classification client
pub struct WasteClassifier {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WasteClassifier {
    pub fn new(api_key: String) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (test stubs)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Classify one waste image. `image_base64` is the bare payload
    /// (no data-URL prefix).
    pub async fn classify(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<VerificationResult, ClassifierError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, MODEL_NAME, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": CLASSIFY_PROMPT },
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": image_base64,
                        }
                    }
                ]
            }],
            "generationConfig": {
                "temperature": 0.1,
                "topK": 32,
                "topP": 1,
                "maxOutputTokens": 4096,
            }
        });

        tracing::debug!(mime_type = mime_type, "Querying classification API");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ClassifierError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::ApiError(status.as_u16(), error_text));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::ParseError(e.to_string()))?;

        let text = reply
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or(ClassifierError::EmptyReply)?;

        let result = parse_reply(text)?;

        tracing::info!(
            waste_type = %result.waste_type,
            quantity = %result.quantity,
            confidence = result.confidence,
            "Waste classification successful"
        );

        Ok(result)
    }
}

/// Parse and validate the model's reply text.
///
/// Strips Markdown code fences, parses the JSON object, and enforces
/// the domain rules. Fenced and unfenced replies parse identically.
pub fn parse_reply(text: &str) -> Result<VerificationResult, ClassifierError> {
    let cleaned = CODE_FENCE_RE.replace_all(text.trim(), "");
    let cleaned = cleaned.trim();

    let raw: RawReply = serde_json::from_str(cleaned)
        .map_err(|e| ClassifierError::ParseError(e.to_string()))?;

    let waste_type: WasteType = raw.waste_type.parse().map_err(|_| {
        ClassifierError::InvalidReply(format!("waste type not recognized: {}", raw.waste_type))
    })?;

    let quantity = raw.quantity.trim();
    if !QUANTITY_RE.is_match(quantity) {
        return Err(ClassifierError::InvalidReply(format!(
            "quantity must be a number followed by kg or L, got: {}",
            raw.quantity
        )));
    }

    if !(0.0..=1.0).contains(&raw.confidence) {
        return Err(ClassifierError::InvalidReply(format!(
            "confidence outside [0, 1]: {}",
            raw.confidence
        )));
    }

    Ok(VerificationResult {
        waste_type,
        quantity: quantity.to_string(),
        confidence: raw.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WasteClassifier::new("test_key".to_string());
        assert!(client.is_ok());
    }

    #[test]
    fn test_parse_plain_reply() {
        let result =
            parse_reply(r#"{"wasteType":"plastic","quantity":"2.5 kg","confidence":0.95}"#)
                .unwrap();

        assert_eq!(result.waste_type, WasteType::Plastic);
        assert_eq!(result.quantity, "2.5 kg");
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_parse_fenced_reply_matches_unfenced() {
        let fenced =
            "```json\n{\"wasteType\":\"metal\",\"quantity\":\"3 kg\",\"confidence\":0.8}\n```";
        let unfenced = r#"{"wasteType":"metal","quantity":"3 kg","confidence":0.8}"#;

        assert_eq!(parse_reply(fenced).unwrap(), parse_reply(unfenced).unwrap());
        let result = parse_reply(fenced).unwrap();
        assert_eq!(result.waste_type, WasteType::Metal);
        assert_eq!(result.quantity, "3 kg");
    }

    #[test]
    fn test_parse_fence_without_language_tag() {
        let fenced = "```\n{\"wasteType\":\"paper\",\"quantity\":\"1 kg\",\"confidence\":0.7}\n```";
        assert_eq!(
            parse_reply(fenced).unwrap().waste_type,
            WasteType::Paper
        );
    }

    #[test]
    fn test_invalid_waste_type_rejected() {
        let err =
            parse_reply(r#"{"wasteType":"rubber","quantity":"1 kg","confidence":0.5}"#)
                .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidReply(_)));
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = parse_reply(r#"{"wasteType":"plastic","confidence":0.5}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::ParseError(_)));
    }

    #[test]
    fn test_non_numeric_confidence_rejected() {
        let err = parse_reply(r#"{"wasteType":"plastic","quantity":"1 kg","confidence":"high"}"#)
            .unwrap_err();
        assert!(matches!(err, ClassifierError::ParseError(_)));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        for confidence in ["1.5", "-0.1"] {
            let reply = format!(
                r#"{{"wasteType":"glass","quantity":"1 kg","confidence":{}}}"#,
                confidence
            );
            let err = parse_reply(&reply).unwrap_err();
            assert!(matches!(err, ClassifierError::InvalidReply(_)));
        }
    }

    #[test]
    fn test_confidence_bounds_inclusive() {
        for confidence in ["0", "1"] {
            let reply = format!(
                r#"{{"wasteType":"glass","quantity":"1 kg","confidence":{}}}"#,
                confidence
            );
            assert!(parse_reply(&reply).is_ok());
        }
    }

    #[test]
    fn test_quantity_formats() {
        let valid = ["2.5 kg", "3 kg", "10 L", "0.5kg", "2 l", "15 KG"];
        for quantity in valid {
            let reply = format!(
                r#"{{"wasteType":"organic","quantity":"{}","confidence":0.9}}"#,
                quantity
            );
            assert!(parse_reply(&reply).is_ok(), "should accept {:?}", quantity);
        }

        let invalid = ["kg", "2.5", "2.5 lbs", "about 2 kg", "2 kg extra", "-3 kg"];
        for quantity in invalid {
            let reply = format!(
                r#"{{"wasteType":"organic","quantity":"{}","confidence":0.9}}"#,
                quantity
            );
            assert!(parse_reply(&reply).is_err(), "should reject {:?}", quantity);
        }
    }

    #[test]
    fn test_mixed_case_waste_type_normalized() {
        let result =
            parse_reply(r#"{"wasteType":"Plastic","quantity":"2 kg","confidence":0.9}"#).unwrap();
        assert_eq!(result.waste_type, WasteType::Plastic);
        assert_eq!(result.waste_type.to_string(), "plastic");
    }

    #[test]
    fn test_non_json_reply_rejected() {
        let err = parse_reply("I think this is some plastic, maybe 2 kg of it.").unwrap_err();
        assert!(matches!(err, ClassifierError::ParseError(_)));
    }
}
