//! Place search client
//!
//! Resolves a free-text location query to a formatted address via the
//! hosted place-search API. Only the first candidate is used; the
//! location field stays free text when nothing matches.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const USER_AGENT: &str = "GreenLoop/0.1.0 (waste-reporting)";

/// Place search client errors
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    #[serde(default)]
    candidates: Vec<PlaceCandidate>,
}

#[derive(Debug, Deserialize)]
struct PlaceCandidate {
    formatted_address: Option<String>,
}

/// Place search client
pub struct PlacesClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PlacesClient {
    pub fn new(api_key: String) -> Result<Self, PlacesError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PlacesError::NetworkError(e.to_string()))?;

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

    /// Find the formatted address for a free-text query. Returns
    /// `None` when the service has no candidates.
    pub async fn search(&self, query: &str) -> Result<Option<String>, PlacesError> {
        let url = format!("{}/maps/api/place/findplacefromtext/json", self.base_url);
        let params = [
            ("input", query),
            ("inputtype", "textquery"),
            ("fields", "formatted_address"),
            ("key", self.api_key.as_str()),
        ];

        tracing::debug!("Querying place search API");

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| PlacesError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlacesError::ApiError(status.as_u16(), error_text));
        }

        let reply: FindPlaceResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::ParseError(e.to_string()))?;

        Ok(reply
            .candidates
            .into_iter()
            .find_map(|c| c.formatted_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(PlacesClient::new("test_key".to_string()).is_ok());
    }

    #[test]
    fn test_first_candidate_wins() {
        let reply: FindPlaceResponse = serde_json::from_str(
            r#"{"candidates":[
                {"formatted_address":"1 Green St, Springfield"},
                {"formatted_address":"2 Green St, Springfield"}
            ],"status":"OK"}"#,
        )
        .unwrap();

        let address = reply.candidates.into_iter().find_map(|c| c.formatted_address);
        assert_eq!(address.as_deref(), Some("1 Green St, Springfield"));
    }

    #[test]
    fn test_empty_candidates() {
        let reply: FindPlaceResponse =
            serde_json::from_str(r#"{"candidates":[],"status":"ZERO_RESULTS"}"#).unwrap();
        assert!(reply.candidates.is_empty());
    }
}
