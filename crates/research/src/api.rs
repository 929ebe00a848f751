//! REST API client for the research service HTTP endpoints.
//!
//! Wraps the portfolio-analysis and answer-interpretation endpoints using
//! [`reqwest`]. Responses are decoded only as far as `serde_json::Value`;
//! partial or oddly shaped JSON is the caller's problem to normalize,
//! a transport or non-2xx failure is an error here.

use crate::types::{InterpretAnswerRequest, PortfolioMaterial, PortfolioResearchRequest, ResearchHints};

/// HTTP client for a single research service instance.
pub struct ResearchApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the research REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ResearchApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The research service returned a non-2xx status code.
    #[error("Research API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ResearchApi {
    /// Create a new API client for a research service instance.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8600`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Analyze portfolio material and return the raw signal JSON.
    ///
    /// Sends a `POST /research/portfolio` request. The response body is
    /// returned as-is; callers normalize it before use.
    pub async fn analyze_portfolio(
        &self,
        material: &PortfolioMaterial,
        hints: &ResearchHints,
    ) -> Result<serde_json::Value, ResearchApiError> {
        let body = PortfolioResearchRequest { material, hints };

        let response = self
            .client
            .post(format!("{}/research/portfolio", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Interpret a free-form onboarding answer into a typed value.
    ///
    /// Sends a `POST /research/interpret` request. Returns the raw
    /// interpretation JSON (expected shape: `{ "value": ... }`); the
    /// onboarding validator decides whether the value is acceptable.
    pub async fn interpret_answer(
        &self,
        question_key: &str,
        question_text: &str,
        expected_type: &str,
        raw_answer: &str,
    ) -> Result<serde_json::Value, ResearchApiError> {
        let body = InterpretAnswerRequest {
            question_key,
            question_text,
            expected_type,
            raw_answer,
        };

        let response = self
            .client
            .post(format!("{}/research/interpret", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`ResearchApiError::ApiError`] containing
    /// the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ResearchApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ResearchApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body.
    async fn parse_response(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, ResearchApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}
