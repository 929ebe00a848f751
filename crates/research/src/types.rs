//! Request payloads for the research service.

use serde::{Deserialize, Serialize};

/// Portfolio material submitted for analysis. At least one field should be
/// set; the cascade skips the research step entirely when all are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioMaterial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64-encoded document bytes (e.g. a PDF portfolio).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_base64: Option<String>,
}

impl PortfolioMaterial {
    /// Whether any material was actually provided.
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.text.is_none() && self.document_base64.is_none()
    }
}

/// Structured hints accompanying the portfolio material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_per_week: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Full portfolio research request body.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioResearchRequest<'a> {
    pub material: &'a PortfolioMaterial,
    pub hints: &'a ResearchHints,
}

/// Request body for interpreting one free-form onboarding answer.
#[derive(Debug, Clone, Serialize)]
pub struct InterpretAnswerRequest<'a> {
    pub question_key: &'a str,
    pub question_text: &'a str,
    pub expected_type: &'a str,
    pub raw_answer: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_material_detection() {
        assert!(PortfolioMaterial::default().is_empty());
        let with_url = PortfolioMaterial {
            url: Some("https://example.com/portfolio".to_string()),
            ..Default::default()
        };
        assert!(!with_url.is_empty());
    }

    #[test]
    fn absent_hint_fields_are_omitted_from_json() {
        let hints = ResearchHints {
            experience_years: Some(4.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&hints).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["experience_years"], 4.0);
    }
}
