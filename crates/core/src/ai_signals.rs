//! Normalization of untrusted AI research output.
//!
//! The research collaborator returns loosely structured JSON. Nothing from
//! it reaches domain logic as-is: enum fields are checked against closed
//! allow-lists with safe fallbacks, free text is trimmed and length-capped,
//! arrays are item-capped and filtered to strings, and rates must be finite
//! and positive or they are dropped.

use serde::Serialize;
use serde_json::Value;

use crate::benchmark::Confidence;
use crate::seniority::SeniorityLevel;

// ---------------------------------------------------------------------------
// Caps
// ---------------------------------------------------------------------------

/// Maximum length kept for any single free-text field or list item.
pub const MAX_TEXT_LEN: usize = 500;

/// Maximum number of items kept from any AI-provided array.
pub const MAX_LIST_ITEMS: usize = 10;

/// Upper bound accepted for any AI-suggested hourly rate.
pub const MAX_PLAUSIBLE_RATE: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Normalized shapes
// ---------------------------------------------------------------------------

/// Portfolio quality tier, validated against a closed allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Basic,
    Solid,
    Strong,
    Exceptional,
}

impl QualityTier {
    fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "solid" => Some(Self::Solid),
            "strong" => Some(Self::Strong),
            "exceptional" => Some(Self::Exceptional),
            _ => None,
        }
    }
}

/// A rate recommendation the AI produced itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AiRateSuggestion {
    pub hourly_rate: f64,
    pub low: f64,
    pub high: f64,
    /// Base rate from the AI's own calculation breakdown, when supplied.
    pub base_rate: Option<f64>,
    /// Seniority multiplier from the AI's own breakdown, when supplied.
    pub seniority_multiplier: Option<f64>,
}

/// Everything salvaged from one research response, fully validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSignals {
    pub seniority_level: Option<SeniorityLevel>,
    pub skill_areas: Vec<String>,
    pub specialization: Option<String>,
    pub quality_tier: Option<QualityTier>,
    pub confidence: Option<Confidence>,
    pub benchmark_category: Option<String>,
    pub summary: Option<String>,
    pub evidence: Vec<String>,
    pub limitations: Vec<String>,
    pub follow_up_questions: Vec<String>,
    pub recommended_rate: Option<AiRateSuggestion>,
}

// ---------------------------------------------------------------------------
// Field extraction helpers
// ---------------------------------------------------------------------------

fn capped_string(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.chars().take(MAX_TEXT_LEN).collect())
}

fn capped_string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(capped_string)
                .take(MAX_LIST_ITEMS)
                .collect()
        })
        .unwrap_or_default()
}

fn plausible_rate(value: Option<&Value>) -> Option<f64> {
    let rate = value?.as_f64()?;
    if rate.is_finite() && rate > 0.0 && rate <= MAX_PLAUSIBLE_RATE {
        Some(rate)
    } else {
        None
    }
}

fn extract_recommended_rate(raw: &Value) -> Option<AiRateSuggestion> {
    let rec = raw.get("recommended_rate")?;
    let hourly_rate = plausible_rate(rec.get("hourly_rate"))?;

    let range = rec.get("rate_range");
    let low = range
        .and_then(|r| plausible_rate(r.get("low")))
        .unwrap_or(hourly_rate);
    let high = range
        .and_then(|r| plausible_rate(r.get("high")))
        .unwrap_or(hourly_rate);
    // A nonsensical range collapses onto the point estimate.
    let (low, high) = if low <= high {
        (low, high)
    } else {
        (hourly_rate, hourly_rate)
    };

    let breakdown = raw.get("calculation_breakdown");
    let base_rate = breakdown.and_then(|b| plausible_rate(b.get("base_rate")));
    let seniority_multiplier = breakdown
        .and_then(|b| b.get("seniority_multiplier"))
        .and_then(Value::as_f64)
        .filter(|m| m.is_finite() && *m > 0.0 && *m <= 10.0);

    Some(AiRateSuggestion {
        hourly_rate,
        low,
        high,
        base_rate,
        seniority_multiplier,
    })
}

// ---------------------------------------------------------------------------
// Normalization entry point
// ---------------------------------------------------------------------------

/// Decode one raw research response into validated portfolio signals.
///
/// Unknown enum values, out-of-range numbers, and non-string list items are
/// dropped rather than rejected: the cascade treats them as "not provided"
/// and falls back accordingly.
pub fn normalize(raw: &Value) -> PortfolioSignals {
    let seniority_level = raw
        .get("seniority_level")
        .and_then(Value::as_str)
        .and_then(|s| SeniorityLevel::from_str_db(s.trim().to_lowercase().as_str()).ok());

    let quality_tier = raw
        .get("portfolio_quality_tier")
        .and_then(Value::as_str)
        .and_then(QualityTier::from_str_lenient);

    let confidence = raw
        .get("confidence")
        .and_then(Value::as_str)
        .and_then(Confidence::from_str_lenient);

    PortfolioSignals {
        seniority_level,
        skill_areas: capped_string_list(raw.get("skill_areas")),
        specialization: raw.get("specialization").and_then(capped_string),
        quality_tier,
        confidence,
        benchmark_category: raw.get("market_benchmark_category").and_then(capped_string),
        summary: raw.get("summary").and_then(capped_string),
        evidence: capped_string_list(raw.get("evidence")),
        limitations: capped_string_list(raw.get("limitations")),
        follow_up_questions: capped_string_list(raw.get("follow_up_questions")),
        recommended_rate: extract_recommended_rate(raw),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_response_normalizes() {
        let raw = json!({
            "seniority_level": "Senior",
            "skill_areas": ["branding", "logo design"],
            "specialization": "  brand identity  ",
            "portfolio_quality_tier": "strong",
            "confidence": "medium",
            "market_benchmark_category": "Logo Design",
            "summary": "Established visual designer.",
            "evidence": ["12 client projects", "consistent style"],
            "limitations": [],
            "follow_up_questions": ["What is your niche?"],
            "recommended_rate": {
                "hourly_rate": 45.0,
                "rate_range": { "low": 38.0, "high": 55.0 },
                "reasoning": "senior-level output"
            },
            "calculation_breakdown": {
                "base_rate": 34.6,
                "seniority_multiplier": 1.3
            }
        });

        let signals = normalize(&raw);
        assert_eq!(signals.seniority_level, Some(SeniorityLevel::Senior));
        assert_eq!(signals.skill_areas, vec!["branding", "logo design"]);
        assert_eq!(signals.specialization.as_deref(), Some("brand identity"));
        assert_eq!(signals.quality_tier, Some(QualityTier::Strong));
        assert_eq!(signals.confidence, Some(Confidence::Medium));
        assert_eq!(signals.benchmark_category.as_deref(), Some("Logo Design"));

        let rec = signals.recommended_rate.unwrap();
        assert_eq!(rec.hourly_rate, 45.0);
        assert_eq!(rec.low, 38.0);
        assert_eq!(rec.high, 55.0);
        assert_eq!(rec.base_rate, Some(34.6));
        assert_eq!(rec.seniority_multiplier, Some(1.3));
    }

    #[test]
    fn empty_response_yields_defaults() {
        let signals = normalize(&json!({}));
        assert_eq!(signals, PortfolioSignals::default());
    }

    #[test]
    fn unknown_enum_values_are_dropped() {
        let raw = json!({
            "seniority_level": "wizard",
            "portfolio_quality_tier": "legendary",
            "confidence": "absolute"
        });
        let signals = normalize(&raw);
        assert_eq!(signals.seniority_level, None);
        assert_eq!(signals.quality_tier, None);
        assert_eq!(signals.confidence, None);
    }

    #[test]
    fn wrong_types_are_dropped_not_fatal() {
        let raw = json!({
            "seniority_level": 3,
            "skill_areas": "not a list",
            "summary": ["not", "text"],
            "recommended_rate": "forty"
        });
        let signals = normalize(&raw);
        assert_eq!(signals.seniority_level, None);
        assert!(signals.skill_areas.is_empty());
        assert_eq!(signals.summary, None);
        assert_eq!(signals.recommended_rate, None);
    }

    #[test]
    fn lists_are_item_capped_and_string_filtered() {
        let many: Vec<Value> = (0..25).map(|i| json!(format!("skill {i}"))).collect();
        let raw = json!({ "skill_areas": many });
        assert_eq!(normalize(&raw).skill_areas.len(), MAX_LIST_ITEMS);

        let mixed = json!({ "evidence": ["real", 42, null, {"k": "v"}, "also real"] });
        assert_eq!(normalize(&mixed).evidence, vec!["real", "also real"]);
    }

    #[test]
    fn text_is_length_capped() {
        let long = "x".repeat(2000);
        let raw = json!({ "summary": long });
        assert_eq!(normalize(&raw).summary.unwrap().len(), MAX_TEXT_LEN);
    }

    #[test]
    fn implausible_rates_are_dropped() {
        for bad in [0.0, -15.0, 1_000_000.0] {
            let raw = json!({ "recommended_rate": { "hourly_rate": bad } });
            assert_eq!(normalize(&raw).recommended_rate, None);
        }
    }

    #[test]
    fn inverted_rate_range_collapses_to_point() {
        let raw = json!({
            "recommended_rate": {
                "hourly_rate": 40.0,
                "rate_range": { "low": 60.0, "high": 30.0 }
            }
        });
        let rec = normalize(&raw).recommended_rate.unwrap();
        assert_eq!(rec.low, 40.0);
        assert_eq!(rec.high, 40.0);
    }

    #[test]
    fn missing_range_defaults_to_point_estimate() {
        let raw = json!({ "recommended_rate": { "hourly_rate": 40.0 } });
        let rec = normalize(&raw).recommended_rate.unwrap();
        assert_eq!(rec.low, 40.0);
        assert_eq!(rec.high, 40.0);
    }
}
