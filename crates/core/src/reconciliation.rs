//! Rate reconciliation cascade.
//!
//! Merges AI portfolio signals, explicit user overrides, market benchmarks,
//! and static defaults into one explainable rate recommendation. The three
//! rate sources form a tagged union so tier handling is exhaustively
//! checked; exactly one tier applies, evaluated in priority order.

use serde::{Deserialize, Serialize};

use crate::ai_signals::{AiRateSuggestion, PortfolioSignals};
use crate::benchmark::{default_estimate, Confidence};
use crate::seniority::SeniorityLevel;
use crate::types::round2;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Floor for a desired income reverse-derived from an accepted rate.
pub const MIN_DERIVED_INCOME: f64 = 300.0;

/// Billable hours assumed when a profile is created from an accepted rate
/// without explicit hours.
pub const DEFAULT_BILLABLE_HOURS: f64 = 160.0;

/// Profit margin assumed when a profile is created from an accepted rate
/// without an explicit margin.
pub const DEFAULT_PROFIT_MARGIN: f64 = 0.1;

/// Canned clarifying questions surfaced when confidence is not low.
pub const CLARIFYING_QUESTIONS: [&str; 2] = [
    "Which of your services brings in the most revenue today?",
    "What kind of clients do you want to attract at this rate?",
];

// ---------------------------------------------------------------------------
// AI call status
// ---------------------------------------------------------------------------

/// Outcome of the AI research step. Never fatal to the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    Used,
    Failed,
    Skipped,
}

impl AiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Used => "used",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

// ---------------------------------------------------------------------------
// Field resolution: override > AI signal > default
// ---------------------------------------------------------------------------

/// Explicit caller overrides for reconciled fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Overrides {
    pub seniority_level: Option<SeniorityLevel>,
    pub category: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// The reconciled field set the cascade operates on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmedValues {
    pub seniority_level: SeniorityLevel,
    pub confidence: Confidence,
    pub skills: Vec<String>,
    pub category_name: Option<String>,
    pub specialization: Option<String>,
}

/// Resolve confirmed values with precedence: explicit override > AI signal
/// > hard default (`mid` seniority, `low` confidence). Returns the field
/// names that were overridden.
pub fn resolve_confirmed(
    signals: Option<&PortfolioSignals>,
    overrides: &Overrides,
) -> (ConfirmedValues, Vec<String>) {
    let mut overridden = Vec::new();

    let seniority_level = match overrides.seniority_level {
        Some(level) => {
            overridden.push("seniority_level".to_string());
            level
        }
        None => signals
            .and_then(|s| s.seniority_level)
            .unwrap_or(SeniorityLevel::Mid),
    };

    let skills = match &overrides.skills {
        Some(skills) => {
            overridden.push("skills".to_string());
            skills.clone()
        }
        None => signals.map(|s| s.skill_areas.clone()).unwrap_or_default(),
    };

    let category_name = match &overrides.category {
        Some(category) => {
            overridden.push("category".to_string());
            Some(category.clone())
        }
        None => signals.and_then(|s| s.benchmark_category.clone()),
    };

    let confidence = signals
        .and_then(|s| s.confidence)
        .unwrap_or(Confidence::Low);

    let specialization = signals.and_then(|s| s.specialization.clone());

    (
        ConfirmedValues {
            seniority_level,
            confidence,
            skills,
            category_name,
            specialization,
        },
        overridden,
    )
}

// ---------------------------------------------------------------------------
// Suggested-rate cascade
// ---------------------------------------------------------------------------

/// Suggested price range, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateRange {
    pub low: f64,
    pub high: f64,
}

/// The median/p75 band of a resolved market benchmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkBand {
    pub median: f64,
    pub percentile_75: f64,
}

/// Which tier of the cascade produced the suggested rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    AiRecommendation,
    MarketBenchmark,
    DefaultEstimate,
}

/// One fully computed cascade tier. The variant carries everything needed
/// to explain the number it produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuggestedRate {
    AiRecommendation {
        hourly_rate: f64,
        range: RateRange,
        base_rate: Option<f64>,
        multiplier: f64,
    },
    MarketBenchmark {
        hourly_rate: f64,
        range: RateRange,
        median: f64,
        multiplier: f64,
    },
    DefaultEstimate {
        hourly_rate: f64,
        range: RateRange,
    },
}

impl SuggestedRate {
    pub fn hourly_rate(&self) -> f64 {
        match self {
            Self::AiRecommendation { hourly_rate, .. }
            | Self::MarketBenchmark { hourly_rate, .. }
            | Self::DefaultEstimate { hourly_rate, .. } => *hourly_rate,
        }
    }

    pub fn range(&self) -> RateRange {
        match self {
            Self::AiRecommendation { range, .. }
            | Self::MarketBenchmark { range, .. }
            | Self::DefaultEstimate { range, .. } => *range,
        }
    }

    pub fn base_rate(&self) -> Option<f64> {
        match self {
            Self::AiRecommendation { base_rate, .. } => *base_rate,
            Self::MarketBenchmark { median, .. } => Some(*median),
            Self::DefaultEstimate { hourly_rate, .. } => Some(*hourly_rate),
        }
    }

    /// Multiplier applied on top of the tier's base figure. Fixed at 1.0
    /// for the default table, which bakes seniority into its bands.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::AiRecommendation { multiplier, .. }
            | Self::MarketBenchmark { multiplier, .. } => *multiplier,
            Self::DefaultEstimate { .. } => 1.0,
        }
    }

    pub fn source(&self) -> RateSource {
        match self {
            Self::AiRecommendation { .. } => RateSource::AiRecommendation,
            Self::MarketBenchmark { .. } => RateSource::MarketBenchmark,
            Self::DefaultEstimate { .. } => RateSource::DefaultEstimate,
        }
    }

    /// One-line provenance note for the recommendation payload.
    pub fn note(&self) -> &'static str {
        match self {
            Self::AiRecommendation { .. } => {
                "Rate suggested by AI portfolio research."
            }
            Self::MarketBenchmark { .. } => {
                "Rate derived from market benchmark data for your category."
            }
            Self::DefaultEstimate { .. } => {
                "No market data matched; rate taken from the built-in seniority table."
            }
        }
    }
}

/// Evaluate the priority cascade. Exactly one tier applies:
/// AI recommendation, else resolved benchmark, else the static table.
pub fn suggest_rate(
    ai_rate: Option<&AiRateSuggestion>,
    benchmark: Option<BenchmarkBand>,
    seniority: SeniorityLevel,
) -> SuggestedRate {
    if let Some(rec) = ai_rate {
        let multiplier = rec
            .seniority_multiplier
            .unwrap_or_else(|| seniority.multiplier());
        return SuggestedRate::AiRecommendation {
            hourly_rate: round2(rec.hourly_rate),
            range: RateRange {
                low: round2(rec.low),
                high: round2(rec.high),
            },
            base_rate: rec.base_rate.map(round2),
            multiplier,
        };
    }

    if let Some(band) = benchmark {
        let multiplier = seniority.multiplier();
        let hourly_rate = round2(band.median * multiplier);
        return SuggestedRate::MarketBenchmark {
            hourly_rate,
            range: RateRange {
                low: hourly_rate,
                high: round2(band.percentile_75 * multiplier),
            },
            median: round2(band.median),
            multiplier,
        };
    }

    let band = default_estimate(seniority);
    SuggestedRate::DefaultEstimate {
        hourly_rate: round2(band.median),
        range: RateRange {
            low: round2(band.median),
            high: round2(band.percentile_75),
        },
    }
}

// ---------------------------------------------------------------------------
// Explainability
// ---------------------------------------------------------------------------

/// Why the recommendation says what it says.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explainability {
    pub summary: String,
    pub evidence: Vec<String>,
    pub limitations: Vec<String>,
}

/// Assemble the explainability block. When the AI step failed or was
/// skipped, the limitations state that explicitly.
pub fn explainability(
    ai_status: AiStatus,
    signals: Option<&PortfolioSignals>,
    confirmed: &ConfirmedValues,
    suggested: &SuggestedRate,
) -> Explainability {
    let summary = signals
        .and_then(|s| s.summary.clone())
        .unwrap_or_else(|| {
            format!(
                "Suggested {:.2}/h for a {} freelancer, {}",
                suggested.hourly_rate(),
                confirmed.seniority_level.as_str(),
                match suggested.source() {
                    RateSource::AiRecommendation => "based on AI portfolio research.",
                    RateSource::MarketBenchmark => "based on market benchmark data.",
                    RateSource::DefaultEstimate => "based on the built-in seniority table.",
                }
            )
        });

    let mut evidence = signals.map(|s| s.evidence.clone()).unwrap_or_default();
    match suggested {
        SuggestedRate::MarketBenchmark {
            median, multiplier, ..
        } => {
            evidence.push(format!(
                "Market median {median:.2}/h scaled by seniority multiplier {multiplier:.2}"
            ));
        }
        SuggestedRate::DefaultEstimate { hourly_rate, .. } => {
            evidence.push(format!(
                "Built-in {} estimate of {hourly_rate:.2}/h",
                confirmed.seniority_level.as_str()
            ));
        }
        SuggestedRate::AiRecommendation { .. } => {}
    }

    let mut limitations = signals.map(|s| s.limitations.clone()).unwrap_or_default();
    match ai_status {
        AiStatus::Failed => limitations.push(
            "AI portfolio research failed; the suggestion falls back to market or default data."
                .to_string(),
        ),
        AiStatus::Skipped => limitations.push(
            "AI portfolio research was skipped; the suggestion uses market or default data only."
                .to_string(),
        ),
        AiStatus::Used => {}
    }
    if confirmed.confidence == Confidence::Low {
        limitations.push("Confidence in the underlying signals is low.".to_string());
    }

    Explainability {
        summary,
        evidence,
        limitations,
    }
}

/// Follow-up questions for the client: AI-suggested ones when confidence is
/// low (canned if the AI offered none), otherwise two canned clarifying
/// questions.
pub fn follow_up_questions(
    confidence: Confidence,
    signals: Option<&PortfolioSignals>,
) -> Vec<String> {
    if confidence == Confidence::Low {
        if let Some(questions) = signals.map(|s| &s.follow_up_questions) {
            if !questions.is_empty() {
                return questions.clone();
            }
        }
    }
    CLARIFYING_QUESTIONS.iter().map(|q| q.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Full recommendation
// ---------------------------------------------------------------------------

/// The complete reconciliation output returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRecommendation {
    pub hourly_rate: f64,
    pub rate_range: RateRange,
    pub base_rate: Option<f64>,
    pub seniority_multiplier: f64,
    pub rate_source: RateSource,
    pub note: String,
    pub ai_status: AiStatus,
    pub confirmed_values: ConfirmedValues,
    pub overrides_applied: Vec<String>,
    pub follow_up_questions: Vec<String>,
    pub explainability: Explainability,
}

/// Assemble the final recommendation from the cascade pieces.
///
/// `benchmark` is the band fetched for the confirmed category and
/// seniority, when one resolved; the caller performs that lookup.
pub fn build_recommendation(
    ai_status: AiStatus,
    signals: Option<&PortfolioSignals>,
    overrides: &Overrides,
    benchmark: Option<BenchmarkBand>,
) -> RateRecommendation {
    let (confirmed, overrides_applied) = resolve_confirmed(signals, overrides);

    let ai_rate = signals.and_then(|s| s.recommended_rate.as_ref());
    let suggested = suggest_rate(ai_rate, benchmark, confirmed.seniority_level);

    let explainability = explainability(ai_status, signals, &confirmed, &suggested);
    let follow_ups = follow_up_questions(confirmed.confidence, signals);

    RateRecommendation {
        hourly_rate: suggested.hourly_rate(),
        rate_range: suggested.range(),
        base_rate: suggested.base_rate(),
        seniority_multiplier: suggested.multiplier(),
        rate_source: suggested.source(),
        note: suggested.note().to_string(),
        ai_status,
        confirmed_values: confirmed,
        overrides_applied,
        follow_up_questions: follow_ups,
        explainability,
    }
}

// ---------------------------------------------------------------------------
// Accept-flow derivations
// ---------------------------------------------------------------------------

/// Validate a rate being accepted into a profile. Checked before any I/O;
/// nothing else about the request can make a non-positive rate acceptable.
pub fn validate_accepted_rate(hourly_rate: f64) -> Result<(), crate::error::CoreError> {
    if !hourly_rate.is_finite() || hourly_rate <= 0.0 {
        return Err(crate::error::CoreError::Validation(format!(
            "Accepted hourly rate must be positive (got {hourly_rate})"
        )));
    }
    Ok(())
}

/// Reverse-derive a desired monthly income from an accepted rate:
/// `rate × hours − costs − costs × margin`, floored at
/// [`MIN_DERIVED_INCOME`].
pub fn derive_income_from_rate(
    hourly_rate: f64,
    billable_hours: f64,
    total_costs: f64,
    margin: f64,
) -> f64 {
    let derived = hourly_rate * billable_hours - total_costs - total_costs * margin;
    derived.max(MIN_DERIVED_INCOME)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_signals::normalize;
    use serde_json::json;

    fn ai_signals_with_rate() -> PortfolioSignals {
        normalize(&json!({
            "seniority_level": "senior",
            "confidence": "high",
            "market_benchmark_category": "Logo Design",
            "recommended_rate": {
                "hourly_rate": 45.0,
                "rate_range": { "low": 38.0, "high": 55.0 }
            }
        }))
    }

    fn band() -> BenchmarkBand {
        BenchmarkBand {
            median: 30.0,
            percentile_75: 48.0,
        }
    }

    // -- precedence --

    #[test]
    fn overrides_beat_ai_signals() {
        let signals = ai_signals_with_rate();
        let overrides = Overrides {
            seniority_level: Some(SeniorityLevel::Junior),
            category: Some("Branding".to_string()),
            skills: None,
        };
        let (confirmed, applied) = resolve_confirmed(Some(&signals), &overrides);

        assert_eq!(confirmed.seniority_level, SeniorityLevel::Junior);
        assert_eq!(confirmed.category_name.as_deref(), Some("Branding"));
        assert_eq!(applied, vec!["seniority_level", "category"]);
    }

    #[test]
    fn defaults_apply_without_signals_or_overrides() {
        let (confirmed, applied) = resolve_confirmed(None, &Overrides::default());
        assert_eq!(confirmed.seniority_level, SeniorityLevel::Mid);
        assert_eq!(confirmed.confidence, Confidence::Low);
        assert!(confirmed.skills.is_empty());
        assert!(applied.is_empty());
    }

    // -- cascade priority --

    #[test]
    fn ai_rate_wins_even_with_benchmark() {
        let signals = ai_signals_with_rate();
        let suggested = suggest_rate(
            signals.recommended_rate.as_ref(),
            Some(band()),
            SeniorityLevel::Senior,
        );
        assert_eq!(suggested.source(), RateSource::AiRecommendation);
        assert_eq!(suggested.hourly_rate(), 45.0);
    }

    #[test]
    fn benchmark_tier_scales_by_seniority() {
        let suggested = suggest_rate(None, Some(band()), SeniorityLevel::Senior);
        assert_eq!(suggested.source(), RateSource::MarketBenchmark);
        assert_eq!(suggested.hourly_rate(), 39.0); // 30 × 1.3
        assert_eq!(suggested.range().high, 62.4); // 48 × 1.3
    }

    #[test]
    fn default_tier_has_unit_multiplier() {
        let suggested = suggest_rate(None, None, SeniorityLevel::Mid);
        assert_eq!(suggested.source(), RateSource::DefaultEstimate);
        assert_eq!(suggested.multiplier(), 1.0);
        assert_eq!(suggested.hourly_rate(), 25.0);
        assert_eq!(suggested.range().high, 40.0);
    }

    #[test]
    fn ai_tier_uses_generic_multiplier_when_none_supplied() {
        let signals = ai_signals_with_rate();
        let suggested = suggest_rate(
            signals.recommended_rate.as_ref(),
            None,
            SeniorityLevel::Expert,
        );
        assert_eq!(suggested.multiplier(), 1.5);
    }

    #[test]
    fn ai_tier_prefers_its_own_multiplier() {
        let signals = normalize(&json!({
            "recommended_rate": { "hourly_rate": 50.0 },
            "calculation_breakdown": { "base_rate": 40.0, "seniority_multiplier": 1.25 }
        }));
        let suggested = suggest_rate(
            signals.recommended_rate.as_ref(),
            None,
            SeniorityLevel::Junior,
        );
        assert_eq!(suggested.multiplier(), 1.25);
        assert_eq!(suggested.base_rate(), Some(40.0));
    }

    // -- full recommendation --

    #[test]
    fn recommendation_reports_source_and_provenance() {
        let signals = ai_signals_with_rate();
        let rec = build_recommendation(
            AiStatus::Used,
            Some(&signals),
            &Overrides::default(),
            Some(band()),
        );
        assert_eq!(rec.rate_source, RateSource::AiRecommendation);
        assert_eq!(rec.ai_status, AiStatus::Used);
        assert!(rec.overrides_applied.is_empty());
        assert!(!rec.note.is_empty());
    }

    #[test]
    fn failed_ai_is_explained_in_limitations() {
        let rec =
            build_recommendation(AiStatus::Failed, None, &Overrides::default(), Some(band()));
        assert_eq!(rec.rate_source, RateSource::MarketBenchmark);
        assert!(rec
            .explainability
            .limitations
            .iter()
            .any(|l| l.contains("failed")));
    }

    #[test]
    fn skipped_ai_is_explained_in_limitations() {
        let rec = build_recommendation(AiStatus::Skipped, None, &Overrides::default(), None);
        assert_eq!(rec.rate_source, RateSource::DefaultEstimate);
        assert!(rec
            .explainability
            .limitations
            .iter()
            .any(|l| l.contains("skipped")));
    }

    // -- follow-up questions --

    #[test]
    fn low_confidence_surfaces_ai_follow_ups() {
        let signals = normalize(&json!({
            "confidence": "low",
            "follow_up_questions": ["How many clients do you serve?"]
        }));
        let questions = follow_up_questions(Confidence::Low, Some(&signals));
        assert_eq!(questions, vec!["How many clients do you serve?"]);
    }

    #[test]
    fn low_confidence_without_ai_questions_falls_back_to_canned() {
        let questions = follow_up_questions(Confidence::Low, None);
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn higher_confidence_uses_canned_questions() {
        let signals = normalize(&json!({
            "confidence": "high",
            "follow_up_questions": ["Should be ignored"]
        }));
        let questions = follow_up_questions(Confidence::High, Some(&signals));
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q != "Should be ignored"));
    }

    // -- accepted-rate validation --

    #[test]
    fn accepted_rate_must_be_positive() {
        assert!(validate_accepted_rate(25.0).is_ok());
        assert!(validate_accepted_rate(0.0).is_err());
        assert!(validate_accepted_rate(-10.0).is_err());
        assert!(validate_accepted_rate(f64::NAN).is_err());
        assert!(validate_accepted_rate(f64::INFINITY).is_err());
    }

    // -- income derivation --

    #[test]
    fn income_derivation_formula() {
        // 40/h × 100h − 480 − 480×0.15 = 3448
        let income = derive_income_from_rate(40.0, 100.0, 480.0, 0.15);
        assert!((income - 3448.0).abs() < 1e-9);
    }

    #[test]
    fn income_derivation_floors_at_minimum() {
        let income = derive_income_from_rate(5.0, 10.0, 480.0, 0.15);
        assert_eq!(income, MIN_DERIVED_INCOME);
    }
}
