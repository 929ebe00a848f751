//! Guided onboarding questionnaire: question catalog, answer parsing,
//! validation, and progress tracking.
//!
//! The session lifecycle (`in_progress → completed | abandoned`) is driven
//! by the API layer against the repository; everything here is pure. Answer
//! interpretation prefers the AI collaborator, but every answer ultimately
//! passes through [`validate_typed`], and [`parse_answer`] provides the
//! deterministic fallback so the flow never blocks on the AI service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// Status values for an onboarding session. `Completed` and `Abandoned`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl OnboardingStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            _ => Err(CoreError::Validation(format!(
                "Invalid onboarding status '{s}'. Must be one of: in_progress, completed, abandoned"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }
}

/// Guard that a session is still accepting answers.
pub fn ensure_in_progress(status: &str) -> Result<(), CoreError> {
    if status != OnboardingStatus::InProgress.as_str() {
        return Err(CoreError::Validation(format!(
            "Session is '{status}'; only in_progress sessions accept answers"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Question model
// ---------------------------------------------------------------------------

/// The value shape a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedType {
    Number,
    Text,
    TextList,
    Choice,
}

impl ExpectedType {
    /// Wire-format name, e.g. for the AI interpreter request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::TextList => "text_list",
            Self::Choice => "choice",
        }
    }
}

/// Per-question validation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One questionnaire entry, persisted as JSONB on the session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub key: String,
    pub text: String,
    pub expected_type: ExpectedType,
    #[serde(default)]
    pub validation_rules: ValidationRules,
    #[serde(default)]
    pub answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Value>,
}

// ---------------------------------------------------------------------------
// Question catalog
// ---------------------------------------------------------------------------

/// Total number of questions in the guided flow.
pub const TOTAL_QUESTIONS: usize = 10;

/// Collected-data key for the profit-margin question; its answers are
/// normalized from percentages to fractions.
pub const KEY_PROFIT_MARGIN: &str = "profit_margin";

/// Maximum number of items accepted in a list answer.
pub const MAX_LIST_ITEMS: usize = 20;

/// Maximum length of a single text or list-item answer.
pub const MAX_TEXT_LEN: usize = 200;

/// Pattern for the seniority choice question.
const SENIORITY_PATTERN: &str = "^(junior|mid|senior|expert)$";

fn number_question(key: &str, text: &str, min: f64, max: Option<f64>) -> Question {
    Question {
        key: key.to_string(),
        text: text.to_string(),
        expected_type: ExpectedType::Number,
        validation_rules: ValidationRules {
            required: true,
            min: Some(min),
            max,
            pattern: None,
        },
        answered: false,
        answer: None,
    }
}

/// The fixed, ordered question list every new session is seeded with.
pub fn question_catalog() -> Vec<Question> {
    vec![
        number_question(
            "rent",
            "What do you pay per month for your workspace (rent, co-working, studio)?",
            0.0,
            None,
        ),
        number_question(
            "equipment",
            "How much do you spend per month on equipment and software?",
            0.0,
            None,
        ),
        number_question(
            "insurance",
            "What are your monthly insurance and administrative costs?",
            0.0,
            None,
        ),
        number_question(
            "materials",
            "How much do you spend per month on project materials and supplies?",
            0.0,
            None,
        ),
        number_question(
            "desired_monthly_income",
            "What net monthly income do you want to take home?",
            1.0,
            None,
        ),
        number_question(
            "billable_hours_per_month",
            "How many billable hours can you realistically work per month?",
            1.0,
            Some(744.0),
        ),
        number_question(
            KEY_PROFIT_MARGIN,
            "What profit margin do you aim for, as a percentage (for example 15)?",
            0.0,
            Some(1.0),
        ),
        number_question(
            "experience_years",
            "How many years of professional experience do you have?",
            0.0,
            Some(60.0),
        ),
        Question {
            key: "skill_categories".to_string(),
            text: "Which services do you offer? Separate multiple entries with commas."
                .to_string(),
            expected_type: ExpectedType::TextList,
            validation_rules: ValidationRules {
                required: true,
                min: None,
                max: None,
                pattern: None,
            },
            answered: false,
            answer: None,
        },
        Question {
            key: "seniority_level".to_string(),
            text: "How would you position yourself: junior, mid, senior, or expert?".to_string(),
            expected_type: ExpectedType::Choice,
            validation_rules: ValidationRules {
                required: true,
                min: None,
                max: None,
                pattern: Some(SENIORITY_PATTERN.to_string()),
            },
            answered: false,
            answer: None,
        },
    ]
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Questionnaire progress summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Compute progress from the answered flags.
pub fn progress(questions: &[Question]) -> Progress {
    let total = questions.len();
    let current = questions.iter().filter(|q| q.answered).count();
    let percentage = if total == 0 {
        0
    } else {
        (100.0 * current as f64 / total as f64).round() as u32
    };
    Progress {
        current,
        total,
        percentage,
    }
}

/// The question at `index`, or `None` when the list is exhausted.
pub fn current_question(questions: &[Question], index: usize) -> Option<&Question> {
    questions.get(index)
}

/// Whether the session is complete: index exhausted or everything answered.
pub fn is_complete(questions: &[Question], index: usize) -> bool {
    index >= questions.len() || questions.iter().all(|q| q.answered)
}

// ---------------------------------------------------------------------------
// Answer parsing (deterministic fallback)
// ---------------------------------------------------------------------------

/// Parse a free-form answer into a typed candidate value, deterministically.
///
/// This is the fallback used when the AI interpreter is unavailable or
/// fails; the result still goes through [`validate_typed`].
pub fn parse_answer(question: &Question, raw: &str) -> Result<Value, CoreError> {
    let trimmed = raw.trim();
    match question.expected_type {
        ExpectedType::Number => {
            // Strip currency symbols, units, and thousands separators.
            let cleaned: String = trimmed
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            let value: f64 = cleaned.parse().map_err(|_| {
                CoreError::Validation(format!(
                    "Could not read a number from '{trimmed}' for '{}'",
                    question.key
                ))
            })?;
            Ok(Value::from(value))
        }
        ExpectedType::Text | ExpectedType::Choice => Ok(Value::from(trimmed)),
        ExpectedType::TextList => {
            let items: Vec<Value> = trimmed
                .split([',', ';', '\n'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Value::from)
                .collect();
            Ok(Value::from(items))
        }
    }
}

// ---------------------------------------------------------------------------
// Typed validation & normalization
// ---------------------------------------------------------------------------

fn check_bounds(question: &Question, value: f64) -> Result<(), CoreError> {
    let rules = &question.validation_rules;
    if let Some(min) = rules.min {
        if value < min {
            return Err(CoreError::Validation(format!(
                "'{}' must be at least {min} (got {value})",
                question.key
            )));
        }
    }
    if let Some(max) = rules.max {
        if value > max {
            return Err(CoreError::Validation(format!(
                "'{}' must be at most {max} (got {value})",
                question.key
            )));
        }
    }
    Ok(())
}

fn check_pattern(question: &Question, value: &str) -> Result<(), CoreError> {
    if let Some(pattern) = &question.validation_rules.pattern {
        let re = regex::Regex::new(pattern).map_err(|e| {
            CoreError::Internal(format!("Invalid validation pattern for '{}': {e}", question.key))
        })?;
        if !re.is_match(value) {
            return Err(CoreError::Validation(format!(
                "'{value}' is not a valid answer for '{}'",
                question.key
            )));
        }
    }
    Ok(())
}

/// Validate and normalize a typed candidate value against the question's
/// rules.
///
/// Accepts output of either [`parse_answer`] or the AI interpreter; the
/// returned value is what gets stored on the question and in
/// `collected_data`. Percentages answered for the profit-margin question
/// are normalized to fractions before bounds checking.
pub fn validate_typed(question: &Question, value: &Value) -> Result<Value, CoreError> {
    match question.expected_type {
        ExpectedType::Number => {
            let mut number = value
                .as_f64()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| {
                    CoreError::Validation(format!("'{}' expects a number", question.key))
                })?;
            if !number.is_finite() {
                return Err(CoreError::Validation(format!(
                    "'{}' expects a finite number",
                    question.key
                )));
            }
            // "15" meaning 15 percent becomes 0.15.
            if question.key == KEY_PROFIT_MARGIN && number > 1.0 {
                number /= 100.0;
            }
            check_bounds(question, number)?;
            Ok(Value::from(number))
        }
        ExpectedType::Text => {
            let text = value
                .as_str()
                .map(str::trim)
                .ok_or_else(|| CoreError::Validation(format!("'{}' expects text", question.key)))?;
            if question.validation_rules.required && text.is_empty() {
                return Err(CoreError::Validation(format!(
                    "'{}' requires an answer",
                    question.key
                )));
            }
            if text.chars().count() > MAX_TEXT_LEN {
                return Err(CoreError::Validation(format!(
                    "'{}' must be at most {MAX_TEXT_LEN} characters",
                    question.key
                )));
            }
            check_pattern(question, text)?;
            Ok(Value::from(text))
        }
        ExpectedType::Choice => {
            let choice = value
                .as_str()
                .map(|s| s.trim().to_lowercase())
                .ok_or_else(|| {
                    CoreError::Validation(format!("'{}' expects a choice", question.key))
                })?;
            if question.validation_rules.required && choice.is_empty() {
                return Err(CoreError::Validation(format!(
                    "'{}' requires an answer",
                    question.key
                )));
            }
            check_pattern(question, &choice)?;
            Ok(Value::from(choice))
        }
        ExpectedType::TextList => {
            let raw_items = value.as_array().ok_or_else(|| {
                CoreError::Validation(format!("'{}' expects a list", question.key))
            })?;
            let items: Vec<String> = raw_items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if question.validation_rules.required && items.is_empty() {
                return Err(CoreError::Validation(format!(
                    "'{}' requires at least one entry",
                    question.key
                )));
            }
            if items.len() > MAX_LIST_ITEMS {
                return Err(CoreError::Validation(format!(
                    "'{}' accepts at most {MAX_LIST_ITEMS} entries",
                    question.key
                )));
            }
            if items.iter().any(|s| s.chars().count() > MAX_TEXT_LEN) {
                return Err(CoreError::Validation(format!(
                    "Entries for '{}' must be at most {MAX_TEXT_LEN} characters",
                    question.key
                )));
            }
            Ok(Value::from(items))
        }
    }
}

// ---------------------------------------------------------------------------
// Answer recording
// ---------------------------------------------------------------------------

/// Record a validated answer at `index`: store it on the question and in
/// `collected_data`, and mark the question answered.
///
/// Callers advance `current_question_index` only after this succeeds, so an
/// invalid answer never mutates the session.
pub fn record_answer(
    questions: &mut [Question],
    collected_data: &mut serde_json::Map<String, Value>,
    index: usize,
    value: Value,
) -> Result<(), CoreError> {
    let question = questions.get_mut(index).ok_or_else(|| {
        CoreError::Validation(format!("No question at index {index}"))
    })?;
    question.answer = Some(value.clone());
    question.answered = true;
    collected_data.insert(question.key.clone(), value);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn catalog() -> Vec<Question> {
        question_catalog()
    }

    fn question(key: &str) -> Question {
        catalog().into_iter().find(|q| q.key == key).unwrap()
    }

    // -- catalog --

    #[test]
    fn catalog_has_ten_ordered_questions() {
        let questions = catalog();
        assert_eq!(questions.len(), TOTAL_QUESTIONS);
        assert!(questions.iter().all(|q| !q.answered && q.answer.is_none()));
        assert_eq!(questions[0].key, "rent");
        assert_eq!(questions[9].key, "seniority_level");
    }

    #[test]
    fn catalog_roundtrips_through_json() {
        let questions = catalog();
        let value = serde_json::to_value(&questions).unwrap();
        let back: Vec<Question> = serde_json::from_value(value).unwrap();
        assert_eq!(back, questions);
    }

    // -- status --

    #[test]
    fn status_roundtrip_and_guard() {
        for status in [
            OnboardingStatus::InProgress,
            OnboardingStatus::Completed,
            OnboardingStatus::Abandoned,
        ] {
            assert_eq!(
                OnboardingStatus::from_str_db(status.as_str()).unwrap(),
                status
            );
        }
        assert!(ensure_in_progress("in_progress").is_ok());
        assert!(ensure_in_progress("completed").is_err());
        assert!(ensure_in_progress("abandoned").is_err());
    }

    // -- deterministic parsing --

    #[test]
    fn parse_number_strips_currency_noise() {
        let q = question("rent");
        assert_eq!(parse_answer(&q, "$1,200").unwrap(), json!(1200.0));
        assert_eq!(parse_answer(&q, "about 450 eur").unwrap(), json!(450.0));
    }

    #[test]
    fn parse_number_rejects_unreadable() {
        let q = question("rent");
        assert_matches!(parse_answer(&q, "no idea"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_list_splits_on_separators() {
        let q = question("skill_categories");
        let parsed = parse_answer(&q, "logo design, branding; web design\nillustration").unwrap();
        assert_eq!(
            parsed,
            json!(["logo design", "branding", "web design", "illustration"])
        );
    }

    #[test]
    fn parse_text_trims() {
        let q = question("seniority_level");
        assert_eq!(parse_answer(&q, "  senior  ").unwrap(), json!("senior"));
    }

    // -- typed validation --

    #[test]
    fn validate_number_bounds() {
        let q = question("billable_hours_per_month");
        assert_eq!(validate_typed(&q, &json!(100.0)).unwrap(), json!(100.0));
        assert_matches!(validate_typed(&q, &json!(0.0)), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_typed(&q, &json!(800.0)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn validate_number_accepts_numeric_strings() {
        let q = question("rent");
        assert_eq!(validate_typed(&q, &json!("350.5")).unwrap(), json!(350.5));
    }

    #[test]
    fn margin_percentage_normalizes_to_fraction() {
        let q = question(KEY_PROFIT_MARGIN);
        assert_eq!(validate_typed(&q, &json!(15.0)).unwrap(), json!(0.15));
        assert_eq!(validate_typed(&q, &json!(0.2)).unwrap(), json!(0.2));
        // 150% normalizes to 1.5 which is still out of range.
        assert_matches!(
            validate_typed(&q, &json!(150.0)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn seniority_choice_is_case_insensitive_but_closed() {
        let q = question("seniority_level");
        assert_eq!(validate_typed(&q, &json!("Senior")).unwrap(), json!("senior"));
        assert_matches!(
            validate_typed(&q, &json!("principal")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn list_filters_non_strings_and_caps_items() {
        let q = question("skill_categories");
        let mixed = json!(["logo", 42, "  branding  ", ""]);
        assert_eq!(
            validate_typed(&q, &mixed).unwrap(),
            json!(["logo", "branding"])
        );

        let too_many: Vec<String> = (0..MAX_LIST_ITEMS + 1).map(|i| format!("s{i}")).collect();
        assert_matches!(
            validate_typed(&q, &json!(too_many)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_required_list_is_rejected() {
        let q = question("skill_categories");
        assert_matches!(validate_typed(&q, &json!([])), Err(CoreError::Validation(_)));
    }

    // -- progress & completion --

    #[test]
    fn progress_counts_answered() {
        let mut questions = catalog();
        let mut collected = serde_json::Map::new();
        record_answer(&mut questions, &mut collected, 0, json!(400.0)).unwrap();
        record_answer(&mut questions, &mut collected, 1, json!(100.0)).unwrap();

        let p = progress(&questions);
        assert_eq!(p.current, 2);
        assert_eq!(p.total, TOTAL_QUESTIONS);
        assert_eq!(p.percentage, 20);
    }

    #[test]
    fn completion_when_index_exhausted_or_all_answered() {
        let mut questions = catalog();
        assert!(!is_complete(&questions, 0));
        assert!(is_complete(&questions, TOTAL_QUESTIONS));

        let mut collected = serde_json::Map::new();
        for i in 0..TOTAL_QUESTIONS {
            record_answer(&mut questions, &mut collected, i, json!(1.0)).unwrap();
        }
        assert!(is_complete(&questions, 0));
    }

    // -- recording --

    #[test]
    fn record_answer_stores_on_question_and_collected_data() {
        let mut questions = catalog();
        let mut collected = serde_json::Map::new();
        record_answer(&mut questions, &mut collected, 0, json!(400.0)).unwrap();

        assert!(questions[0].answered);
        assert_eq!(questions[0].answer, Some(json!(400.0)));
        assert_eq!(collected.get("rent"), Some(&json!(400.0)));
    }

    #[test]
    fn record_answer_rejects_out_of_range_index() {
        let mut questions = catalog();
        let mut collected = serde_json::Map::new();
        assert_matches!(
            record_answer(&mut questions, &mut collected, 99, json!(1)),
            Err(CoreError::Validation(_))
        );
    }
}
