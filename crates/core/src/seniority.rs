//! Seniority levels, rate multipliers, and experience classification.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Classification thresholds
// ---------------------------------------------------------------------------

/// Years of experience below which a freelancer classifies as junior.
pub const JUNIOR_MAX_YEARS: f64 = 2.0;
/// Years of experience below which a freelancer classifies as mid.
pub const MID_MAX_YEARS: f64 = 5.0;
/// Years of experience below which a freelancer classifies as senior.
pub const SENIOR_MAX_YEARS: f64 = 10.0;

// ---------------------------------------------------------------------------
// Seniority level
// ---------------------------------------------------------------------------

/// Experience tier used to scale the base hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityLevel {
    Junior,
    Mid,
    Senior,
    Expert,
}

impl SeniorityLevel {
    /// Parse a seniority string from the database or client input.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "junior" => Ok(Self::Junior),
            "mid" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            "expert" => Ok(Self::Expert),
            _ => Err(CoreError::Validation(format!(
                "Invalid seniority level '{s}'. Must be one of: junior, mid, senior, expert"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Expert => "expert",
        }
    }

    /// Multiplier applied to the base hourly rate for this tier.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Junior => 0.8,
            Self::Mid => 1.0,
            Self::Senior => 1.3,
            Self::Expert => 1.5,
        }
    }

    /// Classify a freelancer from years of experience.
    pub fn from_experience_years(years: f64) -> Self {
        if years < JUNIOR_MAX_YEARS {
            Self::Junior
        } else if years < MID_MAX_YEARS {
            Self::Mid
        } else if years < SENIOR_MAX_YEARS {
            Self::Senior
        } else {
            Self::Expert
        }
    }

    /// All levels, in ascending order.
    pub fn all() -> [Self; 4] {
        [Self::Junior, Self::Mid, Self::Senior, Self::Expert]
    }
}

// ---------------------------------------------------------------------------
// Reverse estimation
// ---------------------------------------------------------------------------

/// Estimate years of experience from an accepted hourly rate.
///
/// Used when a profile is created from an accepted rate and the client did
/// not supply experience data. Fixed thresholds, not a regression.
pub fn estimate_experience_from_rate(hourly_rate: f64) -> f64 {
    if hourly_rate < 8.0 {
        1.0
    } else if hourly_rate < 15.0 {
        3.0
    } else if hourly_rate < 25.0 {
        6.0
    } else {
        10.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- multipliers --

    #[test]
    fn multipliers_match_tiers() {
        assert_eq!(SeniorityLevel::Junior.multiplier(), 0.8);
        assert_eq!(SeniorityLevel::Mid.multiplier(), 1.0);
        assert_eq!(SeniorityLevel::Senior.multiplier(), 1.3);
        assert_eq!(SeniorityLevel::Expert.multiplier(), 1.5);
    }

    // -- parsing --

    #[test]
    fn from_str_roundtrip() {
        for level in SeniorityLevel::all() {
            assert_eq!(SeniorityLevel::from_str_db(level.as_str()).unwrap(), level);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!(SeniorityLevel::from_str_db("principal").is_err());
        assert!(SeniorityLevel::from_str_db("").is_err());
        assert!(SeniorityLevel::from_str_db("Mid").is_err());
    }

    // -- classification from experience --

    #[test]
    fn classification_boundaries() {
        assert_eq!(
            SeniorityLevel::from_experience_years(0.0),
            SeniorityLevel::Junior
        );
        assert_eq!(
            SeniorityLevel::from_experience_years(1.9),
            SeniorityLevel::Junior
        );
        assert_eq!(
            SeniorityLevel::from_experience_years(2.0),
            SeniorityLevel::Mid
        );
        assert_eq!(
            SeniorityLevel::from_experience_years(5.0),
            SeniorityLevel::Senior
        );
        assert_eq!(
            SeniorityLevel::from_experience_years(10.0),
            SeniorityLevel::Expert
        );
        assert_eq!(
            SeniorityLevel::from_experience_years(25.0),
            SeniorityLevel::Expert
        );
    }

    // -- experience estimation from rate --

    #[test]
    fn experience_estimate_thresholds() {
        assert_eq!(estimate_experience_from_rate(5.0), 1.0);
        assert_eq!(estimate_experience_from_rate(7.99), 1.0);
        assert_eq!(estimate_experience_from_rate(8.0), 3.0);
        assert_eq!(estimate_experience_from_rate(14.99), 3.0);
        assert_eq!(estimate_experience_from_rate(15.0), 6.0);
        assert_eq!(estimate_experience_from_rate(24.99), 6.0);
        assert_eq!(estimate_experience_from_rate(25.0), 10.0);
        assert_eq!(estimate_experience_from_rate(120.0), 10.0);
    }
}
