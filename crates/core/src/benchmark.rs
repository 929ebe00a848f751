//! Market-benchmark scoring: confidence buckets, median comparison, and
//! the static per-seniority fallback table.

use serde::Serialize;

use crate::error::CoreError;
use crate::seniority::SeniorityLevel;

// ---------------------------------------------------------------------------
// Confidence thresholds
// ---------------------------------------------------------------------------

/// Sample count below which confidence is "Low".
pub const MEDIUM_CONFIDENCE_SAMPLES: i32 = 10;
/// Sample count below which confidence is "Medium" (at or above is "High").
pub const HIGH_CONFIDENCE_SAMPLES: i32 = 30;

/// Tolerance around the median for the "at median" bucket, in currency units.
pub const MEDIAN_TOLERANCE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Reliability bucket for a data point, derived from sample size for
/// benchmarks and reported directly by the AI collaborator for signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Derive confidence from the number of samples behind a benchmark.
    pub fn from_sample_size(sample_size: i32) -> Self {
        if sample_size < MEDIUM_CONFIDENCE_SAMPLES {
            Self::Low
        } else if sample_size < HIGH_CONFIDENCE_SAMPLES {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Parse a confidence label against the closed allow-list.
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

// ---------------------------------------------------------------------------
// Rate position
// ---------------------------------------------------------------------------

/// Where a rate sits relative to a benchmark median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePosition {
    BelowMedian,
    AtMedian,
    AboveMedian,
}

/// Compare a rate to a median with a ±[`MEDIAN_TOLERANCE`] band.
pub fn compare_to_median(rate: f64, median: f64) -> RatePosition {
    if (rate - median).abs() <= MEDIAN_TOLERANCE {
        RatePosition::AtMedian
    } else if rate < median {
        RatePosition::BelowMedian
    } else {
        RatePosition::AboveMedian
    }
}

impl RatePosition {
    /// Short human-readable description for market analysis summaries.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::BelowMedian => "below the market median",
            Self::AtMedian => "at the market median",
            Self::AboveMedian => "above the market median",
        }
    }
}

// ---------------------------------------------------------------------------
// Benchmark field validation
// ---------------------------------------------------------------------------

/// Validate benchmark rate fields before persisting an upsert.
pub fn validate_benchmark_rates(
    median_hourly_rate: f64,
    percentile_75_rate: f64,
    sample_size: i32,
) -> Result<(), CoreError> {
    if !median_hourly_rate.is_finite() || median_hourly_rate < 0.0 {
        return Err(CoreError::Validation(format!(
            "Median hourly rate must be non-negative (got {median_hourly_rate})"
        )));
    }
    if !percentile_75_rate.is_finite() || percentile_75_rate < 0.0 {
        return Err(CoreError::Validation(format!(
            "75th percentile rate must be non-negative (got {percentile_75_rate})"
        )));
    }
    if percentile_75_rate < median_hourly_rate {
        return Err(CoreError::Validation(format!(
            "75th percentile rate ({percentile_75_rate}) must not be below the median ({median_hourly_rate})"
        )));
    }
    if sample_size < 0 {
        return Err(CoreError::Validation(format!(
            "Sample size must be non-negative (got {sample_size})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Static fallback table
// ---------------------------------------------------------------------------

/// A static `{median, p75}` band used when no market benchmark resolves.
///
/// Seniority is already baked into the band, so the cascade applies a
/// multiplier of exactly 1.0 on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DefaultBand {
    pub median: f64,
    pub percentile_75: f64,
}

/// Fallback rate band per seniority tier.
pub fn default_estimate(seniority: SeniorityLevel) -> DefaultBand {
    match seniority {
        SeniorityLevel::Junior => DefaultBand {
            median: 15.0,
            percentile_75: 25.0,
        },
        SeniorityLevel::Mid => DefaultBand {
            median: 25.0,
            percentile_75: 40.0,
        },
        SeniorityLevel::Senior => DefaultBand {
            median: 40.0,
            percentile_75: 60.0,
        },
        SeniorityLevel::Expert => DefaultBand {
            median: 60.0,
            percentile_75: 90.0,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- confidence --

    #[test]
    fn confidence_buckets_from_sample_size() {
        assert_eq!(Confidence::from_sample_size(0), Confidence::Low);
        assert_eq!(Confidence::from_sample_size(9), Confidence::Low);
        assert_eq!(Confidence::from_sample_size(10), Confidence::Medium);
        assert_eq!(Confidence::from_sample_size(29), Confidence::Medium);
        assert_eq!(Confidence::from_sample_size(30), Confidence::High);
        assert_eq!(Confidence::from_sample_size(500), Confidence::High);
    }

    #[test]
    fn confidence_allow_list() {
        assert_eq!(Confidence::from_str_lenient("HIGH"), Some(Confidence::High));
        assert_eq!(Confidence::from_str_lenient(" low "), Some(Confidence::Low));
        assert_eq!(Confidence::from_str_lenient("certain"), None);
        assert_eq!(Confidence::from_str_lenient(""), None);
    }

    // -- rate position --

    #[test]
    fn median_comparison_with_tolerance() {
        assert_eq!(compare_to_median(24.5, 25.0), RatePosition::AtMedian);
        assert_eq!(compare_to_median(25.5, 25.0), RatePosition::AtMedian);
        assert_eq!(compare_to_median(24.49, 25.0), RatePosition::BelowMedian);
        assert_eq!(compare_to_median(25.51, 25.0), RatePosition::AboveMedian);
    }

    // -- validation --

    #[test]
    fn benchmark_rates_validation() {
        assert!(validate_benchmark_rates(25.0, 40.0, 10).is_ok());
        assert!(validate_benchmark_rates(25.0, 25.0, 0).is_ok());
        assert!(validate_benchmark_rates(-1.0, 40.0, 10).is_err());
        assert!(validate_benchmark_rates(25.0, -1.0, 10).is_err());
        assert!(validate_benchmark_rates(40.0, 25.0, 10).is_err());
        assert!(validate_benchmark_rates(25.0, 40.0, -1).is_err());
    }

    // -- default table --

    #[test]
    fn default_bands_are_monotonic_in_seniority() {
        let junior = default_estimate(SeniorityLevel::Junior);
        let mid = default_estimate(SeniorityLevel::Mid);
        let senior = default_estimate(SeniorityLevel::Senior);
        let expert = default_estimate(SeniorityLevel::Expert);

        assert!(junior.median < mid.median);
        assert!(mid.median < senior.median);
        assert!(senior.median < expert.median);

        for band in [junior, mid, senior, expert] {
            assert!(band.percentile_75 >= band.median);
        }
    }
}
