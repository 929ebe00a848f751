/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Round a monetary amount to 2 decimal places for display.
///
/// Display-only: intermediate calculations keep full precision and round
/// once at the edge, so rounded parts are not guaranteed to re-sum exactly
/// to a rounded total.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_to_nearest_cent() {
        assert_eq!(round2(17.0251), 17.03);
        assert_eq!(round2(17.0249), 17.02);
    }

    #[test]
    fn round2_negative() {
        assert_eq!(round2(-1.0051), -1.01);
        assert_eq!(round2(-1.0049), -1.0);
    }

    #[test]
    fn round2_integral_unchanged() {
        assert_eq!(round2(25.0), 25.0);
    }
}
