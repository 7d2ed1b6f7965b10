//! The trading-session clock.
//!
//! A session is created once at startup and never mutated; only time
//! advances. Session progress feeds the spread decay so quotes tighten
//! toward market-following as the end approaches.

use crate::error::{CoreError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable session window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Session {
    /// Create a session running from `start` for `duration_secs`.
    pub fn new(start: DateTime<Utc>, duration_secs: u64) -> Result<Self> {
        if duration_secs == 0 {
            return Err(CoreError::InvalidSession(
                "session duration must be positive".to_string(),
            ));
        }
        Ok(Self {
            start,
            end: start + Duration::seconds(duration_secs as i64),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Fraction of the session elapsed at `now`, clamped to [0, 1].
    pub fn percent_completed(&self, now: DateTime<Utc>) -> Decimal {
        let total = (self.end - self.start).num_milliseconds();
        let elapsed = (now - self.start).num_milliseconds();
        let ratio = Decimal::from(elapsed) / Decimal::from(total);
        ratio.clamp(Decimal::ZERO, Decimal::ONE)
    }

    /// Whether the session deadline has passed.
    pub fn is_over(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_percent_completed_midpoint() {
        let session = Session::new(start(), 100).unwrap();
        let halfway = start() + Duration::seconds(50);
        assert_eq!(session.percent_completed(halfway), dec!(0.5));
    }

    #[test]
    fn test_percent_completed_clamped() {
        let session = Session::new(start(), 100).unwrap();
        let before = start() - Duration::seconds(10);
        let after = start() + Duration::seconds(200);
        assert_eq!(session.percent_completed(before), Decimal::ZERO);
        assert_eq!(session.percent_completed(after), Decimal::ONE);
    }

    #[test]
    fn test_is_over_at_deadline() {
        let session = Session::new(start(), 100).unwrap();
        assert!(!session.is_over(start() + Duration::seconds(99)));
        assert!(session.is_over(start() + Duration::seconds(100)));
        assert!(session.is_over(start() + Duration::seconds(101)));
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(Session::new(start(), 0).is_err());
    }
}
