//! Quota definition: how many admissions are allowed per window.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DocgateError, Result};

/// Unit of time a quota window is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Per-millisecond windows
    Millisecond,
    /// Per-second windows
    Second,
    /// Per-minute windows
    Minute,
    /// Per-hour windows
    Hour,
    /// Per-day windows
    Day,
}

impl TimeUnit {
    /// Get the duration of one unit.
    pub fn duration(&self) -> Duration {
        match self {
            TimeUnit::Millisecond => Duration::from_millis(1),
            TimeUnit::Second => Duration::from_secs(1),
            TimeUnit::Minute => Duration::from_secs(60),
            TimeUnit::Hour => Duration::from_secs(3600),
            TimeUnit::Day => Duration::from_secs(86400),
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimeUnit::Millisecond => "millisecond",
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
        };
        f.write_str(name)
    }
}

/// The (limit, window) pair defining the allowed call rate.
///
/// A `Quota` can only be built through its validating constructors, so a
/// value of this type always has a positive limit and a non-zero window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    limit: u32,
    window: Duration,
}

impl Quota {
    /// Create a quota of `limit` admissions per `window`.
    pub fn new(limit: u32, window: Duration) -> Result<Self> {
        if limit == 0 {
            return Err(DocgateError::InvalidConfiguration(
                "limit must be greater than zero".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(DocgateError::InvalidConfiguration(
                "window duration must be greater than zero".to_string(),
            ));
        }
        Ok(Self { limit, window })
    }

    /// Create a quota of `limit` admissions per single `unit`.
    pub fn per_unit(unit: TimeUnit, limit: u32) -> Result<Self> {
        Self::per_units(unit, 1, limit)
    }

    /// Create a quota of `limit` admissions per `count` consecutive `unit`s.
    pub fn per_units(unit: TimeUnit, count: u32, limit: u32) -> Result<Self> {
        let window = unit.duration().checked_mul(count).ok_or_else(|| {
            DocgateError::InvalidConfiguration(format!("window of {count} {unit}s overflows"))
        })?;
        Self::new(limit, window)
    }

    /// Maximum admissions per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Length of one window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} per {:?}", self.limit, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_unit_duration() {
        assert_eq!(TimeUnit::Millisecond.duration(), Duration::from_millis(1));
        assert_eq!(TimeUnit::Second.duration(), Duration::from_secs(1));
        assert_eq!(TimeUnit::Minute.duration(), Duration::from_secs(60));
        assert_eq!(TimeUnit::Hour.duration(), Duration::from_secs(3600));
        assert_eq!(TimeUnit::Day.duration(), Duration::from_secs(86400));
    }

    #[test]
    fn test_quota_rejects_zero_limit() {
        let err = Quota::new(0, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DocgateError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_quota_rejects_zero_window() {
        let err = Quota::new(5, Duration::ZERO).unwrap_err();
        assert!(matches!(err, DocgateError::InvalidConfiguration(_)));

        let err = Quota::per_units(TimeUnit::Second, 0, 5).unwrap_err();
        assert!(matches!(err, DocgateError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_quota_per_unit() {
        let quota = Quota::per_unit(TimeUnit::Minute, 20).unwrap();
        assert_eq!(quota.limit(), 20);
        assert_eq!(quota.window(), Duration::from_secs(60));

        let quota = Quota::per_units(TimeUnit::Second, 5, 3).unwrap();
        assert_eq!(quota.window(), Duration::from_secs(5));
    }

    #[test]
    fn test_time_unit_deserialize() {
        let unit: TimeUnit = serde_yaml::from_str("minute").unwrap();
        assert_eq!(unit, TimeUnit::Minute);
        assert!(serde_yaml::from_str::<TimeUnit>("fortnight").is_err());
    }
}
