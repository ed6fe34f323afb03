//! Customer age derived from birthdate at read time.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a customer's age is derived from their birthdate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgeRule {
    /// Completed calendar years: the birthday must have been reached this year.
    #[default]
    Calendar,
    /// Whole days elapsed integer-divided by 365.
    ///
    /// Ignores leap days, so it drifts by roughly one day every four years.
    /// Kept for parity with reports produced by the earlier dashboard.
    DayCount365,
}

/// Error parsing an [`AgeRule`] name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown age rule '{0}' (expected 'calendar' or 'days365')")]
pub struct AgeRuleError(String);

impl AgeRule {
    /// Age in whole years on `today`, or `None` if born after `today`.
    #[must_use]
    pub fn age_on(self, birthdate: NaiveDate, today: NaiveDate) -> Option<i64> {
        if birthdate > today {
            return None;
        }
        match self {
            Self::Calendar => {
                let mut years = i64::from(today.year() - birthdate.year());
                if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
                    years -= 1;
                }
                Some(years)
            }
            Self::DayCount365 => Some((today - birthdate).num_days() / 365),
        }
    }

    /// The configuration name of this rule.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::DayCount365 => "days365",
        }
    }
}

impl fmt::Display for AgeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeRule {
    type Err = AgeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calendar" => Ok(Self::Calendar),
            "days365" | "day_count_365" => Ok(Self::DayCount365),
            other => Err(AgeRuleError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_age_before_and_after_birthday() {
        let birth = date(1990, 6, 15);
        assert_eq!(AgeRule::Calendar.age_on(birth, date(2024, 6, 14)), Some(33));
        assert_eq!(AgeRule::Calendar.age_on(birth, date(2024, 6, 15)), Some(34));
    }

    #[test]
    fn test_day_count_runs_ahead_after_leap_years() {
        // Nine leap days since 1990 push the 365-day count past the birthday
        let birth = date(1990, 6, 15);
        let today = date(2024, 6, 10);
        assert_eq!(AgeRule::Calendar.age_on(birth, today), Some(33));
        assert_eq!(AgeRule::DayCount365.age_on(birth, today), Some(34));
    }

    #[test]
    fn test_leap_day_birthday() {
        let birth = date(2000, 2, 29);
        assert_eq!(AgeRule::Calendar.age_on(birth, date(2023, 2, 28)), Some(22));
        assert_eq!(AgeRule::Calendar.age_on(birth, date(2023, 3, 1)), Some(23));
    }

    #[test]
    fn test_future_birthdate_has_no_age() {
        assert!(AgeRule::Calendar.age_on(date(2030, 1, 1), date(2024, 1, 1)).is_none());
        assert!(AgeRule::DayCount365.age_on(date(2030, 1, 1), date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_parse_rule_names() {
        assert_eq!("calendar".parse::<AgeRule>(), Ok(AgeRule::Calendar));
        assert_eq!("DAYS365".parse::<AgeRule>(), Ok(AgeRule::DayCount365));
        assert!("lunar".parse::<AgeRule>().is_err());
    }
}
