//! Billing frequency and time unit definitions

use crate::errors::{FinanceError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Billing cadence attached to a recurring rule
///
/// Parsing is lenient: anything not recognised (including `custom`) maps to
/// `Unspecified`, which bills like `Monthly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
    Annual,
    Daily,
    Unspecified,
}

impl Frequency {
    /// Every frequency with its own multiplier, in display order
    pub const ALL: [Frequency; 6] = [
        Frequency::Monthly,
        Frequency::Semimonthly,
        Frequency::Annual,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Daily,
    ];

    /// Parse a stored frequency, falling back to `Unspecified`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Frequency::Weekly,
            "biweekly" => Frequency::Biweekly,
            "semimonthly" => Frequency::Semimonthly,
            "monthly" => Frequency::Monthly,
            "annual" => Frequency::Annual,
            "daily" => Frequency::Daily,
            _ => Frequency::Unspecified,
        }
    }

    /// Number of occurrences per year
    pub fn annual_multiplier(&self) -> Decimal {
        match self {
            Frequency::Annual => Decimal::ONE,
            Frequency::Monthly | Frequency::Unspecified => Decimal::from(12),
            Frequency::Semimonthly => Decimal::from(24),
            Frequency::Biweekly => Decimal::from(26),
            Frequency::Weekly => Decimal::from(52),
            Frequency::Daily => days_per_year(),
        }
    }

    /// Stored name; `Unspecified` has none of its own
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Semimonthly => "semimonthly",
            Frequency::Monthly => "monthly",
            Frequency::Annual => "annual",
            Frequency::Daily => "daily",
            Frequency::Unspecified => "",
        }
    }

    /// Short suffix for amounts billed at this frequency
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Annual => "/yr",
            Frequency::Monthly | Frequency::Unspecified => "/mo",
            Frequency::Semimonthly => "/2x mo",
            Frequency::Biweekly => "/2wk",
            Frequency::Weekly => "/wk",
            Frequency::Daily => "/day",
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Unspecified
    }
}

impl From<&str> for Frequency {
    fn from(s: &str) -> Self {
        Frequency::parse_lenient(s)
    }
}

impl From<String> for Frequency {
    fn from(s: String) -> Self {
        Frequency::parse_lenient(&s)
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Unspecified => write!(f, "unspecified"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Unit of time an amount can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// All units, largest first
    pub const ALL: [TimeUnit; 6] = [
        TimeUnit::Year,
        TimeUnit::Month,
        TimeUnit::Day,
        TimeUnit::Hour,
        TimeUnit::Minute,
        TimeUnit::Second,
    ];

    /// How many of this unit fit in one year
    pub fn divisor(&self) -> Decimal {
        let days = days_per_year();
        match self {
            TimeUnit::Year => Decimal::ONE,
            TimeUnit::Month => Decimal::from(12),
            TimeUnit::Day => days,
            TimeUnit::Hour => days * Decimal::from(24),
            TimeUnit::Minute => days * Decimal::from(24 * 60),
            TimeUnit::Second => days * Decimal::from(24 * 3600),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Year => "year",
            TimeUnit::Month => "month",
            TimeUnit::Day => "day",
            TimeUnit::Hour => "hour",
            TimeUnit::Minute => "minute",
            TimeUnit::Second => "second",
        }
    }

    /// Short suffix for amounts expressed in this unit
    pub fn label(&self) -> &'static str {
        match self {
            TimeUnit::Year => "/yr",
            TimeUnit::Month => "/mo",
            TimeUnit::Day => "/day",
            TimeUnit::Hour => "/hr",
            TimeUnit::Minute => "/min",
            TimeUnit::Second => "/sec",
        }
    }
}

impl Default for TimeUnit {
    fn default() -> Self {
        TimeUnit::Month
    }
}

impl FromStr for TimeUnit {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(TimeUnit::Year),
            "month" => Ok(TimeUnit::Month),
            "day" => Ok(TimeUnit::Day),
            "hour" => Ok(TimeUnit::Hour),
            "minute" => Ok(TimeUnit::Minute),
            "second" => Ok(TimeUnit::Second),
            other => Err(FinanceError::InvalidTimeUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 365.25, the average calendar year in days
fn days_per_year() -> Decimal {
    Decimal::new(36525, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_frequency_parsing() {
        assert_eq!(Frequency::parse_lenient("weekly"), Frequency::Weekly);
        assert_eq!(Frequency::parse_lenient(" BiWeekly "), Frequency::Biweekly);
        assert_eq!(Frequency::parse_lenient("custom"), Frequency::Unspecified);
        assert_eq!(Frequency::parse_lenient(""), Frequency::Unspecified);
    }

    #[test]
    fn test_unspecified_bills_monthly() {
        assert_eq!(
            Frequency::Unspecified.annual_multiplier(),
            Frequency::Monthly.annual_multiplier()
        );
        assert_eq!(Frequency::Unspecified.label(), "/mo");
    }

    #[test]
    fn test_time_unit_parse() {
        assert_eq!("hour".parse::<TimeUnit>().unwrap(), TimeUnit::Hour);
        assert_eq!("Month".parse::<TimeUnit>().unwrap(), TimeUnit::Month);
        assert!(matches!(
            "fortnight".parse::<TimeUnit>(),
            Err(FinanceError::InvalidTimeUnit(_))
        ));
    }

    #[test]
    fn test_second_divisor() {
        assert_eq!(TimeUnit::Second.divisor(), Decimal::from(31_557_600));
        assert_eq!(TimeUnit::Minute.divisor(), Decimal::from(525_960));
    }

    #[test]
    fn test_frequency_serde_roundtrip_falls_back() {
        let f: Frequency = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(f, Frequency::Unspecified);
        assert_eq!(serde_json::to_string(&Frequency::Weekly).unwrap(), "\"weekly\"");
    }
}
