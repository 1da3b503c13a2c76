//! The `YYYY-MM` UTC billing period key (§3 "Tenant usage", §6 "Period key").

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A UTC calendar month, keyed `YYYY-MM`.
///
/// Usage queries accept any timestamp within a period and key by its UTC
/// year-month (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// The period containing `at`, keyed by its UTC year-month.
    #[must_use]
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// The first instant of this period, in UTC.
    #[must_use]
    pub fn start(self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
            .expect("year/month pair was validated at construction")
    }

    /// The `YYYY-MM` string key.
    #[must_use]
    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_s, month_s) = s
            .split_once('-')
            .ok_or_else(|| CoreError::InvalidPeriod(s.to_owned()))?;
        let year: i32 = year_s
            .parse()
            .map_err(|_| CoreError::InvalidPeriod(s.to_owned()))?;
        let month: u32 = month_s
            .parse()
            .map_err(|_| CoreError::InvalidPeriod(s.to_owned()))?;
        if !(1..=12).contains(&month) || year_s.len() != 4 {
            return Err(CoreError::InvalidPeriod(s.to_owned()));
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for Period {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.key()
    }
}
