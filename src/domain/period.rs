//! Provider look-back periods ("5d", "6mo", "1y", "ytd", "max").

use chrono::{DateTime, Datelike, Months, TimeDelta, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Period {
    /// Earliest timestamp covered when the window ends at `latest`.
    /// `None` means unbounded, including windows reaching past the
    /// earliest representable date.
    pub fn start_from(&self, latest: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Period::Days(n) => latest.checked_sub_signed(TimeDelta::try_days(i64::from(n))?),
            Period::Weeks(n) => latest.checked_sub_signed(TimeDelta::try_weeks(i64::from(n))?),
            Period::Months(n) => latest.checked_sub_months(Months::new(n)),
            Period::Years(n) => latest.checked_sub_months(Months::new(n.saturating_mul(12))),
            Period::YearToDate => Utc.with_ymd_and_hms(latest.year(), 1, 1, 0, 0, 0).single(),
            Period::Max => None,
        }
    }
}

impl FromStr for Period {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PipelineError::InvalidPeriod {
            value: s.to_string(),
        };
        let text = s.trim().to_ascii_lowercase();

        match text.as_str() {
            "ytd" => return Ok(Period::YearToDate),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (count, unit) = text.split_at(split);
        let n: u32 = count.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }

        match unit {
            "d" => Ok(Period::Days(n)),
            "wk" => Ok(Period::Weeks(n)),
            "mo" => Ok(Period::Months(n)),
            "y" => Ok(Period::Years(n)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{}d", n),
            Period::Weeks(n) => write!(f, "{}wk", n),
            Period::Months(n) => write!(f, "{}mo", n),
            Period::Years(n) => write!(f, "{}y", n),
            Period::YearToDate => write!(f, "ytd"),
            Period::Max => write!(f, "max"),
        }
    }
}
