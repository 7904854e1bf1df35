use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A calendar month, ordered chronologically and displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid month: '{0}' (expected YYYY-MM)")]
pub struct MonthParseError(pub String);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Month { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(err)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(err());
        }
        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn from_date_drops_day() {
        assert_eq!(Month::from(date(2024, 3, 15)), Month::from(date(2024, 3, 1)));
        assert_ne!(Month::from(date(2024, 3, 31)), Month::from(date(2024, 4, 1)));
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(Month::from(date(2024, 1, 15)).to_string(), "2024-01");
        assert_eq!(Month::new(987, 12).unwrap().to_string(), "0987-12");
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert!(Month::new(2024, 0).is_none());
        assert!(Month::new(2024, 13).is_none());
        assert!(Month::new(2024, 12).is_some());
    }

    #[test]
    fn parse_roundtrips_display() {
        let m: Month = "2024-02".parse().unwrap();
        assert_eq!(m.year(), 2024);
        assert_eq!(m.month(), 2);
        assert_eq!(m.to_string(), "2024-02");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("2024-2".parse::<Month>().is_err());
        assert!("2024/02".parse::<Month>().is_err());
        assert!("2024-13".parse::<Month>().is_err());
        assert!("bad-date".parse::<Month>().is_err());
    }

    #[test]
    fn ordering_is_chronological() {
        let dec = Month::new(2023, 12).unwrap();
        let jan = Month::new(2024, 1).unwrap();
        assert!(dec < jan);
    }
}
