use crate::error::{Result, SellerFinanceError};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A reporting period: an ISO week (`2024-W07`) or a calendar month (`2024-02`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PeriodId {
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl PeriodId {
    pub fn week(year: i32, week: u32) -> Result<Self> {
        if NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).is_none() {
            return Err(SellerFinanceError::InvalidPeriod(format!("{:04}-W{:02}", year, week)));
        }
        Ok(PeriodId::Week { year, week })
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(SellerFinanceError::InvalidPeriod(format!("{:04}-{:02}", year, month)));
        }
        Ok(PeriodId::Month { year, month })
    }

    pub fn week_of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        PeriodId::Week {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn month_of(date: NaiveDate) -> Self {
        PeriodId::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First and last calendar day of the period.
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let range = match *self {
            PeriodId::Week { year, week } => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
                .zip(NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)),
            PeriodId::Month { year, month } => {
                NaiveDate::from_ymd_opt(year, month, 1).zip(last_day_of_month(year, month))
            }
        };
        range.ok_or_else(|| SellerFinanceError::InvalidPeriod(self.to_string()))
    }

    /// The period immediately before this one, for change comparisons.
    pub fn previous(&self) -> Result<Self> {
        match *self {
            PeriodId::Week { .. } => {
                let (monday, _) = self.date_range()?;
                monday
                    .checked_sub_days(Days::new(7))
                    .map(PeriodId::week_of)
                    .ok_or_else(|| SellerFinanceError::InvalidPeriod(self.to_string()))
            }
            PeriodId::Month { year, month } => {
                if month == 1 {
                    PeriodId::month(year - 1, 12)
                } else {
                    PeriodId::month(year, month - 1)
                }
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.date_range() {
            Ok((start, end)) => start <= date && date <= end,
            Err(_) => false,
        }
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodId::Week { year, week } => write!(f, "{:04}-W{:02}", year, week),
            PeriodId::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

impl FromStr for PeriodId {
    type Err = SellerFinanceError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SellerFinanceError::InvalidPeriod(s.to_string());
        let (year, rest) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        if let Some(week) = rest.strip_prefix('W') {
            let week: u32 = week.parse().map_err(|_| invalid())?;
            PeriodId::week(year, week).map_err(|_| invalid())
        } else {
            let month: u32 = rest.parse().map_err(|_| invalid())?;
            PeriodId::month(year, month).map_err(|_| invalid())
        }
    }
}

impl TryFrom<String> for PeriodId {
    type Error = SellerFinanceError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PeriodId> for String {
    fn from(period: PeriodId) -> Self {
        period.to_string()
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

/// ISO weeks that belong to a month, using the ISO rule that a week belongs to
/// the month holding its Thursday. Every week lands in exactly one month.
pub fn weeks_in_month(year: i32, month: u32) -> Result<Vec<PeriodId>> {
    let (first, last) = PeriodId::month(year, month)?.date_range()?;

    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| d.weekday() == Weekday::Thu)
        .map(PeriodId::week_of)
        .collect())
}

/// Parses a period label into its first and last day.
pub fn parse_period_range(period: &str) -> Result<(NaiveDate, NaiveDate)> {
    period.parse::<PeriodId>()?.date_range()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let week: PeriodId = "2024-W07".parse().unwrap();
        assert_eq!(week, PeriodId::Week { year: 2024, week: 7 });
        assert_eq!(week.to_string(), "2024-W07");

        let month: PeriodId = "2024-02".parse().unwrap();
        assert_eq!(month, PeriodId::Month { year: 2024, month: 2 });
        assert_eq!(month.to_string(), "2024-02");
    }

    #[test]
    fn test_rejects_invalid_labels() {
        for label in ["2024", "2024-13", "2024-W54", "2023-W53", "abcd-01", "2024-Wx", ""] {
            assert!(label.parse::<PeriodId>().is_err(), "{} should be rejected", label);
        }
        // 2020 has 53 ISO weeks
        assert!("2020-W53".parse::<PeriodId>().is_ok());
    }

    #[test]
    fn test_week_date_range() {
        let (start, end) = parse_period_range("2024-W01").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }

    #[test]
    fn test_month_date_range() {
        let (start, end) = parse_period_range("2024-02").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_previous_crosses_year() {
        let week: PeriodId = "2024-W01".parse().unwrap();
        assert_eq!(week.previous().unwrap().to_string(), "2023-W52");

        let month: PeriodId = "2024-01".parse().unwrap();
        assert_eq!(month.previous().unwrap().to_string(), "2023-12");
    }

    #[test]
    fn test_weeks_in_month() {
        // Thursdays in Feb 2024: 1, 8, 15, 22, 29
        let weeks = weeks_in_month(2024, 2).unwrap();
        let labels: Vec<String> = weeks.iter().map(|w| w.to_string()).collect();
        assert_eq!(
            labels,
            vec!["2024-W05", "2024-W06", "2024-W07", "2024-W08", "2024-W09"]
        );

        // Jan 2021 starts on Friday, so 2020-W53 belongs to December.
        let jan = weeks_in_month(2021, 1).unwrap();
        assert_eq!(jan.first().unwrap().to_string(), "2021-W01");
        let dec = weeks_in_month(2020, 12).unwrap();
        assert_eq!(dec.last().unwrap().to_string(), "2020-W53");
    }

    #[test]
    fn test_serde_as_string() {
        let period: PeriodId = serde_json::from_str("\"2024-W10\"").unwrap();
        assert_eq!(period, PeriodId::Week { year: 2024, week: 10 });
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2024-W10\"");
        assert!(serde_json::from_str::<PeriodId>("\"2024-W99\"").is_err());
    }

    #[test]
    fn test_contains() {
        let month: PeriodId = "2024-03".parse().unwrap();
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }
}
