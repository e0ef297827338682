//! Reference period model.
//!
//! A [`ReferencePeriod`] pairs an inclusive date window, used to filter
//! attendance rows and resignations, with the explicit reference date at
//! which membership is evaluated. Month-end and report-date evaluation of
//! the same month are different periods; there is no implicit default.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The granularity of a reference period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// A calendar month, evaluated at month end or at a report date.
    Monthly,
    /// A seven-day window ending on its reference date.
    Weekly,
    /// A single day.
    Daily,
}

/// A window of days plus the date at which "active" is evaluated.
///
/// # Example
///
/// ```
/// use workforce_engine::models::{PeriodKind, ReferencePeriod};
/// use chrono::NaiveDate;
///
/// let january = ReferencePeriod::month_end(2025, 1).unwrap();
/// assert_eq!(january.kind(), PeriodKind::Monthly);
/// assert_eq!(january.start(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
/// assert_eq!(january.reference_date(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
///
/// let as_of = ReferencePeriod::month_as_of(2025, 1, NaiveDate::from_ymd_opt(2025, 1, 17).unwrap()).unwrap();
/// assert_ne!(january, as_of);
/// assert_eq!(as_of.end(), as_of.reference_date());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferencePeriod {
    kind: PeriodKind,
    start: NaiveDate,
    end: NaiveDate,
    reference_date: NaiveDate,
}

impl ReferencePeriod {
    /// Creates a period, validating `start <= reference_date <= end`.
    pub fn new(
        kind: PeriodKind,
        start: NaiveDate,
        end: NaiveDate,
        reference_date: NaiveDate,
    ) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::InvalidPeriod {
                message: format!("start {} is after end {}", start, end),
            });
        }
        if reference_date < start || reference_date > end {
            return Err(EngineError::InvalidPeriod {
                message: format!(
                    "reference date {} is outside {}..={}",
                    reference_date, start, end
                ),
            });
        }
        Ok(Self {
            kind,
            start,
            end,
            reference_date,
        })
    }

    /// The whole calendar month, evaluated on its last day.
    pub fn month_end(year: i32, month: u32) -> EngineResult<Self> {
        let (start, end) = month_bounds(year, month)?;
        Self::new(PeriodKind::Monthly, start, end, end)
    }

    /// The month up to and including `report_date`, evaluated on that date.
    pub fn month_as_of(year: i32, month: u32, report_date: NaiveDate) -> EngineResult<Self> {
        let (start, end) = month_bounds(year, month)?;
        if report_date > end {
            return Err(EngineError::InvalidPeriod {
                message: format!("report date {} is after month end {}", report_date, end),
            });
        }
        Self::new(PeriodKind::Monthly, start, report_date, report_date)
    }

    /// The seven days ending on (and including) `end`.
    pub fn week_ending(end: NaiveDate) -> EngineResult<Self> {
        Self::new(PeriodKind::Weekly, end - Duration::days(6), end, end)
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> EngineResult<Self> {
        Self::new(PeriodKind::Daily, date, date, date)
    }

    /// `count` adjacent weeks, the last one ending on `end`, oldest first.
    ///
    /// ```
    /// use workforce_engine::models::ReferencePeriod;
    /// use chrono::NaiveDate;
    ///
    /// let weeks = ReferencePeriod::trailing_weeks(NaiveDate::from_ymd_opt(2025, 1, 26).unwrap(), 3).unwrap();
    /// assert_eq!(weeks.len(), 3);
    /// assert_eq!(weeks[0].end(), NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());
    /// assert_eq!(weeks[1].start(), NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());
    /// ```
    pub fn trailing_weeks(end: NaiveDate, count: usize) -> EngineResult<Vec<Self>> {
        (0..count)
            .rev()
            .map(|offset| Self::week_ending(end - Duration::weeks(offset as i64)))
            .collect()
    }

    /// The adjacent earlier period of the same kind.
    ///
    /// Month-end periods step to the prior month end. Report-date periods
    /// step to the same day of the prior month, clamped to its length.
    pub fn previous(&self) -> EngineResult<Self> {
        match self.kind {
            PeriodKind::Monthly => {
                let (year, month) = if self.start.month() == 1 {
                    (self.start.year() - 1, 12)
                } else {
                    (self.start.year(), self.start.month() - 1)
                };
                if self.is_month_end() {
                    Self::month_end(year, month)
                } else {
                    let (_, prior_end) = month_bounds(year, month)?;
                    let day = self.reference_date.day().min(prior_end.day());
                    let report_date = prior_end.with_day(day).unwrap_or(prior_end);
                    Self::month_as_of(year, month, report_date)
                }
            }
            PeriodKind::Weekly => Self::week_ending(self.end - Duration::weeks(1)),
            PeriodKind::Daily => Self::day(self.end - Duration::days(1)),
        }
    }

    /// Returns the period kind.
    pub fn kind(&self) -> PeriodKind {
        self.kind
    }

    /// First day of the window (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// The date at which membership is evaluated.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Checks if a date falls within the window (inclusive at both ends).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true for a monthly period evaluated on the month's last day.
    pub fn is_month_end(&self) -> bool {
        self.kind == PeriodKind::Monthly && (self.end + Duration::days(1)).day() == 1
    }

    /// A short human label, e.g. `2025-01`, `2025-01-17`, `W2025-01-19`.
    pub fn label(&self) -> String {
        match self.kind {
            PeriodKind::Monthly if self.is_month_end() => {
                format!("{:04}-{:02}", self.start.year(), self.start.month())
            }
            PeriodKind::Monthly => format!("{}", self.reference_date),
            PeriodKind::Weekly => format!("W{}", self.end),
            PeriodKind::Daily => format!("{}", self.end),
        }
    }
}

impl std::fmt::Display for ReferencePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn month_bounds(year: i32, month: u32) -> EngineResult<(NaiveDate, NaiveDate)> {
    let invalid = || EngineError::InvalidPeriod {
        message: format!("no such month {:04}-{:02}", year, month),
    };
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let end = next.and_then(|d| d.pred_opt()).ok_or_else(invalid)?;
    Ok((start, end))
}
