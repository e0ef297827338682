//! Attendance tallying for one reference period.
//!
//! The [`AttendanceLedger`] filters attendance rows to a period's window,
//! drops duplicate (employee, date) rows, and keeps per-employee day counts
//! that the metrics aggregator sums over any member set.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, DataDefect, DefectKind, ReferencePeriod};

/// Returns `numerator / denominator`, or zero when the denominator is zero.
///
/// ```
/// use workforce_engine::calculation::ratio;
/// use rust_decimal::Decimal;
///
/// assert_eq!(ratio(3, 200), Decimal::new(15, 3));
/// assert_eq!(ratio(5, 0), Decimal::ZERO);
/// ```
pub fn ratio(numerator: usize, denominator: usize) -> Decimal {
    if denominator == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(numerator) / Decimal::from(denominator)
    }
}

/// Day counts for one employee (or a sum over several).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTally {
    /// Tracked working days.
    pub working_days: usize,
    /// Days marked absent.
    pub absent_days: usize,
    /// Absent days that were unauthorized.
    pub unauthorized_days: usize,
}

impl AttendanceTally {
    /// Adds another tally into this one.
    pub fn add(&mut self, other: &AttendanceTally) {
        self.working_days += other.working_days;
        self.absent_days += other.absent_days;
        self.unauthorized_days += other.unauthorized_days;
    }

    /// Present days over working days; zero when nothing was tracked.
    pub fn attendance_rate(&self) -> Decimal {
        ratio(self.working_days - self.absent_days, self.working_days)
    }

    /// Absent days over working days; zero when nothing was tracked.
    pub fn absence_rate(&self) -> Decimal {
        ratio(self.absent_days, self.working_days)
    }

    /// Unauthorized days over working days; zero when nothing was tracked.
    pub fn unauthorized_rate(&self) -> Decimal {
        ratio(self.unauthorized_days, self.working_days)
    }
}

/// Per-employee attendance tallies for one period.
#[derive(Debug, Clone)]
pub struct AttendanceLedger {
    period: ReferencePeriod,
    tallies: HashMap<String, AttendanceTally>,
    defects: Vec<DataDefect>,
}

impl AttendanceLedger {
    /// Builds a ledger from raw rows.
    ///
    /// Rows outside `[period.start, period.end]` are ignored. A repeated
    /// (employee, date) row is counted once and reported as
    /// [`DefectKind::DuplicateAttendance`].
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_engine::calculation::AttendanceLedger;
    /// use workforce_engine::models::{AttendanceRecord, ReferencePeriod};
    /// use chrono::NaiveDate;
    ///
    /// let row = |day, absent| AttendanceRecord {
    ///     employee_id: "E001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
    ///     absent,
    ///     reason: String::new(),
    ///     unauthorized: None,
    /// };
    /// let rows = vec![row(6, false), row(7, true), row(7, true), row(31, false)];
    /// let week = ReferencePeriod::week_ending(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()).unwrap();
    ///
    /// let ledger = AttendanceLedger::for_period(&rows, &week, &[]);
    /// let tally = ledger.tally("E001").unwrap();
    /// assert_eq!(tally.working_days, 2);
    /// assert_eq!(tally.absent_days, 1);
    /// assert_eq!(ledger.defects().len(), 1);
    /// ```
    pub fn for_period(
        records: &[AttendanceRecord],
        period: &ReferencePeriod,
        unauthorized_reasons: &[String],
    ) -> Self {
        let mut tallies: HashMap<String, AttendanceTally> = HashMap::new();
        let mut seen: HashSet<(&str, NaiveDate)> = HashSet::new();
        let mut duplicates: BTreeMap<&str, usize> = BTreeMap::new();

        for row in records.iter().filter(|r| period.contains_date(r.date)) {
            if !seen.insert((row.employee_id.as_str(), row.date)) {
                *duplicates.entry(row.employee_id.as_str()).or_default() += 1;
                continue;
            }
            let tally = tallies.entry(row.employee_id.clone()).or_default();
            tally.working_days += 1;
            if row.absent {
                tally.absent_days += 1;
                if row.is_unauthorized(unauthorized_reasons) {
                    tally.unauthorized_days += 1;
                }
            }
        }

        let defects = duplicates
            .into_iter()
            .map(|(employee_id, count)| {
                DataDefect::new(
                    Some(employee_id),
                    DefectKind::DuplicateAttendance,
                    format!("{} duplicate attendance rows ignored in {}", count, period),
                )
            })
            .collect();

        Self {
            period: *period,
            tallies,
            defects,
        }
    }

    /// The period the ledger covers.
    pub fn period(&self) -> &ReferencePeriod {
        &self.period
    }

    /// Returns an employee's tally, `None` when they have no rows.
    pub fn tally(&self, employee_id: &str) -> Option<&AttendanceTally> {
        self.tallies.get(employee_id)
    }

    /// Returns the number of employees with at least one row.
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    /// Returns true if no rows fell inside the window.
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Defects found while building the ledger.
    pub fn defects(&self) -> &[DataDefect] {
        &self.defects
    }

    /// Reports employees with rows in the window but no employee record.
    ///
    /// One [`DefectKind::OrphanAttendance`] defect per unknown identifier,
    /// sorted by identifier.
    pub fn orphan_defects(&self, known_ids: &HashSet<&str>) -> Vec<DataDefect> {
        let mut orphans: Vec<(&String, &AttendanceTally)> = self
            .tallies
            .iter()
            .filter(|(id, _)| !known_ids.contains(id.as_str()))
            .collect();
        orphans.sort_by(|a, b| a.0.cmp(b.0));
        orphans
            .into_iter()
            .map(|(id, tally)| {
                DataDefect::new(
                    Some(id),
                    DefectKind::OrphanAttendance,
                    format!(
                        "{} attendance rows for an employee missing from the extract",
                        tally.working_days
                    ),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn row(id: &str, day: u32, absent: bool, reason: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: id.to_string(),
            date: date(day),
            absent,
            reason: reason.to_string(),
            unauthorized: None,
        }
    }

    fn january() -> ReferencePeriod {
        ReferencePeriod::month_end(2025, 1).unwrap()
    }

    #[test]
    fn test_ratio_is_exact() {
        assert_eq!(ratio(3, 200), Decimal::new(15, 3));
        assert_eq!(ratio(0, 0), Decimal::ZERO);
    }

    #[test]
    fn test_tallies_per_employee() {
        let rows = vec![
            row("E1", 2, false, ""),
            row("E1", 3, true, "SICK"),
            row("E1", 6, true, "AWOL"),
            row("E2", 2, false, ""),
        ];
        let ledger = AttendanceLedger::for_period(&rows, &january(), &["AWOL".to_string()]);

        let e1 = ledger.tally("E1").unwrap();
        assert_eq!(e1.working_days, 3);
        assert_eq!(e1.absent_days, 2);
        assert_eq!(e1.unauthorized_days, 1);
        assert_eq!(ledger.tally("E2").unwrap().absent_days, 0);
        assert!(ledger.tally("E3").is_none());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_rows_outside_window_are_ignored() {
        let mut rows = vec![row("E1", 2, true, "")];
        rows.push(AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            ..row("E1", 2, true, "")
        });
        let ledger = AttendanceLedger::for_period(&rows, &january(), &[]);
        assert_eq!(ledger.tally("E1").unwrap().working_days, 1);
    }

    #[test]
    fn test_report_date_window_excludes_later_rows() {
        let rows = vec![row("E1", 10, false, ""), row("E1", 20, true, "")];
        let as_of = ReferencePeriod::month_as_of(2025, 1, date(15)).unwrap();
        let ledger = AttendanceLedger::for_period(&rows, &as_of, &[]);
        let tally = ledger.tally("E1").unwrap();
        assert_eq!(tally.working_days, 1);
        assert_eq!(tally.absent_days, 0);
    }

    #[test]
    fn test_duplicates_are_counted_once_and_reported() {
        let rows = vec![
            row("E1", 2, true, ""),
            row("E1", 2, true, ""),
            row("E1", 2, false, ""),
        ];
        let ledger = AttendanceLedger::for_period(&rows, &january(), &[]);
        assert_eq!(ledger.tally("E1").unwrap().working_days, 1);
        assert_eq!(ledger.defects().len(), 1);
        assert_eq!(ledger.defects()[0].kind, DefectKind::DuplicateAttendance);
        assert!(ledger.defects()[0].message.starts_with("2 duplicate"));
    }

    #[test]
    fn test_orphan_defects() {
        let rows = vec![row("E1", 2, false, ""), row("X9", 2, false, "")];
        let ledger = AttendanceLedger::for_period(&rows, &january(), &[]);
        let known: HashSet<&str> = ["E1"].into_iter().collect();
        let orphans = ledger.orphan_defects(&known);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].employee_id.as_deref(), Some("X9"));
        assert_eq!(orphans[0].kind, DefectKind::OrphanAttendance);
    }

    #[test]
    fn test_tally_rates() {
        let tally = AttendanceTally {
            working_days: 20,
            absent_days: 2,
            unauthorized_days: 1,
        };
        assert_eq!(tally.attendance_rate(), Decimal::new(9, 1));
        assert_eq!(tally.absence_rate(), Decimal::new(1, 1));
        assert_eq!(tally.unauthorized_rate(), Decimal::new(5, 2));
        assert_eq!(AttendanceTally::default().attendance_rate(), Decimal::ZERO);
    }
}
