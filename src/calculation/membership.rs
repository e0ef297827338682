//! Temporal membership evaluation.
//!
//! This module decides whether an employee record is active at a reference
//! date. It is the only place the entrance/stop date boundary is compared:
//! entrance is inclusive (`entrance <= reference`), stop is strict
//! (`stop > reference`). Everything else in the crate that needs "active",
//! "resigned" or "tenure" goes through [`member_status`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DataDefect, DefectKind, EmployeeRecord, ReferencePeriod};

/// The four mutually exclusive outcomes of membership evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Entered on or before the reference date and not yet stopped.
    Active,
    /// Entrance date is after the reference date.
    NotYetEntered,
    /// Stop date is on or before the reference date.
    Departed,
    /// Entrance date is missing, or stop date precedes entrance date.
    Invalid,
}

/// Evaluates a record's membership at `reference_date`.
///
/// Invalid records are detected first, regardless of the reference date.
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::{member_status, MemberStatus};
/// use workforce_engine::models::{EmployeeRecord, RoleType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = EmployeeRecord {
///     id: "E001".to_string(),
///     name: "Kim".to_string(),
///     positions: Default::default(),
///     manager_id: String::new(),
///     entrance_date: NaiveDate::from_ymd_opt(2025, 1, 1),
///     stop_date: NaiveDate::from_ymd_opt(2025, 1, 20),
///     role_type: RoleType::Direct,
///     pregnant: false,
///     incentive: Decimal::ZERO,
/// };
///
/// let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
/// assert_eq!(member_status(&record, day(19)), MemberStatus::Active);
/// assert_eq!(member_status(&record, day(20)), MemberStatus::Departed);
/// ```
pub fn member_status(record: &EmployeeRecord, reference_date: NaiveDate) -> MemberStatus {
    let Ok(entrance) = validated_entrance(record) else {
        return MemberStatus::Invalid;
    };
    if entrance > reference_date {
        return MemberStatus::NotYetEntered;
    }
    match record.stop_date {
        Some(stop) if stop <= reference_date => MemberStatus::Departed,
        _ => MemberStatus::Active,
    }
}

/// Returns true if the record is active at `reference_date`.
pub fn is_active(record: &EmployeeRecord, reference_date: NaiveDate) -> bool {
    member_status(record, reference_date) == MemberStatus::Active
}

/// Returns the data defect that makes a record invalid, if any.
pub fn record_defect(record: &EmployeeRecord) -> Option<DataDefect> {
    let kind = validated_entrance(record).err()?;
    let message = match kind {
        DefectKind::StopBeforeEntrance => format!(
            "stop date {} precedes entrance date {}",
            record.stop_date.map(|d| d.to_string()).unwrap_or_default(),
            record.entrance_date.map(|d| d.to_string()).unwrap_or_default()
        ),
        _ => "entrance date is missing or unparseable".to_string(),
    };
    Some(DataDefect::new(Some(&record.id), kind, message))
}

fn validated_entrance(record: &EmployeeRecord) -> Result<NaiveDate, DefectKind> {
    let entrance = record
        .entrance_date
        .ok_or(DefectKind::MissingEntranceDate)?;
    match record.stop_date {
        Some(stop) if stop < entrance => Err(DefectKind::StopBeforeEntrance),
        _ => Ok(entrance),
    }
}

/// Returns true if the record resigned within `period`.
///
/// A resignation counts when the record is departed at the period's
/// reference date and its stop date is not before the period start.
/// A stop date later in the window than the reference date has not
/// happened yet.
pub fn resigned_within(record: &EmployeeRecord, period: &ReferencePeriod) -> bool {
    member_status(record, period.reference_date()) == MemberStatus::Departed
        && record.stop_date.is_some_and(|stop| stop >= period.start())
}

/// Returns true if the record belongs in `period`'s member set: active at
/// the reference date, resigned within the window, or invalid.
///
/// Invalid records stay in so their defects and counts surface. Records
/// that departed before the window or have not yet entered are dropped.
pub fn relevant_to(record: &EmployeeRecord, period: &ReferencePeriod) -> bool {
    match member_status(record, period.reference_date()) {
        MemberStatus::Active | MemberStatus::Invalid => true,
        MemberStatus::Departed => resigned_within(record, period),
        MemberStatus::NotYetEntered => false,
    }
}

/// Returns the tenure in days at `reference_date` for records with a
/// resolvable entrance date that have already entered.
pub fn tenure_days(record: &EmployeeRecord, reference_date: NaiveDate) -> Option<i64> {
    match member_status(record, reference_date) {
        MemberStatus::Invalid | MemberStatus::NotYetEntered => None,
        MemberStatus::Active | MemberStatus::Departed => record
            .entrance_date
            .map(|entrance| (reference_date - entrance).num_days()),
    }
}
