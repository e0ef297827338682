//! Metrics snapshot model.
//!
//! A [`MetricsSnapshot`] is the immutable KPI result for one
//! (organizational node, reference period) pair. Rates are exact
//! [`Decimal`] fractions in `[0, 1]`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RoleType;

/// Every scalar metric carried by a snapshot, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// All members handed to the aggregator.
    TotalMembers,
    /// Members active at the reference date.
    ActiveMembers,
    /// Members with invalid date fields.
    InvalidMembers,
    /// Members who left within the period.
    ResignedMembers,
    /// Active members flagged pregnant.
    PregnantMembers,
    /// Active members over a risk threshold.
    HighRiskMembers,
    /// Active members with tenure under the configured threshold.
    ShortTenureMembers,
    /// Tracked working days in the window.
    WorkingDays,
    /// Absent days in the window.
    AbsentDays,
    /// Unauthorized absent days in the window.
    UnauthorizedDays,
    /// Present days over working days.
    AttendanceRate,
    /// Absent days over working days.
    AbsenceRate,
    /// Absence rate with pregnant members' rows removed.
    AbsenceRateExclMaternity,
    /// Unauthorized days over working days.
    UnauthorizedRate,
    /// Resigned members over members present.
    ResignationRate,
    /// Mean tenure of active members, in days.
    MeanTenureDays,
    /// Mean tenure of active members, in years.
    MeanTenureYears,
    /// Sum of incentive amounts of active members.
    IncentiveTotal,
}

impl MetricKind {
    /// All metric kinds in report order.
    pub const ALL: [MetricKind; 18] = [
        MetricKind::TotalMembers,
        MetricKind::ActiveMembers,
        MetricKind::InvalidMembers,
        MetricKind::ResignedMembers,
        MetricKind::PregnantMembers,
        MetricKind::HighRiskMembers,
        MetricKind::ShortTenureMembers,
        MetricKind::WorkingDays,
        MetricKind::AbsentDays,
        MetricKind::UnauthorizedDays,
        MetricKind::AttendanceRate,
        MetricKind::AbsenceRate,
        MetricKind::AbsenceRateExclMaternity,
        MetricKind::UnauthorizedRate,
        MetricKind::ResignationRate,
        MetricKind::MeanTenureDays,
        MetricKind::MeanTenureYears,
        MetricKind::IncentiveTotal,
    ];

    /// Returns true for metrics expressed as a fraction.
    pub fn is_rate(&self) -> bool {
        matches!(
            self,
            MetricKind::AttendanceRate
                | MetricKind::AbsenceRate
                | MetricKind::AbsenceRateExclMaternity
                | MetricKind::UnauthorizedRate
                | MetricKind::ResignationRate
        )
    }
}

/// Immutable KPI values for one node and one period.
///
/// Built only by the metrics aggregator; read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub(crate) total_members: usize,
    pub(crate) active_members: usize,
    pub(crate) invalid_members: usize,
    pub(crate) resigned_members: usize,
    pub(crate) pregnant_members: usize,
    pub(crate) high_risk_members: usize,
    pub(crate) short_tenure_members: usize,
    pub(crate) working_days: usize,
    pub(crate) absent_days: usize,
    pub(crate) unauthorized_days: usize,
    pub(crate) attendance_rate: Decimal,
    pub(crate) absence_rate: Decimal,
    pub(crate) absence_rate_excl_maternity: Decimal,
    pub(crate) unauthorized_rate: Decimal,
    pub(crate) resignation_rate: Decimal,
    pub(crate) mean_tenure_days: Decimal,
    pub(crate) mean_tenure_years: Decimal,
    pub(crate) type_distribution: BTreeMap<RoleType, usize>,
    pub(crate) incentive_total: Decimal,
}

impl MetricsSnapshot {
    /// Returns the value of a scalar metric.
    pub fn metric(&self, kind: MetricKind) -> Decimal {
        match kind {
            MetricKind::TotalMembers => Decimal::from(self.total_members),
            MetricKind::ActiveMembers => Decimal::from(self.active_members),
            MetricKind::InvalidMembers => Decimal::from(self.invalid_members),
            MetricKind::ResignedMembers => Decimal::from(self.resigned_members),
            MetricKind::PregnantMembers => Decimal::from(self.pregnant_members),
            MetricKind::HighRiskMembers => Decimal::from(self.high_risk_members),
            MetricKind::ShortTenureMembers => Decimal::from(self.short_tenure_members),
            MetricKind::WorkingDays => Decimal::from(self.working_days),
            MetricKind::AbsentDays => Decimal::from(self.absent_days),
            MetricKind::UnauthorizedDays => Decimal::from(self.unauthorized_days),
            MetricKind::AttendanceRate => self.attendance_rate,
            MetricKind::AbsenceRate => self.absence_rate,
            MetricKind::AbsenceRateExclMaternity => self.absence_rate_excl_maternity,
            MetricKind::UnauthorizedRate => self.unauthorized_rate,
            MetricKind::ResignationRate => self.resignation_rate,
            MetricKind::MeanTenureDays => self.mean_tenure_days,
            MetricKind::MeanTenureYears => self.mean_tenure_years,
            MetricKind::IncentiveTotal => self.incentive_total,
        }
    }

    /// All members handed to the aggregator, whatever their status.
    pub fn total_members(&self) -> usize {
        self.total_members
    }

    /// Members active at the reference date.
    pub fn active_members(&self) -> usize {
        self.active_members
    }

    /// Members excluded from every rate because of invalid dates.
    pub fn invalid_members(&self) -> usize {
        self.invalid_members
    }

    /// Members whose stop date fell inside the period.
    pub fn resigned_members(&self) -> usize {
        self.resigned_members
    }

    /// Active members flagged pregnant.
    pub fn pregnant_members(&self) -> usize {
        self.pregnant_members
    }

    /// Active members over a risk threshold.
    pub fn high_risk_members(&self) -> usize {
        self.high_risk_members
    }

    /// Active members with tenure under the configured threshold.
    pub fn short_tenure_members(&self) -> usize {
        self.short_tenure_members
    }

    /// Tracked working days in the window.
    pub fn working_days(&self) -> usize {
        self.working_days
    }

    /// Absent days in the window.
    pub fn absent_days(&self) -> usize {
        self.absent_days
    }

    /// Unauthorized absent days in the window.
    pub fn unauthorized_days(&self) -> usize {
        self.unauthorized_days
    }

    /// Present days over working days.
    pub fn attendance_rate(&self) -> Decimal {
        self.attendance_rate
    }

    /// Absent days over working days.
    pub fn absence_rate(&self) -> Decimal {
        self.absence_rate
    }

    /// Absence rate with all rows of pregnant members removed.
    pub fn absence_rate_excl_maternity(&self) -> Decimal {
        self.absence_rate_excl_maternity
    }

    /// Unauthorized days over working days.
    pub fn unauthorized_rate(&self) -> Decimal {
        self.unauthorized_rate
    }

    /// Resigned members over members present during the period.
    pub fn resignation_rate(&self) -> Decimal {
        self.resignation_rate
    }

    /// Mean tenure of active members, in days.
    pub fn mean_tenure_days(&self) -> Decimal {
        self.mean_tenure_days
    }

    /// Mean tenure of active members, in years of 365.25 days.
    pub fn mean_tenure_years(&self) -> Decimal {
        self.mean_tenure_years
    }

    /// Active members per role type.
    pub fn type_distribution(&self) -> &BTreeMap<RoleType, usize> {
        &self.type_distribution
    }

    /// Sum of incentive amounts of active members.
    pub fn incentive_total(&self) -> Decimal {
        self.incentive_total
    }
}
