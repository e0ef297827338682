//! Metrics aggregation.
//!
//! The [`MetricsAggregator`] turns any member set (a team, a sub-team, a
//! manager's reports, the whole extract) plus the period's attendance
//! ledger into a [`MetricsSnapshot`]. Membership always comes from
//! [`member_status`] at the period's reference date.
//!
//! ## Denominators
//!
//! - Absence, attendance and unauthorized rates divide by tracked working
//!   days of valid members. Members without rows add nothing to either side.
//! - The maternity-excluded absence rate removes every row of pregnant
//!   members from both sides.
//! - Resignation rate divides resigned members by members present, which is
//!   active members plus those who resigned in the window.
//! - Invalid members are counted but contribute to no rate.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::{EngineSettings, RiskThresholds};
use crate::models::{
    EmployeeRecord, HighRiskMember, MetricsSnapshot, ReferencePeriod, RiskReason,
};

use super::attendance::{AttendanceLedger, AttendanceTally, ratio};
use super::membership::{MemberStatus, member_status, resigned_within, tenure_days};

/// Days per year used for tenure in years.
pub const DAYS_PER_YEAR: Decimal = Decimal::from_parts(36525, 0, 0, false, 2);

/// Computes metrics snapshots from member sets.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    thresholds: RiskThresholds,
    short_tenure_days: i64,
}

impl MetricsAggregator {
    /// Creates an aggregator with explicit thresholds.
    pub fn new(thresholds: RiskThresholds, short_tenure_days: i64) -> Self {
        Self {
            thresholds,
            short_tenure_days,
        }
    }

    /// Creates an aggregator from engine settings.
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.high_risk.clone(), settings.short_tenure_days)
    }

    /// Computes the snapshot for `members` over `period`.
    ///
    /// `ledger` must have been built for the same period. The result only
    /// depends on the inputs, so computing it twice yields equal snapshots.
    pub fn aggregate(
        &self,
        members: &[&EmployeeRecord],
        ledger: &AttendanceLedger,
        period: &ReferencePeriod,
    ) -> MetricsSnapshot {
        let reference_date = period.reference_date();

        let mut active_members = 0;
        let mut invalid_members = 0;
        let mut resigned_members = 0;
        let mut pregnant_members = 0;
        let mut high_risk_members = 0;
        let mut short_tenure_members = 0;
        let mut tenure_sum: i64 = 0;
        let mut tenure_count: usize = 0;
        let mut incentive_total = Decimal::ZERO;
        let mut type_distribution = BTreeMap::new();
        let mut attendance = AttendanceTally::default();
        let mut non_maternity = AttendanceTally::default();

        for member in members {
            let status = member_status(member, reference_date);
            if status == MemberStatus::Invalid {
                invalid_members += 1;
                continue;
            }

            if let Some(tally) = ledger.tally(&member.id) {
                attendance.add(tally);
                if !member.pregnant {
                    non_maternity.add(tally);
                }
            }

            if resigned_within(member, period) {
                resigned_members += 1;
            }

            if status != MemberStatus::Active {
                continue;
            }

            active_members += 1;
            *type_distribution.entry(member.role_type).or_insert(0) += 1;
            incentive_total += member.incentive;
            if member.pregnant {
                pregnant_members += 1;
            }
            if let Some(days) = tenure_days(member, reference_date) {
                tenure_sum += days;
                tenure_count += 1;
                if days < self.short_tenure_days {
                    short_tenure_members += 1;
                }
            }
            if ledger
                .tally(&member.id)
                .is_some_and(|tally| !self.risk_reasons(tally).is_empty())
            {
                high_risk_members += 1;
            }
        }

        let mean_tenure_days = if tenure_count == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(tenure_sum) / Decimal::from(tenure_count)
        };

        MetricsSnapshot {
            total_members: members.len(),
            active_members,
            invalid_members,
            resigned_members,
            pregnant_members,
            high_risk_members,
            short_tenure_members,
            working_days: attendance.working_days,
            absent_days: attendance.absent_days,
            unauthorized_days: attendance.unauthorized_days,
            attendance_rate: attendance.attendance_rate(),
            absence_rate: attendance.absence_rate(),
            absence_rate_excl_maternity: non_maternity.absence_rate(),
            unauthorized_rate: attendance.unauthorized_rate(),
            resignation_rate: ratio(resigned_members, active_members + resigned_members),
            mean_tenure_days,
            mean_tenure_years: mean_tenure_days / DAYS_PER_YEAR,
            type_distribution,
            incentive_total,
        }
    }

    /// Returns identity detail for every active high-risk member, in input
    /// order.
    pub fn high_risk_members(
        &self,
        members: &[&EmployeeRecord],
        ledger: &AttendanceLedger,
        period: &ReferencePeriod,
    ) -> Vec<HighRiskMember> {
        members
            .iter()
            .filter(|member| member_status(member, period.reference_date()) == MemberStatus::Active)
            .filter_map(|member| {
                let tally = ledger.tally(&member.id)?;
                let reasons = self.risk_reasons(tally);
                if reasons.is_empty() {
                    return None;
                }
                Some(HighRiskMember {
                    employee_id: member.id.clone(),
                    name: member.name.clone(),
                    working_days: tally.working_days,
                    absent_days: tally.absent_days,
                    unauthorized_days: tally.unauthorized_days,
                    attendance_rate: tally.attendance_rate(),
                    unauthorized_rate: tally.unauthorized_rate(),
                    reasons,
                })
            })
            .collect()
    }

    fn risk_reasons(&self, tally: &AttendanceTally) -> Vec<RiskReason> {
        let mut reasons = Vec::new();
        if tally.working_days == 0 {
            return reasons;
        }
        if tally.attendance_rate() < self.thresholds.min_attendance_rate {
            reasons.push(RiskReason::LowAttendance);
        }
        if tally.unauthorized_rate() > self.thresholds.max_unauthorized_rate {
            reasons.push(RiskReason::UnauthorizedAbsence);
        }
        reasons
    }
}
