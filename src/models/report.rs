//! Period report models.
//!
//! This module contains the [`PeriodReport`] type and the structures that
//! capture everything the engine derives for one reference period: the
//! workforce-wide snapshot, team and hierarchy roll-ups, high-risk detail,
//! classification coverage, and the collected data defects.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DataDefect, DefectKind, HierarchyForest, MetricsSnapshot, ReferencePeriod, TeamNode};

/// Why a member was flagged high-risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskReason {
    /// Individual attendance rate below the configured minimum.
    LowAttendance,
    /// Individual unauthorized rate above the configured maximum.
    UnauthorizedAbsence,
}

/// Identity detail for one high-risk member.
///
/// Snapshots only carry the count; this is the export-side detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighRiskMember {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name.
    pub name: String,
    /// Tracked working days in the window.
    pub working_days: usize,
    /// Absent days in the window.
    pub absent_days: usize,
    /// Unauthorized absent days in the window.
    pub unauthorized_days: usize,
    /// Individual attendance rate.
    pub attendance_rate: Decimal,
    /// Individual unauthorized rate.
    pub unauthorized_rate: Decimal,
    /// Every threshold the member crossed.
    pub reasons: Vec<RiskReason>,
}

/// How completely the classification table covered an extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Records classified.
    pub total_records: usize,
    /// Records resolved by an exact label or keyword rule.
    pub mapped_records: usize,
    /// Records that fell through to the catch-all team.
    pub unmapped_ids: Vec<String>,
}

impl CoverageReport {
    /// Returns true when every record matched a real rule.
    pub fn is_complete(&self) -> bool {
        self.unmapped_ids.is_empty()
    }

    /// Mapped records over total records; 1 for an empty extract.
    pub fn coverage_rate(&self) -> Decimal {
        if self.total_records == 0 {
            Decimal::ONE
        } else {
            Decimal::from(self.mapped_records) / Decimal::from(self.total_records)
        }
    }
}

/// Everything derived for one reference period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    /// Unique identifier for this build.
    pub report_id: Uuid,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
    /// The version of the engine that built the report.
    pub engine_version: String,
    /// The period the report describes.
    pub period: ReferencePeriod,
    /// KPIs over the whole extract.
    pub workforce: MetricsSnapshot,
    /// Canonical teams keyed by name.
    pub teams: BTreeMap<String, TeamNode>,
    /// The management hierarchy of active employees.
    pub hierarchy: HierarchyForest,
    /// Identity detail for high-risk members.
    pub high_risk: Vec<HighRiskMember>,
    /// Classification coverage of the extract.
    pub coverage: CoverageReport,
    /// Every defect found while building the period.
    pub defects: Vec<DataDefect>,
    /// Defect totals per kind.
    pub defect_counts: BTreeMap<DefectKind, usize>,
    /// Build duration in microseconds.
    pub duration_us: u64,
}

impl PeriodReport {
    /// Returns the total number of defects.
    pub fn defect_total(&self) -> usize {
        self.defects.len()
    }
}

/// The result of asking the engine for one period.
///
/// `NoData` means the period was not computed because its source
/// collections were absent; it is never a zero-filled report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PeriodOutcome {
    /// The period was built.
    Built(Box<PeriodReport>),
    /// No source data existed for the period.
    NoData {
        /// The period that was requested.
        period: ReferencePeriod,
    },
}

impl PeriodOutcome {
    /// The period this outcome belongs to.
    pub fn period(&self) -> ReferencePeriod {
        match self {
            PeriodOutcome::Built(report) => report.period,
            PeriodOutcome::NoData { period } => *period,
        }
    }

    /// Returns the report when the period was built.
    pub fn report(&self) -> Option<&PeriodReport> {
        match self {
            PeriodOutcome::Built(report) => Some(report),
            PeriodOutcome::NoData { .. } => None,
        }
    }

    /// Returns true when the period was built.
    pub fn is_built(&self) -> bool {
        matches!(self, PeriodOutcome::Built(_))
    }
}
