//! Core data models for the Workforce Engine.
//!
//! This module contains the input records handed over by ingestion, the
//! reference period type, and every value object the engine produces.

mod attendance;
mod defect;
mod employee;
mod hierarchy;
mod period;
mod report;
mod snapshot;
mod team;

pub use attendance::AttendanceRecord;
pub use defect::{DataDefect, DefectCategory, DefectKind};
pub use employee::{EmployeeRecord, POSITION_LEVELS, RoleType};
pub use hierarchy::{HierarchyForest, HierarchyNode};
pub use period::{PeriodKind, ReferencePeriod};
pub use report::{CoverageReport, HighRiskMember, PeriodOutcome, PeriodReport, RiskReason};
pub use snapshot::{MetricKind, MetricsSnapshot};
pub use team::{MatchKind, SubTeam, TeamNode};
