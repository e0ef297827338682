//! Calculation logic for the Workforce Engine.
//!
//! This module contains the temporal membership evaluator, the team
//! classifier, the attendance ledger and metrics aggregator, the management
//! hierarchy builder, and the period-over-period delta calculator. Every
//! function takes the reference period explicitly; nothing here reads a
//! clock.

mod attendance;
mod classifier;
mod hierarchy;
mod membership;
mod metrics;
mod rollup;

pub use attendance::{AttendanceLedger, AttendanceTally, ratio};
pub use classifier::{TeamAssignment, TeamClassifier, UNASSIGNED_SUB_TEAM};
pub use hierarchy::{HierarchyBuild, HierarchyBuilder};
pub use membership::{
    MemberStatus, is_active, member_status, record_defect, relevant_to, resigned_within,
    tenure_days,
};
pub use metrics::{DAYS_PER_YEAR, MetricsAggregator};
pub use rollup::{
    Comparison, DeltaRow, DeltaTable, MetricDelta, NodeKey, PercentChange, PeriodState,
    SnapshotDelta, SnapshotSeries, compare, compare_optional,
};
