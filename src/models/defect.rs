//! Data-quality defects collected while building a period.
//!
//! Defects never abort a computation. They are attached to the affected
//! record (when there is one) and counted, so data quality becomes a KPI of
//! its own.

use serde::{Deserialize, Serialize};

/// The broad class a defect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectCategory {
    /// A malformed or missing value on a single record.
    DataError,
    /// An inconsistency in the manager references between records.
    StructuralError,
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    /// Entrance date missing or unparseable.
    MissingEntranceDate,
    /// Stop date earlier than entrance date.
    StopBeforeEntrance,
    /// Position label matched no team rule and fell into the catch-all team.
    UnmappedClassification,
    /// The same employee identifier appears more than once in an extract.
    DuplicateEmployee,
    /// The same (employee, date) attendance row appears more than once.
    DuplicateAttendance,
    /// An attendance row references an employee missing from the extract.
    OrphanAttendance,
    /// An employee lists themselves as their own manager.
    SelfManaged,
    /// The manager reference names no employee in the extract, or one who
    /// has not yet entered or whose record is invalid.
    UnresolvedManager,
    /// The manager exists but departed on or before the reference date.
    DepartedManager,
    /// The manager chain loops back on itself.
    ManagerCycle,
}

impl DefectKind {
    /// Returns the category of this defect kind.
    pub fn category(&self) -> DefectCategory {
        match self {
            DefectKind::MissingEntranceDate
            | DefectKind::StopBeforeEntrance
            | DefectKind::UnmappedClassification
            | DefectKind::DuplicateEmployee
            | DefectKind::DuplicateAttendance
            | DefectKind::OrphanAttendance => DefectCategory::DataError,
            DefectKind::SelfManaged
            | DefectKind::UnresolvedManager
            | DefectKind::DepartedManager
            | DefectKind::ManagerCycle => DefectCategory::StructuralError,
        }
    }
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DefectKind::MissingEntranceDate => "missing_entrance_date",
            DefectKind::StopBeforeEntrance => "stop_before_entrance",
            DefectKind::UnmappedClassification => "unmapped_classification",
            DefectKind::DuplicateEmployee => "duplicate_employee",
            DefectKind::DuplicateAttendance => "duplicate_attendance",
            DefectKind::OrphanAttendance => "orphan_attendance",
            DefectKind::SelfManaged => "self_managed",
            DefectKind::UnresolvedManager => "unresolved_manager",
            DefectKind::DepartedManager => "departed_manager",
            DefectKind::ManagerCycle => "manager_cycle",
        };
        write!(f, "{}", name)
    }
}

/// A reportable data-quality defect.
///
/// # Example
///
/// ```
/// use workforce_engine::models::{DataDefect, DefectCategory, DefectKind};
///
/// let defect = DataDefect::new(
///     Some("E042"),
///     DefectKind::StopBeforeEntrance,
///     "stop 2025-01-02 precedes entrance 2025-01-10",
/// );
/// assert_eq!(defect.kind.category(), DefectCategory::DataError);
/// assert_eq!(defect.employee_id.as_deref(), Some("E042"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDefect {
    /// The affected employee, when the defect belongs to one record.
    pub employee_id: Option<String>,
    /// What went wrong.
    pub kind: DefectKind,
    /// A human-readable description.
    pub message: String,
}

impl DataDefect {
    /// Creates a new defect.
    pub fn new(employee_id: Option<&str>, kind: DefectKind, message: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.map(str::to_string),
            kind,
            message: message.into(),
        }
    }
}
