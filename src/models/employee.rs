//! Employee record model and related types.
//!
//! This module defines the [`EmployeeRecord`] struct and [`RoleType`] enum
//! for representing one row of a monthly personnel extract.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of position levels carried on every record.
pub const POSITION_LEVELS: usize = 4;

/// The role-type tag attached to an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Direct labour working on the production line.
    Direct,
    /// Indirect labour supporting production.
    Indirect,
    /// Office and support staff.
    Staff,
    /// People managers.
    Manager,
    /// External contractors carried on the roster.
    Contractor,
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleType::Direct => write!(f, "Direct"),
            RoleType::Indirect => write!(f, "Indirect"),
            RoleType::Staff => write!(f, "Staff"),
            RoleType::Manager => write!(f, "Manager"),
            RoleType::Contractor => write!(f, "Contractor"),
        }
    }
}

/// One employee row from a monthly personnel extract.
///
/// Records are immutable once loaded. A missing or unparseable entrance date
/// is handed over by ingestion as `None` and surfaces later as a data defect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique identifier, stable across months.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Position labels from 1st (broadest) to 4th (most specific) level.
    #[serde(default)]
    pub positions: [String; POSITION_LEVELS],
    /// Identifier of the employee's manager, empty when none.
    #[serde(default)]
    pub manager_id: String,
    /// The date the employee entered the company.
    pub entrance_date: Option<NaiveDate>,
    /// The date the employee left, if they have.
    #[serde(default)]
    pub stop_date: Option<NaiveDate>,
    /// The role-type tag.
    pub role_type: RoleType,
    /// Whether the employee is flagged as pregnant.
    #[serde(default)]
    pub pregnant: bool,
    /// Incentive amount paid for the month.
    #[serde(default)]
    pub incentive: Decimal,
}

impl EmployeeRecord {
    /// Returns the position label at a 1-based level, or `None` when the
    /// level is out of range or the label is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::{EmployeeRecord, RoleType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let record = EmployeeRecord {
    ///     id: "E001".to_string(),
    ///     name: "Kim".to_string(),
    ///     positions: [
    ///         "PRODUCTION".to_string(),
    ///         "FINAL ASSEMBLY".to_string(),
    ///         "  ".to_string(),
    ///         String::new(),
    ///     ],
    ///     manager_id: String::new(),
    ///     entrance_date: NaiveDate::from_ymd_opt(2024, 3, 1),
    ///     stop_date: None,
    ///     role_type: RoleType::Direct,
    ///     pregnant: false,
    ///     incentive: Decimal::ZERO,
    /// };
    /// assert_eq!(record.position(2), Some("FINAL ASSEMBLY"));
    /// assert_eq!(record.position(3), None);
    /// assert_eq!(record.position(9), None);
    /// ```
    pub fn position(&self, level: usize) -> Option<&str> {
        if level == 0 {
            return None;
        }
        self.positions
            .get(level - 1)
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
    }

    /// Returns the manager reference, or `None` when it is blank.
    pub fn manager_ref(&self) -> Option<&str> {
        let manager = self.manager_id.trim();
        if manager.is_empty() {
            None
        } else {
            Some(manager)
        }
    }
}
