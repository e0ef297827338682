//! Attendance record model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One tracked working day for one employee.
///
/// Every row counts as a working day; `absent` marks the day as missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Identifier of the employee this row belongs to.
    pub employee_id: String,
    /// The calendar day tracked.
    pub date: NaiveDate,
    /// Whether the employee was absent that day.
    #[serde(default)]
    pub absent: bool,
    /// Free-text reason code, blank when present.
    #[serde(default)]
    pub reason: String,
    /// Explicit unauthorized marker when the source carries one.
    #[serde(default)]
    pub unauthorized: Option<bool>,
}

impl AttendanceRecord {
    /// Returns true if the row is an unauthorized absence.
    ///
    /// A row is unauthorized when it is an absence and either carries an
    /// explicit `unauthorized: true` marker or its reason matches one of
    /// `unauthorized_reasons` (case-insensitive, surrounding whitespace
    /// ignored). An explicit `Some(false)` marker wins over the reason.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::AttendanceRecord;
    /// use chrono::NaiveDate;
    ///
    /// let row = AttendanceRecord {
    ///     employee_id: "E001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
    ///     absent: true,
    ///     reason: " awol ".to_string(),
    ///     unauthorized: None,
    /// };
    /// assert!(row.is_unauthorized(&["AWOL".to_string()]));
    /// assert!(!row.is_unauthorized(&["SICK".to_string()]));
    /// ```
    pub fn is_unauthorized(&self, unauthorized_reasons: &[String]) -> bool {
        if !self.absent {
            return false;
        }
        match self.unauthorized {
            Some(marker) => marker,
            None => {
                let reason = self.reason.trim();
                !reason.is_empty()
                    && unauthorized_reasons
                        .iter()
                        .any(|r| r.trim().eq_ignore_ascii_case(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_row(absent: bool, reason: &str, unauthorized: Option<bool>) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "E001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            absent,
            reason: reason.to_string(),
            unauthorized,
        }
    }

    fn reasons() -> Vec<String> {
        vec!["AWOL".to_string(), "NO SHOW".to_string()]
    }

    #[test]
    fn test_present_row_is_never_unauthorized() {
        assert!(!create_row(false, "AWOL", Some(true)).is_unauthorized(&reasons()));
    }

    #[test]
    fn test_explicit_marker_wins_over_reason() {
        assert!(create_row(true, "SICK", Some(true)).is_unauthorized(&reasons()));
        assert!(!create_row(true, "AWOL", Some(false)).is_unauthorized(&reasons()));
    }

    #[test]
    fn test_reason_match_is_case_insensitive() {
        assert!(create_row(true, "no show", None).is_unauthorized(&reasons()));
    }

    #[test]
    fn test_blank_reason_is_authorized() {
        assert!(!create_row(true, "", None).is_unauthorized(&reasons()));
    }

    #[test]
    fn test_deserialize_minimal_row() {
        let json = r#"{"employee_id": "E009", "date": "2025-03-03"}"#;
        let row: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert!(!row.absent);
        assert_eq!(row.reason, "");
        assert_eq!(row.unauthorized, None);
    }
}
