//! Read-only queries over a built period report.

use crate::error::EngineResult;
use crate::models::{
    CoverageReport, DataDefect, HierarchyNode, HighRiskMember, PeriodReport, SubTeam, TeamNode,
};

/// A read-only view over one [`PeriodReport`].
///
/// # Example
///
/// ```
/// use workforce_engine::query::ReportQuery;
/// # use workforce_engine::config::ConfigLoader;
/// # use workforce_engine::engine::{PeriodInput, WorkforceEngine};
/// # use workforce_engine::models::ReferencePeriod;
/// # let engine = WorkforceEngine::new(ConfigLoader::load("./config/default").unwrap().into_config());
/// # let outcome = engine
/// #     .build_period(PeriodInput::new(&[], &[]), ReferencePeriod::month_end(2025, 1).unwrap())
/// #     .unwrap();
/// # let report = outcome.report().unwrap();
///
/// let query = ReportQuery::new(report);
/// assert!(query.team("PAINT").is_some());
/// assert!(query.manager("nobody").is_none());
/// let json = query.to_json().unwrap();
/// assert!(json.contains("\"report_id\""));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReportQuery<'a> {
    report: &'a PeriodReport,
}

impl<'a> ReportQuery<'a> {
    /// Wraps a report.
    pub fn new(report: &'a PeriodReport) -> Self {
        Self { report }
    }

    /// Returns the wrapped report.
    pub fn report(&self) -> &'a PeriodReport {
        self.report
    }

    /// Looks up a team by name, ignoring case.
    pub fn team(&self, name: &str) -> Option<&'a TeamNode> {
        self.report.teams.get(name).or_else(|| {
            self.report
                .teams
                .values()
                .find(|team| team.name.eq_ignore_ascii_case(name))
        })
    }

    /// Looks up a sub-team within a team.
    pub fn sub_team(&self, team: &str, sub_team: &str) -> Option<&'a SubTeam> {
        self.team(team).and_then(|node| node.sub_teams.get(sub_team))
    }

    /// Looks up a hierarchy node.
    pub fn manager(&self, employee_id: &str) -> Option<&'a HierarchyNode> {
        self.report.hierarchy.get(employee_id)
    }

    /// Returns the chain of managers above an employee, nearest first.
    pub fn manager_chain(&self, employee_id: &str) -> Vec<&'a HierarchyNode> {
        self.report.hierarchy.ancestors(employee_id)
    }

    /// Returns an employee's direct reports.
    pub fn direct_reports(&self, employee_id: &str) -> Vec<&'a HierarchyNode> {
        self.report.hierarchy.children(employee_id)
    }

    /// Returns the period's high-risk members.
    pub fn high_risk_members(&self) -> &'a [HighRiskMember] {
        &self.report.high_risk
    }

    /// Returns every defect recorded against an employee.
    pub fn defects_of(&self, employee_id: &str) -> Vec<&'a DataDefect> {
        self.report
            .defects
            .iter()
            .filter(|defect| defect.employee_id.as_deref() == Some(employee_id))
            .collect()
    }

    /// Returns the classification coverage.
    pub fn coverage(&self) -> &'a CoverageReport {
        &self.report.coverage
    }

    /// Serializes the report to compact JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self.report)?)
    }

    /// Serializes the report to indented JSON.
    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self.report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::engine::{PeriodInput, WorkforceEngine};
    use crate::models::{AttendanceRecord, EmployeeRecord, ReferencePeriod, RoleType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_employee(id: &str, label: &str, sub_team: &str, manager: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            name: format!("Employee {}", id),
            positions: [
                String::new(),
                String::new(),
                label.to_string(),
                sub_team.to_string(),
            ],
            manager_id: manager.to_string(),
            entrance_date: Some(date(2024, 2, 1)),
            stop_date: None,
            role_type: RoleType::Direct,
            pregnant: false,
            incentive: Decimal::ZERO,
        }
    }

    fn create_report() -> PeriodReport {
        let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
        let engine = WorkforceEngine::new(loader.into_config());
        let employees = vec![
            create_employee("M1", "PLANT MANAGEMENT", "", ""),
            create_employee("S1", "FINAL ASSEMBLY", "CELL A", "M1"),
            create_employee("E1", "FINAL ASSEMBLY", "CELL A", "S1"),
            create_employee("E2", "SUB ASSEMBLY", "CELL B", "S1"),
            create_employee("X1", "CANTEEN", "", "GHOST"),
        ];
        let attendance: Vec<AttendanceRecord> = (1..=10)
            .map(|d| AttendanceRecord {
                employee_id: "E1".to_string(),
                date: date(2025, 1, d),
                absent: d <= 5,
                reason: "SICK".to_string(),
                unauthorized: None,
            })
            .collect();
        let outcome = engine
            .build_period(
                PeriodInput::new(&employees, &attendance),
                ReferencePeriod::month_end(2025, 1).unwrap(),
            )
            .unwrap();
        outcome.report().cloned().unwrap()
    }

    #[test]
    fn test_team_lookup_ignores_case() {
        let report = create_report();
        let query = ReportQuery::new(&report);
        assert_eq!(query.team("assembly").unwrap().members.len(), 3);
        assert!(query.team("NOPE").is_none());
    }

    #[test]
    fn test_sub_team_lookup() {
        let report = create_report();
        let query = ReportQuery::new(&report);
        let cell_a = query.sub_team("ASSEMBLY", "CELL A").unwrap();
        assert_eq!(cell_a.members, vec!["S1", "E1"]);
        assert!(query.sub_team("ASSEMBLY", "CELL Z").is_none());
    }

    #[test]
    fn test_manager_chain_and_direct_reports() {
        let report = create_report();
        let query = ReportQuery::new(&report);

        let chain: Vec<&str> = query
            .manager_chain("E1")
            .iter()
            .map(|n| n.employee_id.as_str())
            .collect();
        assert_eq!(chain, vec!["S1", "M1"]);

        let reports: Vec<&str> = query
            .direct_reports("S1")
            .iter()
            .map(|n| n.employee_id.as_str())
            .collect();
        assert_eq!(reports, vec!["E1", "E2"]);
        assert_eq!(query.manager("S1").unwrap().depth, 1);
    }

    #[test]
    fn test_high_risk_and_defects() {
        let report = create_report();
        let query = ReportQuery::new(&report);

        assert_eq!(query.high_risk_members().len(), 1);
        assert_eq!(query.high_risk_members()[0].employee_id, "E1");

        let defects = query.defects_of("X1");
        assert_eq!(defects.len(), 2);
        assert!(query.defects_of("E1").is_empty());
        assert!(!query.coverage().is_complete());
    }

    #[test]
    fn test_json_export() {
        let report = create_report();
        let query = ReportQuery::new(&report);
        let json = query.to_json_pretty().unwrap();
        let parsed: PeriodReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.report_id, report.report_id);
        assert_eq!(parsed.workforce, report.workforce);
    }
}
