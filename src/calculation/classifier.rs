//! Team classification.
//!
//! Maps a record's position label onto one canonical team using the ordered
//! rule table from `teams.yaml`:
//!
//! 1. exact label match, teams in table order;
//! 2. keyword containment, teams in table order, keywords in list order;
//! 3. the catch-all team.
//!
//! Classification is total and deterministic. Records that reach step 3 are
//! coverage gaps and are reported as [`DefectKind::UnmappedClassification`].

use tracing::warn;

use crate::config::{EngineConfig, TeamRule};
use crate::models::{CoverageReport, DataDefect, DefectKind, EmployeeRecord, MatchKind};

/// Sub-team key used when a record carries no position labels at all.
pub const UNASSIGNED_SUB_TEAM: &str = "UNASSIGNED";

/// The team a record resolved to and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAssignment {
    /// The canonical team name.
    pub team: String,
    /// The label used for classification, empty when the record had none.
    pub label: String,
    /// Which rule resolved the label.
    pub match_kind: MatchKind,
    /// The secondary label keying the record's sub-team.
    pub sub_team: String,
}

impl TeamAssignment {
    /// Returns true when the record fell through to the catch-all team.
    pub fn is_unmapped(&self) -> bool {
        self.match_kind == MatchKind::CatchAll
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    labels: Vec<String>,
    keywords: Vec<String>,
}

/// Classifies records into canonical teams.
#[derive(Debug, Clone)]
pub struct TeamClassifier {
    rules: Vec<CompiledRule>,
    catch_all: String,
}

impl TeamClassifier {
    /// Creates a classifier from an ordered rule table.
    ///
    /// Labels and keywords are compared trimmed and upper-cased; blank
    /// entries are dropped.
    pub fn new(rules: &[TeamRule], catch_all: &str) -> Self {
        let rules: Vec<CompiledRule> = rules
            .iter()
            .map(|rule| CompiledRule {
                name: rule.name.trim().to_string(),
                labels: normalized(&rule.labels),
                keywords: normalized(&rule.keywords),
            })
            .collect();
        // A catch-all that names a listed team shares that team's spelling.
        let catch_all = rules
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(catch_all.trim()))
            .map(|r| r.name.clone())
            .unwrap_or_else(|| catch_all.trim().to_string());
        Self { rules, catch_all }
    }

    /// Creates a classifier from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.teams(), &config.settings().catch_all_team)
    }

    /// Returns the catch-all team name.
    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    /// Returns every canonical team name, table order, catch-all last.
    pub fn team_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&self.catch_all)) {
            names.push(&self.catch_all);
        }
        names
    }

    /// Classifies a record.
    ///
    /// The classification label is the first non-blank of the 3rd, 2nd and
    /// 1st level labels. The sub-team key is the 4th level label, falling
    /// back to the classification label.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::calculation::TeamClassifier;
    /// use workforce_engine::config::TeamRule;
    /// use workforce_engine::models::{EmployeeRecord, MatchKind, RoleType};
    /// use rust_decimal::Decimal;
    ///
    /// let rules = vec![TeamRule {
    ///     name: "ASSEMBLY".to_string(),
    ///     labels: vec!["FINAL ASSEMBLY".to_string()],
    ///     keywords: vec!["ASSY".to_string()],
    /// }];
    /// let classifier = TeamClassifier::new(&rules, "OTHER");
    ///
    /// let mut record = EmployeeRecord {
    ///     id: "E001".to_string(),
    ///     name: "Kim".to_string(),
    ///     positions: [
    ///         "PRODUCTION".to_string(),
    ///         "ASSY PREP".to_string(),
    ///         String::new(),
    ///         "CELL B".to_string(),
    ///     ],
    ///     manager_id: String::new(),
    ///     entrance_date: None,
    ///     stop_date: None,
    ///     role_type: RoleType::Direct,
    ///     pregnant: false,
    ///     incentive: Decimal::ZERO,
    /// };
    ///
    /// let assignment = classifier.classify(&record);
    /// assert_eq!(assignment.team, "ASSEMBLY");
    /// assert_eq!(assignment.match_kind, MatchKind::Keyword);
    /// assert_eq!(assignment.sub_team, "CELL B");
    ///
    /// record.positions[1] = "CANTEEN".to_string();
    /// assert_eq!(classifier.classify(&record).team, "OTHER");
    /// ```
    pub fn classify(&self, record: &EmployeeRecord) -> TeamAssignment {
        let label = [3, 2, 1]
            .iter()
            .find_map(|&level| record.position(level))
            .unwrap_or_default()
            .to_string();
        let sub_team = record
            .position(4)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if label.is_empty() {
                    UNASSIGNED_SUB_TEAM.to_string()
                } else {
                    label.clone()
                }
            });

        let key = label.to_uppercase();
        let (team, match_kind) = match self.resolve(&key) {
            Some((team, kind)) => (team.to_string(), kind),
            None => (self.catch_all.clone(), MatchKind::CatchAll),
        };

        TeamAssignment {
            team,
            label,
            match_kind,
            sub_team,
        }
    }

    fn resolve(&self, key: &str) -> Option<(&str, MatchKind)> {
        if key.is_empty() {
            return None;
        }
        if let Some(rule) = self.rules.iter().find(|r| r.labels.iter().any(|l| l == key)) {
            return Some((rule.name.as_str(), MatchKind::ExactLabel));
        }
        self.rules
            .iter()
            .find(|r| r.keywords.iter().any(|k| key.contains(k.as_str())))
            .map(|rule| (rule.name.as_str(), MatchKind::Keyword))
    }

    /// Classifies every record, returning assignments in input order, the
    /// coverage report, and one defect per unmapped record.
    pub fn classify_all<'r>(
        &self,
        records: impl IntoIterator<Item = &'r EmployeeRecord>,
    ) -> (Vec<TeamAssignment>, CoverageReport, Vec<DataDefect>) {
        let records: Vec<&EmployeeRecord> = records.into_iter().collect();
        let assignments: Vec<TeamAssignment> = records.iter().map(|r| self.classify(r)).collect();

        let mut coverage = CoverageReport {
            total_records: records.len(),
            ..CoverageReport::default()
        };
        let mut defects = Vec::new();
        for (record, assignment) in records.iter().zip(&assignments) {
            if assignment.is_unmapped() {
                warn!(
                    employee_id = %record.id,
                    label = %assignment.label,
                    team = %assignment.team,
                    "Position label matched no team rule"
                );
                coverage.unmapped_ids.push(record.id.clone());
                defects.push(DataDefect::new(
                    Some(&record.id),
                    DefectKind::UnmappedClassification,
                    format!(
                        "label '{}' matched no team rule; assigned to {}",
                        assignment.label, assignment.team
                    ),
                ));
            } else {
                coverage.mapped_records += 1;
            }
        }

        (assignments, coverage, defects)
    }

    /// Returns the coverage of `records` under this rule table.
    pub fn coverage<'r>(
        &self,
        records: impl IntoIterator<Item = &'r EmployeeRecord>,
    ) -> CoverageReport {
        self.classify_all(records).1
    }
}

fn normalized(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .collect()
}
