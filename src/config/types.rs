//! Configuration types for workforce aggregation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One entry of the team classification table.
///
/// Exact labels are consulted before keywords, and teams are consulted in
/// the order they appear in `teams.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRule {
    /// The canonical team name.
    pub name: String,
    /// Position labels that map to this team verbatim.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Substrings that map a label to this team when no exact label matched.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Teams configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamsConfig {
    /// The ordered classification table.
    pub teams: Vec<TeamRule>,
}

/// Which members a manager's snapshot is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationScope {
    /// Only the manager's direct reports.
    #[default]
    DirectReports,
    /// Every node below the manager.
    Subtree,
}

/// Per-member thresholds that flag a member as high-risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Members whose attendance rate is below this are high-risk.
    pub min_attendance_rate: Decimal,
    /// Members whose unauthorized rate is above this are high-risk.
    pub max_unauthorized_rate: Decimal,
}

/// Engine settings from engine.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Team receiving every record no rule matched.
    pub catch_all_team: String,
    /// Absence reasons counted as unauthorized.
    #[serde(default)]
    pub unauthorized_reasons: Vec<String>,
    /// High-risk thresholds.
    pub high_risk: RiskThresholds,
    /// Active members with fewer tenure days than this are counted as
    /// short-tenure.
    pub short_tenure_days: i64,
    /// Scope of manager snapshots in the hierarchy.
    #[serde(default)]
    pub hierarchy_scope: AggregationScope,
}

/// The complete, validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    settings: EngineSettings,
    teams: Vec<TeamRule>,
}

impl EngineConfig {
    /// Creates a configuration, rejecting tables the classifier cannot use.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_engine::config::{
    ///     AggregationScope, EngineConfig, EngineSettings, RiskThresholds, TeamRule,
    /// };
    /// use rust_decimal::Decimal;
    ///
    /// let settings = EngineSettings {
    ///     catch_all_team: "OTHER".to_string(),
    ///     unauthorized_reasons: vec!["AWOL".to_string()],
    ///     high_risk: RiskThresholds {
    ///         min_attendance_rate: Decimal::new(90, 2),
    ///         max_unauthorized_rate: Decimal::new(5, 2),
    ///     },
    ///     short_tenure_days: 90,
    ///     hierarchy_scope: AggregationScope::DirectReports,
    /// };
    /// let teams = vec![TeamRule {
    ///     name: "ASSEMBLY".to_string(),
    ///     labels: vec!["ASSEMBLY LINE 1".to_string()],
    ///     keywords: vec!["ASSEMBLY".to_string()],
    /// }];
    ///
    /// let config = EngineConfig::new(settings, teams).unwrap();
    /// assert_eq!(config.teams().len(), 1);
    /// ```
    pub fn new(settings: EngineSettings, teams: Vec<TeamRule>) -> EngineResult<Self> {
        if teams.is_empty() {
            return Err(invalid("the team table is empty"));
        }
        if settings.catch_all_team.trim().is_empty() {
            return Err(invalid("catch_all_team must not be blank"));
        }
        let mut seen = std::collections::HashSet::new();
        for rule in &teams {
            let name = rule.name.trim();
            if name.is_empty() {
                return Err(invalid("team names must not be blank"));
            }
            if !seen.insert(name.to_uppercase()) {
                return Err(invalid(format!("team '{}' is listed twice", name)));
            }
        }
        let unit = Decimal::ZERO..=Decimal::ONE;
        if !unit.contains(&settings.high_risk.min_attendance_rate) {
            return Err(invalid("high_risk.min_attendance_rate must be within 0..=1"));
        }
        if !unit.contains(&settings.high_risk.max_unauthorized_rate) {
            return Err(invalid("high_risk.max_unauthorized_rate must be within 0..=1"));
        }
        if settings.short_tenure_days < 0 {
            return Err(invalid("short_tenure_days must not be negative"));
        }
        Ok(Self { settings, teams })
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the ordered team classification table.
    pub fn teams(&self) -> &[TeamRule] {
        &self.teams
    }
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}
