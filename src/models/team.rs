//! Canonical team grouping models.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::MetricsSnapshot;

/// How a record's label was resolved to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The label equals one of the team's listed labels.
    ExactLabel,
    /// The label contains one of the team's keywords.
    Keyword,
    /// Nothing matched; the record went to the catch-all team.
    CatchAll,
}

/// A grouping of team members under one secondary position label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTeam {
    /// The secondary position label keying this sub-team.
    pub name: String,
    /// Identifiers of the records in this sub-team.
    pub members: Vec<String>,
    /// KPIs over the sub-team's members.
    pub metrics: MetricsSnapshot,
}

/// A canonical team for one reference period.
///
/// Team nodes are rebuilt from scratch for every period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamNode {
    /// The canonical team name.
    pub name: String,
    /// The position labels that resolved to this team.
    pub matched_labels: BTreeSet<String>,
    /// The rule kinds that produced those matches.
    pub match_kinds: BTreeSet<MatchKind>,
    /// Identifiers of every record classified into the team, in input order.
    pub members: Vec<String>,
    /// Sub-teams keyed by secondary position label.
    pub sub_teams: BTreeMap<String, SubTeam>,
    /// KPIs over all of the team's members.
    pub metrics: MetricsSnapshot,
}

impl TeamNode {
    /// Returns the sub-team with the given name.
    pub fn sub_team(&self, name: &str) -> Option<&SubTeam> {
        self.sub_teams.get(name)
    }

    /// Returns true if any member fell through to the catch-all rule.
    pub fn has_unmapped_members(&self) -> bool {
        self.match_kinds.contains(&MatchKind::CatchAll)
    }
}
