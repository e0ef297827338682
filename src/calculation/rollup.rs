//! Period-over-period comparison.
//!
//! Snapshots are stored per (node, period) in a [`SnapshotSeries`]; deltas
//! are computed only between periods that were both built, and a node that
//! is missing from the prior period is reported as unavailable rather than
//! compared against zero.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{MetricKind, MetricsSnapshot, PeriodReport, ReferencePeriod};

/// Relative change between two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PercentChange {
    /// Change in percent of the prior value (25 means +25%).
    Value(Decimal),
    /// The prior value was zero.
    Undefined,
}

impl PercentChange {
    /// Computes the percent change from `prior` to `current`.
    pub fn between(prior: Decimal, current: Decimal) -> Self {
        if prior.is_zero() {
            Self::Undefined
        } else {
            Self::Value((current - prior) / prior * Decimal::ONE_HUNDRED)
        }
    }
}

/// The change of one metric between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDelta {
    /// The metric compared.
    pub metric: MetricKind,
    /// Value in the earlier period.
    pub prior: Decimal,
    /// Value in the later period.
    pub current: Decimal,
    /// `current - prior`.
    pub absolute: Decimal,
    /// Relative change.
    pub percent: PercentChange,
}

/// Every metric's change between two snapshots, in [`MetricKind::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    deltas: Vec<MetricDelta>,
}

impl SnapshotDelta {
    /// Returns the delta for one metric.
    pub fn get(&self, metric: MetricKind) -> Option<&MetricDelta> {
        self.deltas.iter().find(|d| d.metric == metric)
    }

    /// Iterates over all metric deltas.
    pub fn iter(&self) -> impl Iterator<Item = &MetricDelta> {
        self.deltas.iter()
    }
}

/// Compares two snapshots metric by metric.
///
/// # Example
///
/// ```
/// use workforce_engine::calculation::{compare, PercentChange};
/// use workforce_engine::models::{MetricKind, MetricsSnapshot};
///
/// let delta = compare(&MetricsSnapshot::default(), &MetricsSnapshot::default());
/// let active = delta.get(MetricKind::ActiveMembers).unwrap();
/// assert!(active.absolute.is_zero());
/// assert_eq!(active.percent, PercentChange::Undefined);
/// ```
pub fn compare(prior: &MetricsSnapshot, current: &MetricsSnapshot) -> SnapshotDelta {
    let deltas = MetricKind::ALL
        .iter()
        .map(|&metric| {
            let before = prior.metric(metric);
            let after = current.metric(metric);
            MetricDelta {
                metric,
                prior: before,
                current: after,
                absolute: after - before,
                percent: PercentChange::between(before, after),
            }
        })
        .collect();
    SnapshotDelta { deltas }
}

/// The outcome of comparing against a possibly missing prior snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "delta", rename_all = "snake_case")]
pub enum Comparison {
    /// Both snapshots existed.
    Available(SnapshotDelta),
    /// There was no prior snapshot to compare against.
    Unavailable,
}

impl Comparison {
    /// Returns the delta when available.
    pub fn delta(&self) -> Option<&SnapshotDelta> {
        match self {
            Self::Available(delta) => Some(delta),
            Self::Unavailable => None,
        }
    }
}

/// Compares `current` against `prior` when it exists.
pub fn compare_optional(prior: Option<&MetricsSnapshot>, current: &MetricsSnapshot) -> Comparison {
    match prior {
        Some(prior) => Comparison::Available(compare(prior, current)),
        None => Comparison::Unavailable,
    }
}

/// Identifies a node whose snapshots are tracked across periods.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKey {
    /// The whole extract.
    Workforce,
    /// A canonical team.
    Team(String),
    /// A sub-team within a team.
    SubTeam {
        /// The owning team.
        team: String,
        /// The sub-team label.
        name: String,
    },
    /// A manager's hierarchy node.
    Manager(String),
}

/// Lifecycle of a period within a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodState {
    /// No snapshot has been stored for the period.
    Unbuilt,
    /// Snapshots are stored.
    Built,
    /// Deltas against the prior period have been produced.
    Compared,
}

/// One row of a delta table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRow {
    /// The node compared.
    pub node: NodeKey,
    /// The metric change.
    pub delta: MetricDelta,
}

/// Every node's metric deltas between two periods, keyed by (node, metric).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaTable {
    /// The earlier period.
    pub prior: ReferencePeriod,
    /// The later period.
    pub current: ReferencePeriod,
    rows: Vec<DeltaRow>,
    unavailable: Vec<NodeKey>,
}

impl DeltaTable {
    /// Returns the delta of `metric` for `node`.
    pub fn get(&self, node: &NodeKey, metric: MetricKind) -> Option<&MetricDelta> {
        self.rows
            .binary_search_by(|row| (&row.node, row.delta.metric).cmp(&(node, metric)))
            .ok()
            .map(|i| &self.rows[i].delta)
    }

    /// Returns the comparison for a node.
    pub fn comparison(&self, node: &NodeKey) -> Comparison {
        let deltas: Vec<MetricDelta> = self
            .rows
            .iter()
            .filter(|row| &row.node == node)
            .map(|row| row.delta.clone())
            .collect();
        if deltas.is_empty() {
            Comparison::Unavailable
        } else {
            Comparison::Available(SnapshotDelta { deltas })
        }
    }

    /// Iterates over every row, ordered by node then metric.
    pub fn rows(&self) -> impl Iterator<Item = &DeltaRow> {
        self.rows.iter()
    }

    /// Nodes present in the later period with no prior snapshot.
    pub fn unavailable(&self) -> &[NodeKey] {
        &self.unavailable
    }
}

/// Snapshots keyed by node and period.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSeries {
    snapshots: BTreeMap<ReferencePeriod, BTreeMap<NodeKey, MetricsSnapshot>>,
    compared: BTreeSet<ReferencePeriod>,
}

impl SnapshotSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a node's snapshot for a period, replacing any earlier one.
    pub fn insert(&mut self, node: NodeKey, period: ReferencePeriod, snapshot: MetricsSnapshot) {
        self.snapshots
            .entry(period)
            .or_default()
            .insert(node, snapshot);
        self.compared.remove(&period);
    }

    /// Stores every snapshot a period report carries.
    pub fn insert_report(&mut self, report: &PeriodReport) {
        let period = report.period;
        self.insert(NodeKey::Workforce, period, report.workforce.clone());
        for team in report.teams.values() {
            self.insert(NodeKey::Team(team.name.clone()), period, team.metrics.clone());
            for sub_team in team.sub_teams.values() {
                self.insert(
                    NodeKey::SubTeam {
                        team: team.name.clone(),
                        name: sub_team.name.clone(),
                    },
                    period,
                    sub_team.metrics.clone(),
                );
            }
        }
        for node in report.hierarchy.iter() {
            if let Some(metrics) = &node.metrics {
                self.insert(NodeKey::Manager(node.employee_id.clone()), period, metrics.clone());
            }
        }
    }

    /// Returns a period's lifecycle state.
    pub fn state(&self, period: &ReferencePeriod) -> PeriodState {
        if self.compared.contains(period) {
            PeriodState::Compared
        } else if self.snapshots.contains_key(period) {
            PeriodState::Built
        } else {
            PeriodState::Unbuilt
        }
    }

    /// Returns a stored snapshot.
    pub fn get(&self, node: &NodeKey, period: &ReferencePeriod) -> Option<&MetricsSnapshot> {
        self.snapshots.get(period).and_then(|nodes| nodes.get(node))
    }

    /// Returns the periods with stored snapshots, oldest first.
    pub fn periods(&self) -> impl Iterator<Item = &ReferencePeriod> {
        self.snapshots.keys()
    }

    /// Compares one node across two periods.
    ///
    /// Unavailable when either snapshot is missing.
    pub fn compare(
        &self,
        node: &NodeKey,
        prior_period: &ReferencePeriod,
        period: &ReferencePeriod,
    ) -> Comparison {
        match self.get(node, period) {
            Some(current) => compare_optional(self.get(node, prior_period), current),
            None => Comparison::Unavailable,
        }
    }

    /// Builds the delta table between two built periods and marks the later
    /// one as compared.
    ///
    /// Returns `None` when either period is unbuilt.
    pub fn deltas(
        &mut self,
        prior_period: &ReferencePeriod,
        period: &ReferencePeriod,
    ) -> Option<DeltaTable> {
        let prior_nodes = self.snapshots.get(prior_period)?;
        let current_nodes = self.snapshots.get(period)?;

        let mut rows = Vec::new();
        let mut unavailable = Vec::new();
        for (node, current) in current_nodes {
            match prior_nodes.get(node) {
                Some(prior) => rows.extend(compare(prior, current).deltas.into_iter().map(
                    |delta| DeltaRow {
                        node: node.clone(),
                        delta,
                    },
                )),
                None => unavailable.push(node.clone()),
            }
        }
        rows.sort_by(|a, b| (&a.node, a.delta.metric).cmp(&(&b.node, b.delta.metric)));

        self.compared.insert(*period);
        Some(DeltaTable {
            prior: *prior_period,
            current: *period,
            rows,
            unavailable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot(active: usize, absence_rate: &str) -> MetricsSnapshot {
        MetricsSnapshot {
            total_members: active,
            active_members: active,
            absence_rate: dec(absence_rate),
            ..MetricsSnapshot::default()
        }
    }

    fn month(m: u32) -> ReferencePeriod {
        ReferencePeriod::month_end(2025, m).unwrap()
    }

    #[test]
    fn test_compare_absolute_and_percent() {
        let delta = compare(&snapshot(40, "0.02"), &snapshot(50, "0.03"));
        let active = delta.get(MetricKind::ActiveMembers).unwrap();
        assert_eq!(active.absolute, dec("10"));
        assert_eq!(active.percent, PercentChange::Value(dec("25")));

        let absence = delta.get(MetricKind::AbsenceRate).unwrap();
        assert_eq!(absence.absolute, dec("0.01"));
        assert_eq!(absence.percent, PercentChange::Value(dec("50")));
    }

    #[test]
    fn test_percent_undefined_when_prior_is_zero() {
        let delta = compare(&snapshot(0, "0"), &snapshot(5, "0.1"));
        assert_eq!(
            delta.get(MetricKind::ActiveMembers).unwrap().percent,
            PercentChange::Undefined
        );
    }

    #[test]
    fn test_delta_symmetry() {
        let a = snapshot(40, "0.02");
        let b = snapshot(55, "0.035");
        let forward = compare(&a, &b);
        let backward = compare(&b, &a);
        for metric in MetricKind::ALL {
            assert_eq!(
                forward.get(metric).unwrap().absolute,
                -backward.get(metric).unwrap().absolute
            );
        }
    }

    #[test]
    fn test_compare_optional_never_fabricates_zero() {
        assert_eq!(
            compare_optional(None, &snapshot(10, "0")),
            Comparison::Unavailable
        );
        assert!(compare_optional(Some(&snapshot(5, "0")), &snapshot(10, "0"))
            .delta()
            .is_some());
    }

    #[test]
    fn test_series_lifecycle() {
        let mut series = SnapshotSeries::new();
        assert_eq!(series.state(&month(1)), PeriodState::Unbuilt);

        series.insert(NodeKey::Workforce, month(1), snapshot(40, "0.02"));
        series.insert(NodeKey::Workforce, month(2), snapshot(50, "0.03"));
        assert_eq!(series.state(&month(2)), PeriodState::Built);

        let table = series.deltas(&month(1), &month(2)).unwrap();
        assert_eq!(series.state(&month(2)), PeriodState::Compared);
        assert_eq!(series.state(&month(1)), PeriodState::Built);
        assert_eq!(
            table.get(&NodeKey::Workforce, MetricKind::ActiveMembers).unwrap().absolute,
            dec("10")
        );
    }

    #[test]
    fn test_deltas_need_both_periods() {
        let mut series = SnapshotSeries::new();
        series.insert(NodeKey::Workforce, month(2), snapshot(50, "0"));
        assert!(series.deltas(&month(1), &month(2)).is_none());
        assert_eq!(series.state(&month(2)), PeriodState::Built);
    }

    #[test]
    fn test_new_node_is_unavailable_not_zero() {
        let mut series = SnapshotSeries::new();
        let paint = NodeKey::Team("PAINT".to_string());
        series.insert(NodeKey::Workforce, month(1), snapshot(40, "0"));
        series.insert(NodeKey::Workforce, month(2), snapshot(45, "0"));
        series.insert(paint.clone(), month(2), snapshot(5, "0"));

        let table = series.deltas(&month(1), &month(2)).unwrap();
        assert_eq!(table.unavailable(), &[paint.clone()]);
        assert!(table.get(&paint, MetricKind::ActiveMembers).is_none());
        assert_eq!(table.comparison(&paint), Comparison::Unavailable);
        assert_eq!(
            series.compare(&paint, &month(1), &month(2)),
            Comparison::Unavailable
        );
    }

    #[test]
    fn test_rows_ordered_by_node_then_metric() {
        let mut series = SnapshotSeries::new();
        for m in [1, 2] {
            series.insert(NodeKey::Manager("M9".to_string()), month(m), snapshot(3, "0"));
            series.insert(NodeKey::Workforce, month(m), snapshot(30, "0"));
        }
        let table = series.deltas(&month(1), &month(2)).unwrap();
        let first = table.rows().next().unwrap();
        assert_eq!(first.node, NodeKey::Workforce);
        assert_eq!(first.delta.metric, MetricKind::ALL[0]);
        assert_eq!(table.rows().count(), 2 * MetricKind::ALL.len());
    }

    #[test]
    fn test_delta_table_serializes() {
        let mut series = SnapshotSeries::new();
        series.insert(NodeKey::Workforce, month(1), snapshot(40, "0.02"));
        series.insert(NodeKey::Workforce, month(2), snapshot(50, "0.03"));
        let table = series.deltas(&month(1), &month(2)).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"workforce\""));
    }
}
