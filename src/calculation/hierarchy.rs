//! Management hierarchy construction.
//!
//! Builds a [`HierarchyForest`] from the records active at a period's
//! reference date. Broken manager references never abort the build: the
//! affected employee becomes a root and a structural [`DataDefect`] is
//! recorded.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::AggregationScope;
use crate::models::{
    DataDefect, DefectKind, EmployeeRecord, HierarchyForest, HierarchyNode, MetricsSnapshot,
    ReferencePeriod,
};

use super::attendance::AttendanceLedger;
use super::classifier::TeamClassifier;
use super::membership::{MemberStatus, member_status};
use super::metrics::MetricsAggregator;

/// The result of a hierarchy build.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuild {
    /// The linked forest.
    pub forest: HierarchyForest,
    /// Structural and duplicate defects found while linking.
    pub defects: Vec<DataDefect>,
}

/// Builds management forests.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyBuilder<'a> {
    classifier: &'a TeamClassifier,
    aggregator: &'a MetricsAggregator,
    scope: AggregationScope,
}

impl<'a> HierarchyBuilder<'a> {
    /// Creates a builder.
    pub fn new(
        classifier: &'a TeamClassifier,
        aggregator: &'a MetricsAggregator,
        scope: AggregationScope,
    ) -> Self {
        Self {
            classifier,
            aggregator,
            scope,
        }
    }

    /// Builds the forest.
    ///
    /// `active` holds the records placed in the forest, normally those
    /// active at the period's reference date. `all_records` is the full
    /// extract; a manager found there who departed by the reference date is
    /// reported as departed, any other unplaced manager as unresolved.
    pub fn build(
        &self,
        active: &[&EmployeeRecord],
        all_records: &[EmployeeRecord],
        ledger: &AttendanceLedger,
        period: &ReferencePeriod,
    ) -> HierarchyBuild {
        let mut defects = Vec::new();

        // Index pass: first occurrence of an identifier wins.
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(active.len());
        let mut records: Vec<&EmployeeRecord> = Vec::with_capacity(active.len());
        for &record in active {
            if index.contains_key(record.id.as_str()) {
                defects.push(DataDefect::new(
                    Some(&record.id),
                    DefectKind::DuplicateEmployee,
                    "duplicate employee identifier; first record kept",
                ));
                continue;
            }
            index.insert(record.id.as_str(), records.len());
            records.push(record);
        }

        let mut known: HashMap<&str, MemberStatus> = HashMap::with_capacity(all_records.len());
        for record in all_records {
            known
                .entry(record.id.as_str())
                .or_insert_with(|| member_status(record, period.reference_date()));
        }
        let mut parents = attach(&records, &index, &known, &mut defects);
        break_cycles(&records, &mut parents, &mut defects);

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
        for (slot, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent {
                children[parent].push(slot);
            }
        }
        let depths = assign_depths(&parents, &children);

        let snapshots: Vec<Option<MetricsSnapshot>> = (0..records.len())
            .into_par_iter()
            .map(|slot| {
                if children[slot].is_empty() {
                    return None;
                }
                let members: Vec<&EmployeeRecord> = match self.scope {
                    AggregationScope::DirectReports => {
                        children[slot].iter().map(|&c| records[c]).collect()
                    }
                    AggregationScope::Subtree => subtree(slot, &children)
                        .into_iter()
                        .map(|c| records[c])
                        .collect(),
                };
                Some(self.aggregator.aggregate(&members, ledger, period))
            })
            .collect();

        let nodes: Vec<HierarchyNode> = records
            .iter()
            .zip(snapshots)
            .enumerate()
            .map(|(slot, (record, metrics))| {
                let assignment = self.classifier.classify(record);
                HierarchyNode {
                    employee_id: record.id.clone(),
                    name: record.name.clone(),
                    team: assignment.team,
                    position: assignment.label,
                    role_type: record.role_type,
                    depth: depths[slot],
                    parent_id: parents[slot].map(|p| records[p].id.clone()),
                    child_ids: children[slot]
                        .iter()
                        .map(|&c| records[c].id.clone())
                        .collect(),
                    metrics,
                }
            })
            .collect();

        let forest = HierarchyForest::from_nodes(nodes);
        debug!(
            period = %period,
            nodes = forest.len(),
            roots = forest.roots().count(),
            max_depth = forest.max_depth(),
            defects = defects.len(),
            "Hierarchy built"
        );

        HierarchyBuild { forest, defects }
    }
}

/// Resolves each record's manager reference to an arena slot.
fn attach(
    records: &[&EmployeeRecord],
    index: &HashMap<&str, usize>,
    known: &HashMap<&str, MemberStatus>,
    defects: &mut Vec<DataDefect>,
) -> Vec<Option<usize>> {
    records
        .iter()
        .map(|record| {
            let manager = record.manager_ref()?;
            let kind = if manager == record.id {
                DefectKind::SelfManaged
            } else if let Some(&parent) = index.get(manager) {
                return Some(parent);
            } else if known.get(manager) == Some(&MemberStatus::Departed) {
                DefectKind::DepartedManager
            } else {
                DefectKind::UnresolvedManager
            };
            warn!(
                employee_id = %record.id,
                manager_id = %manager,
                defect = %kind,
                "Manager reference not usable; employee promoted to root"
            );
            defects.push(DataDefect::new(
                Some(&record.id),
                kind,
                format!("manager '{}' not usable; treated as root", manager),
            ));
            None
        })
        .collect()
}

/// Cuts every manager cycle at the reference that closes it.
///
/// Each node is visited once across all walks, so the pass is linear.
fn break_cycles(
    records: &[&EmployeeRecord],
    parents: &mut [Option<usize>],
    defects: &mut Vec<DataDefect>,
) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; records.len()];
    for start in 0..records.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        let mut path = Vec::new();
        let mut current = start;
        loop {
            match marks[current] {
                Mark::Done => break,
                Mark::OnPath => {
                    // The last node walked points back into the path.
                    if let Some(&closer) = path.last() {
                        let record: &EmployeeRecord = records[closer];
                        warn!(
                            employee_id = %record.id,
                            manager_id = %records[current].id,
                            "Manager cycle detected; reference dropped"
                        );
                        defects.push(DataDefect::new(
                            Some(&record.id),
                            DefectKind::ManagerCycle,
                            format!(
                                "reference to '{}' closes a manager cycle; treated as root",
                                records[current].id
                            ),
                        ));
                        parents[closer] = None;
                    }
                    break;
                }
                Mark::Unvisited => {
                    marks[current] = Mark::OnPath;
                    path.push(current);
                    match parents[current] {
                        Some(parent) => current = parent,
                        None => break,
                    }
                }
            }
        }
        for slot in path {
            marks[slot] = Mark::Done;
        }
    }
}

fn assign_depths(parents: &[Option<usize>], children: &[Vec<usize>]) -> Vec<usize> {
    let mut depths = vec![0; parents.len()];
    let mut stack: Vec<usize> = (0..parents.len()).filter(|&s| parents[s].is_none()).collect();
    while let Some(slot) = stack.pop() {
        for &child in &children[slot] {
            depths[child] = depths[slot] + 1;
            stack.push(child);
        }
    }
    depths
}

fn subtree(slot: usize, children: &[Vec<usize>]) -> Vec<usize> {
    let mut found = Vec::new();
    let mut stack: Vec<usize> = children[slot].iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        found.push(node);
        stack.extend(children[node].iter().rev().copied());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RiskThresholds, TeamRule};
    use crate::models::{AttendanceRecord, RoleType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> ReferencePeriod {
        ReferencePeriod::month_end(2025, 1).unwrap()
    }

    fn create_record(id: &str, manager: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            name: id.to_string(),
            positions: [
                String::new(),
                String::new(),
                "FINAL ASSEMBLY".to_string(),
                String::new(),
            ],
            manager_id: manager.to_string(),
            entrance_date: Some(date(2024, 1, 1)),
            stop_date: None,
            role_type: RoleType::Direct,
            pregnant: false,
            incentive: Decimal::ZERO,
        }
    }

    fn classifier() -> TeamClassifier {
        TeamClassifier::new(
            &[TeamRule {
                name: "ASSEMBLY".to_string(),
                labels: vec!["FINAL ASSEMBLY".to_string()],
                keywords: vec![],
            }],
            "OTHER",
        )
    }

    fn aggregator() -> MetricsAggregator {
        MetricsAggregator::new(
            RiskThresholds {
                min_attendance_rate: Decimal::new(90, 2),
                max_unauthorized_rate: Decimal::new(5, 2),
            },
            90,
        )
    }

    fn build_with(
        records: &[EmployeeRecord],
        all: &[EmployeeRecord],
        rows: &[AttendanceRecord],
        scope: AggregationScope,
    ) -> HierarchyBuild {
        let classifier = classifier();
        let aggregator = aggregator();
        let ledger = AttendanceLedger::for_period(rows, &january(), &[]);
        let active: Vec<&EmployeeRecord> = records.iter().collect();
        HierarchyBuilder::new(&classifier, &aggregator, scope).build(&active, all, &ledger, &january())
    }

    fn build(records: &[EmployeeRecord]) -> HierarchyBuild {
        build_with(records, records, &[], AggregationScope::DirectReports)
    }

    fn kinds(build: &HierarchyBuild) -> Vec<DefectKind> {
        build.defects.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_links_parents_children_and_depths() {
        let records = vec![
            create_record("M1", ""),
            create_record("A", "M1"),
            create_record("B", "M1"),
            create_record("C", "A"),
        ];
        let build = build(&records);
        let forest = &build.forest;

        assert!(build.defects.is_empty());
        assert_eq!(forest.len(), 4);
        assert_eq!(forest.get("M1").unwrap().child_ids, vec!["A", "B"]);
        assert_eq!(forest.get("C").unwrap().depth, 2);
        assert_eq!(forest.get("C").unwrap().team, "ASSEMBLY");
        assert_eq!(forest.roots().count(), 1);
    }

    #[test]
    fn test_departed_manager_promotes_subordinate_to_root() {
        let mut departed = create_record("M1", "");
        departed.stop_date = Some(date(2025, 1, 10));
        let subordinate = create_record("E1", "M1");
        let all = vec![departed, subordinate.clone()];

        let build = build_with(&[subordinate], &all, &[], AggregationScope::DirectReports);
        assert!(build.forest.get("E1").unwrap().is_root());
        assert_eq!(kinds(&build), vec![DefectKind::DepartedManager]);
    }

    #[test]
    fn test_manager_not_yet_entered_is_unresolved() {
        let mut future = create_record("M1", "");
        future.entrance_date = Some(date(2025, 3, 1));
        let subordinate = create_record("E1", "M1");
        let all = vec![future, subordinate.clone()];

        let build = build_with(&[subordinate], &all, &[], AggregationScope::DirectReports);
        assert!(build.forest.get("E1").unwrap().is_root());
        assert_eq!(kinds(&build), vec![DefectKind::UnresolvedManager]);
    }

    #[test]
    fn test_invalid_manager_record_is_unresolved() {
        let mut invalid = create_record("M1", "");
        invalid.entrance_date = None;
        let subordinate = create_record("E1", "M1");
        let all = vec![invalid, subordinate.clone()];

        let build = build_with(&[subordinate], &all, &[], AggregationScope::DirectReports);
        assert_eq!(kinds(&build), vec![DefectKind::UnresolvedManager]);
    }

    #[test]
    fn test_unknown_manager_is_unresolved() {
        let build = build(&[create_record("E1", "GHOST")]);
        assert!(build.forest.get("E1").unwrap().is_root());
        assert_eq!(kinds(&build), vec![DefectKind::UnresolvedManager]);
    }

    #[test]
    fn test_self_managed_becomes_root() {
        let build = build(&[create_record("E1", "E1")]);
        assert!(build.forest.get("E1").unwrap().is_root());
        assert_eq!(kinds(&build), vec![DefectKind::SelfManaged]);
    }

    #[test]
    fn test_cycle_is_broken_at_closing_reference() {
        // A -> B -> C -> A; walking from A, C's reference closes the loop.
        let records = vec![
            create_record("A", "B"),
            create_record("B", "C"),
            create_record("C", "A"),
            create_record("D", "A"),
        ];
        let build = build(&records);
        let forest = &build.forest;

        assert_eq!(kinds(&build), vec![DefectKind::ManagerCycle]);
        assert_eq!(build.defects[0].employee_id.as_deref(), Some("C"));
        assert!(forest.get("C").unwrap().is_root());
        assert_eq!(forest.roots().count(), 1);
        assert_eq!(forest.get("A").unwrap().depth, 2);
        assert_eq!(forest.descendants("C").len(), 3);
    }

    #[test]
    fn test_two_node_cycle() {
        let records = vec![create_record("A", "B"), create_record("B", "A")];
        let build = build(&records);
        assert_eq!(kinds(&build), vec![DefectKind::ManagerCycle]);
        assert!(build.forest.get("B").unwrap().is_root());
        assert_eq!(build.forest.parent("A").unwrap().employee_id, "B");
    }

    #[test]
    fn test_duplicate_identifier_first_wins() {
        let mut second = create_record("E1", "");
        second.name = "second".to_string();
        let build = build(&[create_record("E1", ""), second]);
        assert_eq!(build.forest.len(), 1);
        assert_eq!(build.forest.get("E1").unwrap().name, "E1");
        assert_eq!(kinds(&build), vec![DefectKind::DuplicateEmployee]);
    }

    #[test]
    fn test_snapshots_only_on_managers() {
        let records = vec![
            create_record("M1", ""),
            create_record("A", "M1"),
            create_record("C", "A"),
        ];
        let build = build(&records);
        let forest = &build.forest;
        assert_eq!(forest.get("M1").unwrap().metrics.as_ref().unwrap().total_members(), 1);
        assert!(forest.get("A").unwrap().metrics.is_some());
        assert!(forest.get("C").unwrap().metrics.is_none());
    }

    #[test]
    fn test_subtree_scope_covers_every_descendant() {
        let records = vec![
            create_record("M1", ""),
            create_record("A", "M1"),
            create_record("C", "A"),
            create_record("D", "A"),
        ];
        let build = build_with(&records, &records, &[], AggregationScope::Subtree);
        let m1 = build.forest.get("M1").unwrap().metrics.clone().unwrap();
        assert_eq!(m1.total_members(), 3);
    }

    #[test]
    fn test_manager_snapshot_uses_period_attendance() {
        let records = vec![create_record("M1", ""), create_record("A", "M1")];
        let rows: Vec<AttendanceRecord> = (1..=4)
            .map(|d| AttendanceRecord {
                employee_id: "A".to_string(),
                date: date(2025, 1, d),
                absent: d == 1,
                reason: String::new(),
                unauthorized: None,
            })
            .collect();
        let build = build_with(&records, &records, &rows, AggregationScope::DirectReports);
        let metrics = build.forest.get("M1").unwrap().metrics.clone().unwrap();
        assert_eq!(metrics.absence_rate(), Decimal::new(25, 2));
    }
}
