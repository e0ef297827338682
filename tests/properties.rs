//! Property tests for membership, classification coverage, aggregation,
//! hierarchy construction and deltas.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use workforce_engine::calculation::{
    AttendanceLedger, MemberStatus, MetricsAggregator, compare, member_status,
};
use workforce_engine::config::{ConfigLoader, RiskThresholds};
use workforce_engine::engine::{PeriodInput, WorkforceEngine};
use workforce_engine::models::{
    AttendanceRecord, EmployeeRecord, MetricKind, MetricsSnapshot, ReferencePeriod, RoleType,
};

const LABELS: &[&str] = &[
    "FINAL ASSEMBLY",
    "PAINT SHOP",
    "WELD REPAIR",
    "INSPECTION",
    "WAREHOUSE",
    "CANTEEN",
    "",
];

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn january() -> ReferencePeriod {
    ReferencePeriod::month_end(2025, 1).unwrap()
}

fn offset(days: i64) -> NaiveDate {
    base() + Duration::days(days)
}

fn role(index: u8) -> RoleType {
    match index % 5 {
        0 => RoleType::Direct,
        1 => RoleType::Indirect,
        2 => RoleType::Staff,
        3 => RoleType::Manager,
        _ => RoleType::Contractor,
    }
}

prop_compose! {
    fn arb_employee(id: usize, population: usize)(
        entrance in prop::option::weighted(0.95, -400i64..40),
        stop in prop::option::of(-60i64..60),
        label in 0..LABELS.len(),
        manager in prop::option::of(0..population),
        role_index in any::<u8>(),
        pregnant in prop::bool::weighted(0.1),
    ) -> EmployeeRecord {
        EmployeeRecord {
            id: format!("E{:03}", id),
            name: format!("Employee {}", id),
            positions: [
                "PRODUCTION".to_string(),
                String::new(),
                LABELS[label].to_string(),
                String::new(),
            ],
            manager_id: manager.map(|m| format!("E{:03}", m)).unwrap_or_default(),
            entrance_date: entrance.map(offset),
            stop_date: stop.map(offset),
            role_type: role(role_index),
            pregnant,
            incentive: Decimal::new(role_index as i64 * 25, 1),
        }
    }
}

fn arb_extract(max: usize) -> impl Strategy<Value = Vec<EmployeeRecord>> {
    (1..max).prop_flat_map(|population| {
        (0..population)
            .map(|id| arb_employee(id, population))
            .collect::<Vec<_>>()
    })
}

fn arb_attendance(population: usize) -> impl Strategy<Value = Vec<AttendanceRecord>> {
    prop::collection::vec(
        (0..population.max(1), 0i64..31, any::<bool>(), 0u8..4),
        0..200,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(id, day, absent, reason)| AttendanceRecord {
                employee_id: format!("E{:03}", id),
                date: offset(day),
                absent,
                reason: ["SICK", "AWOL", "LEAVE", ""][reason as usize].to_string(),
                unauthorized: None,
            })
            .collect()
    })
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

fn snapshot_of(records: &[EmployeeRecord], rows: &[AttendanceRecord]) -> MetricsSnapshot {
    let ledger = AttendanceLedger::for_period(rows, &january(), &["AWOL".to_string()]);
    let members: Vec<&EmployeeRecord> = records.iter().collect();
    aggregator().aggregate(&members, &ledger, &january())
}

fn create_engine() -> WorkforceEngine {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    WorkforceEngine::new(config.into_config())
}

proptest! {
    #[test]
    fn active_iff_entered_and_not_stopped(
        employee in arb_employee(0, 1),
        reference in -60i64..60,
    ) {
        let reference = offset(reference);
        let status = member_status(&employee, reference);
        let valid = match (employee.entrance_date, employee.stop_date) {
            (Some(entrance), Some(stop)) => stop >= entrance,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let expected_active = valid
            && employee.entrance_date.is_some_and(|e| e <= reference)
            && employee.stop_date.is_none_or(|s| s > reference);

        prop_assert_eq!(status == MemberStatus::Active, expected_active);
        prop_assert_eq!(status == MemberStatus::Invalid, !valid);
    }

    #[test]
    fn team_active_counts_cover_the_workforce(records in arb_extract(40)) {
        let outcome = create_engine()
            .build_period(PeriodInput::new(&records, &[]), january())
            .unwrap();
        let report = outcome.report().unwrap();

        let team_active: usize = report.teams.values().map(|t| t.metrics.active_members()).sum();
        let team_members: usize = report.teams.values().map(|t| t.members.len()).sum();
        prop_assert_eq!(team_active, report.workforce.active_members());
        prop_assert_eq!(team_members, report.coverage.total_records);
        prop_assert_eq!(
            report.coverage.mapped_records + report.coverage.unmapped_ids.len(),
            report.coverage.total_records
        );
    }

    #[test]
    fn aggregation_is_idempotent(
        (records, rows) in arb_extract(30).prop_flat_map(|records| {
            let population = records.len();
            (Just(records), arb_attendance(population))
        })
    ) {
        let first = snapshot_of(&records, &rows);
        let second = snapshot_of(&records, &rows);
        prop_assert_eq!(&first, &second);

        for kind in MetricKind::ALL.iter().filter(|k| k.is_rate()) {
            let value = first.metric(*kind);
            prop_assert!(value >= Decimal::ZERO && value <= Decimal::ONE);
        }
    }

    #[test]
    fn hierarchy_is_a_forest(records in arb_extract(40)) {
        let outcome = create_engine()
            .build_period(PeriodInput::new(&records, &[]), january())
            .unwrap();
        let forest = &outcome.report().unwrap().hierarchy;

        for node in forest.iter() {
            let chain = forest.ancestors(&node.employee_id);
            prop_assert!(chain.len() < forest.len());
            let top = chain.last().copied().unwrap_or(node);
            prop_assert!(top.is_root());
            prop_assert_eq!(node.depth, chain.len());
        }

        let reachable: usize = forest
            .roots()
            .map(|root| 1 + forest.descendants(&root.employee_id).len())
            .sum();
        prop_assert_eq!(reachable, forest.len());
    }

    #[test]
    fn deltas_are_antisymmetric(
        (left, right, rows) in arb_extract(20).prop_flat_map(|left| {
            let population = left.len();
            (Just(left), arb_extract(20), arb_attendance(population))
        })
    ) {
        let a = snapshot_of(&left, &rows);
        let b = snapshot_of(&right, &rows);
        let forward = compare(&a, &b);
        let backward = compare(&b, &a);
        for kind in MetricKind::ALL {
            prop_assert_eq!(
                forward.get(kind).unwrap().absolute,
                -backward.get(kind).unwrap().absolute
            );
        }
    }
}
