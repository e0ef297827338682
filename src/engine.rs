//! Period orchestration.
//!
//! [`WorkforceEngine`] wires the calculation modules together: for one
//! reference period it narrows the cumulative extract to the members
//! relevant to that period, classifies teams, tallies attendance, aggregates
//! team, sub-team and workforce snapshots, builds the management hierarchy
//! and collects every data defect into a [`PeriodReport`]. Multi-period builds run periods in parallel and compute
//! deltas once every period has joined.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rayon::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculation::{
    AttendanceLedger, DeltaTable, HierarchyBuilder, MetricsAggregator, PeriodState,
    SnapshotSeries, TeamAssignment, TeamClassifier, is_active, record_defect, relevant_to,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, DataDefect, DefectKind, EmployeeRecord, PeriodOutcome, PeriodReport,
    ReferencePeriod, SubTeam, TeamNode,
};

/// The source collections for one period.
///
/// `None` means the collection was not supplied at all, which differs from
/// an empty collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodInput<'a> {
    /// The cumulative employee extract.
    pub employees: Option<&'a [EmployeeRecord]>,
    /// Attendance rows; only rows inside the period window are used.
    pub attendance: Option<&'a [AttendanceRecord]>,
}

impl<'a> PeriodInput<'a> {
    /// Creates an input with both collections present.
    pub fn new(employees: &'a [EmployeeRecord], attendance: &'a [AttendanceRecord]) -> Self {
        Self {
            employees: Some(employees),
            attendance: Some(attendance),
        }
    }

    /// Creates an input with neither collection present.
    pub fn missing() -> Self {
        Self::default()
    }
}

/// One monthly extract and the period it describes.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyExtract<'a> {
    /// The month, normally built with [`ReferencePeriod::month_end`].
    pub period: ReferencePeriod,
    /// That month's collections.
    pub input: PeriodInput<'a>,
}

/// The result of a multi-period build.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    /// One outcome per requested period, oldest first.
    pub outcomes: Vec<PeriodOutcome>,
    /// Every snapshot of every built period.
    pub series: SnapshotSeries,
    /// Deltas between each built period and its built predecessor.
    pub deltas: Vec<DeltaTable>,
}

impl Timeline {
    /// Returns the report for a built period.
    pub fn report(&self, period: &ReferencePeriod) -> Option<&PeriodReport> {
        self.outcomes
            .iter()
            .find(|o| o.period() == *period)
            .and_then(PeriodOutcome::report)
    }

    /// Returns the deltas ending at `period`, if its predecessor was built.
    pub fn deltas_into(&self, period: &ReferencePeriod) -> Option<&DeltaTable> {
        self.deltas.iter().find(|table| table.current == *period)
    }

    /// Iterates over built reports, oldest first.
    pub fn reports(&self) -> impl Iterator<Item = &PeriodReport> {
        self.outcomes.iter().filter_map(PeriodOutcome::report)
    }
}

/// Builds period reports from extracts.
///
/// # Example
///
/// ```no_run
/// use workforce_engine::config::ConfigLoader;
/// use workforce_engine::engine::{PeriodInput, WorkforceEngine};
/// use workforce_engine::models::ReferencePeriod;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let engine = WorkforceEngine::new(loader.into_config());
///
/// let outcome = engine
///     .build_period(PeriodInput::new(&[], &[]), ReferencePeriod::month_end(2025, 1).unwrap())
///     .unwrap();
/// assert!(outcome.is_built());
/// ```
#[derive(Debug, Clone)]
pub struct WorkforceEngine {
    config: EngineConfig,
    classifier: TeamClassifier,
    aggregator: MetricsAggregator,
}

impl WorkforceEngine {
    /// Creates an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Self {
        let classifier = TeamClassifier::from_config(&config);
        let aggregator = MetricsAggregator::from_settings(config.settings());
        Self {
            config,
            classifier,
            aggregator,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the team classifier.
    pub fn classifier(&self) -> &TeamClassifier {
        &self.classifier
    }

    /// Builds one period.
    ///
    /// Returns [`PeriodOutcome::NoData`] when both collections are absent and
    /// [`EngineError::MissingCollection`] when exactly one is.
    pub fn build_period(
        &self,
        input: PeriodInput<'_>,
        period: ReferencePeriod,
    ) -> EngineResult<PeriodOutcome> {
        let (employees, attendance) = match (input.employees, input.attendance) {
            (Some(employees), Some(attendance)) => (employees, attendance),
            (None, None) => {
                info!(period = %period, "No source data for period");
                return Ok(PeriodOutcome::NoData { period });
            }
            (None, Some(_)) => return Err(missing("employees", &period)),
            (Some(_), None) => return Err(missing("attendance", &period)),
        };

        let start_time = Instant::now();
        let report_id = Uuid::new_v4();
        info!(
            report_id = %report_id,
            period = %period,
            employees = employees.len(),
            attendance_rows = attendance.len(),
            "Building period"
        );

        let settings = self.config.settings();
        let (unique, mut defects) = unique_records(employees);
        let records: Vec<&EmployeeRecord> = unique
            .iter()
            .copied()
            .filter(|r| relevant_to(r, &period))
            .collect();
        defects.extend(records.iter().filter_map(|r| record_defect(r)));

        let (assignments, coverage, unmapped) =
            self.classifier.classify_all(records.iter().copied());
        defects.extend(unmapped);

        let ledger =
            AttendanceLedger::for_period(attendance, &period, &settings.unauthorized_reasons);
        defects.extend(ledger.defects().iter().cloned());
        let known: HashSet<&str> = unique.iter().map(|r| r.id.as_str()).collect();
        defects.extend(ledger.orphan_defects(&known));

        let workforce = self.aggregator.aggregate(&records, &ledger, &period);
        let high_risk = self.aggregator.high_risk_members(&records, &ledger, &period);

        let teams: BTreeMap<String, TeamNode> = self
            .classifier
            .team_names()
            .par_iter()
            .map(|name| self.build_team(name, &records, &assignments, &ledger, &period))
            .map(|team| (team.name.clone(), team))
            .collect();

        let active: Vec<&EmployeeRecord> = records
            .iter()
            .copied()
            .filter(|r| is_active(r, period.reference_date()))
            .collect();
        let hierarchy = HierarchyBuilder::new(
            &self.classifier,
            &self.aggregator,
            settings.hierarchy_scope,
        )
        .build(&active, employees, &ledger, &period);
        defects.extend(hierarchy.defects);

        let mut defect_counts: BTreeMap<DefectKind, usize> = BTreeMap::new();
        for defect in &defects {
            *defect_counts.entry(defect.kind).or_default() += 1;
        }

        let duration = start_time.elapsed();
        info!(
            report_id = %report_id,
            period = %period,
            active_members = workforce.active_members(),
            absence_rate = %workforce.absence_rate(),
            teams = teams.len(),
            defects = defects.len(),
            duration_us = duration.as_micros(),
            "Period built"
        );

        Ok(PeriodOutcome::Built(Box::new(PeriodReport {
            report_id,
            generated_at: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            period,
            workforce,
            teams,
            hierarchy: hierarchy.forest,
            high_risk,
            coverage,
            defects,
            defect_counts,
            duration_us: duration.as_micros() as u64,
        })))
    }

    fn build_team(
        &self,
        name: &str,
        records: &[&EmployeeRecord],
        assignments: &[TeamAssignment],
        ledger: &AttendanceLedger,
        period: &ReferencePeriod,
    ) -> TeamNode {
        let mut members: Vec<&EmployeeRecord> = Vec::new();
        let mut matched_labels = BTreeSet::new();
        let mut match_kinds = BTreeSet::new();
        let mut groups: BTreeMap<&str, Vec<&EmployeeRecord>> = BTreeMap::new();

        for (&record, assignment) in records.iter().zip(assignments) {
            if assignment.team != name {
                continue;
            }
            members.push(record);
            if !assignment.label.is_empty() {
                matched_labels.insert(assignment.label.clone());
            }
            match_kinds.insert(assignment.match_kind);
            groups.entry(&assignment.sub_team).or_default().push(record);
        }

        let sub_teams = groups
            .into_iter()
            .map(|(sub_team, group)| {
                let snapshot = SubTeam {
                    name: sub_team.to_string(),
                    members: group.iter().map(|r| r.id.clone()).collect(),
                    metrics: self.aggregator.aggregate(&group, ledger, period),
                };
                (sub_team.to_string(), snapshot)
            })
            .collect();

        TeamNode {
            name: name.to_string(),
            matched_labels,
            match_kinds,
            members: members.iter().map(|r| r.id.clone()).collect(),
            sub_teams,
            metrics: self.aggregator.aggregate(&members, ledger, period),
        }
    }

    /// Builds every monthly extract in parallel and computes month-over-month
    /// deltas.
    pub fn build_months(&self, extracts: &[MonthlyExtract<'_>]) -> EngineResult<Timeline> {
        let outcomes = extracts
            .par_iter()
            .map(|extract| self.build_period(extract.input, extract.period))
            .collect::<EngineResult<Vec<_>>>()?;
        assemble(outcomes)
    }

    /// Builds `count` adjacent weeks ending on `end` from one extract.
    pub fn build_trailing_weeks(
        &self,
        input: PeriodInput<'_>,
        end: NaiveDate,
        count: usize,
    ) -> EngineResult<Timeline> {
        let periods = ReferencePeriod::trailing_weeks(end, count)?;
        self.build_periods(input, &periods)
    }

    /// Builds one daily period per date from one extract.
    pub fn build_days(&self, input: PeriodInput<'_>, dates: &[NaiveDate]) -> EngineResult<Timeline> {
        let periods = dates
            .iter()
            .map(|&date| ReferencePeriod::day(date))
            .collect::<EngineResult<Vec<_>>>()?;
        self.build_periods(input, &periods)
    }

    fn build_periods(
        &self,
        input: PeriodInput<'_>,
        periods: &[ReferencePeriod],
    ) -> EngineResult<Timeline> {
        let outcomes = periods
            .par_iter()
            .map(|&period| self.build_period(input, period))
            .collect::<EngineResult<Vec<_>>>()?;
        assemble(outcomes)
    }
}

fn missing(collection: &str, period: &ReferencePeriod) -> EngineError {
    EngineError::MissingCollection {
        collection: collection.to_string(),
        period_end: period.end(),
    }
}

/// Drops repeated identifiers, keeping the first record.
fn unique_records(employees: &[EmployeeRecord]) -> (Vec<&EmployeeRecord>, Vec<DataDefect>) {
    let mut seen = HashSet::with_capacity(employees.len());
    let mut records = Vec::with_capacity(employees.len());
    let mut defects = Vec::new();
    for record in employees {
        if seen.insert(record.id.as_str()) {
            records.push(record);
        } else {
            defects.push(DataDefect::new(
                Some(&record.id),
                DefectKind::DuplicateEmployee,
                "duplicate employee identifier; first record kept",
            ));
        }
    }
    (records, defects)
}

/// Orders outcomes and computes deltas against each period's predecessor.
fn assemble(mut outcomes: Vec<PeriodOutcome>) -> EngineResult<Timeline> {
    outcomes.sort_by_key(PeriodOutcome::period);

    let mut series = SnapshotSeries::new();
    for report in outcomes.iter().filter_map(PeriodOutcome::report) {
        series.insert_report(report);
    }

    let mut deltas = Vec::new();
    for report in outcomes.iter().filter_map(PeriodOutcome::report) {
        let prior = report.period.previous()?;
        if series.state(&prior) == PeriodState::Unbuilt {
            debug!(period = %report.period, prior = %prior, "No built predecessor; deltas unavailable");
            continue;
        }
        if let Some(table) = series.deltas(&prior, &report.period) {
            deltas.push(table);
        }
    }

    Ok(Timeline {
        outcomes,
        series,
        deltas,
    })
}
