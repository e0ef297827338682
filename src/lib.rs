//! Workforce Engine for monthly HR analytics
//!
//! This crate turns cumulative employee extracts and attendance rows into
//! point-in-time workforce snapshots: active headcount, absence and
//! resignation rates, team and sub-team roll-ups, a management hierarchy
//! with per-manager KPIs, and period-over-period deltas.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod query;
