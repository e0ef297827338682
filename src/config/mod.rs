//! Configuration loading and management for the Workforce Engine.
//!
//! This module loads the team classification table and the engine
//! thresholds from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use workforce_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded {} team rules", config.teams().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AggregationScope, EngineConfig, EngineSettings, RiskThresholds, TeamRule, TeamsConfig,
};
