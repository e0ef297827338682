//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings, TeamRule, TeamsConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml   # Catch-all team, thresholds, unauthorized reasons
/// └── teams.yaml    # Ordered team classification table
/// ```
///
/// # Example
///
/// ```no_run
/// use workforce_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Catch-all team: {}", loader.settings().catch_all_team);
/// for team in loader.teams() {
///     println!("{}: {} labels", team.name, team.labels.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Either file is missing (`ConfigNotFound`)
    /// - Either file contains invalid YAML (`ConfigParseError`)
    /// - The parsed configuration is unusable (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&engine_path)?;

        let teams_path = path.join("teams.yaml");
        let teams = Self::load_yaml::<TeamsConfig>(&teams_path)?;

        let config = EngineConfig::new(settings, teams.teams)?;
        tracing::debug!(
            path = %path.display(),
            teams = config.teams().len(),
            "Loaded engine configuration"
        );
        Ok(Self { config })
    }

    /// Builds configuration from in-memory YAML documents.
    ///
    /// ```
    /// use workforce_engine::config::ConfigLoader;
    ///
    /// let engine = r#"
    /// catch_all_team: OTHER
    /// unauthorized_reasons: [AWOL]
    /// high_risk:
    ///   min_attendance_rate: 0.90
    ///   max_unauthorized_rate: 0.05
    /// short_tenure_days: 90
    /// "#;
    /// let teams = r#"
    /// teams:
    ///   - name: ASSEMBLY
    ///     labels: [ASSEMBLY LINE 1]
    ///     keywords: [ASSEMBLY]
    /// "#;
    /// let loader = ConfigLoader::from_yaml_strs(engine, teams).unwrap();
    /// assert_eq!(loader.teams()[0].name, "ASSEMBLY");
    /// ```
    pub fn from_yaml_strs(engine_yaml: &str, teams_yaml: &str) -> EngineResult<Self> {
        let settings = Self::parse_yaml::<EngineSettings>(engine_yaml, "engine.yaml")?;
        let teams = Self::parse_yaml::<TeamsConfig>(teams_yaml, "teams.yaml")?;
        let config = EngineConfig::new(settings, teams.teams)?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_yaml(&content, &path_str)
    }

    fn parse_yaml<T: serde::de::DeserializeOwned>(content: &str, path: &str) -> EngineResult<T> {
        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Returns the ordered team classification table.
    pub fn teams(&self) -> &[TeamRule] {
        self.config.teams()
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
