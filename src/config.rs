//! # Mediator Configuration
//!
//! Runtime knobs for the dispatch engine, loaded from an optional file plus
//! `MEDIATOR_*` environment variables.
//!
//! ```text
//! MEDIATOR_NOTIFICATION_FAILURE_POLICY=collect_all
//! MEDIATOR_OBSERVE_CANCELLATION=true
//! MEDIATOR_RECORD_STATS=false
//! MEDIATOR_LOG_DISPATCHES=true
//! ```

use crate::error::MediatorResult;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MEDIATOR";

/// What `publish` does when a subscriber fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationFailurePolicy {
    /// Stop the fan-out at the first failing subscriber and return its error.
    #[default]
    AbortOnFirst,
    /// Run every subscriber, then report all failures together.
    CollectAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    pub notification_failure_policy: NotificationFailurePolicy,
    /// Check the cancellation token before resolution and between subscribers
    pub observe_cancellation: bool,
    pub record_stats: bool,
    /// Emit an info line per completed dispatch (failures are always logged)
    pub log_dispatches: bool,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            notification_failure_policy: NotificationFailurePolicy::AbortOnFirst,
            observe_cancellation: true,
            record_stats: true,
            log_dispatches: false,
        }
    }
}

impl MediatorConfig {
    /// Defaults overridden by `MEDIATOR_*` environment variables
    pub fn from_env() -> MediatorResult<Self> {
        Self::load(None)
    }

    /// Settings from a TOML/YAML/JSON file, without environment overrides
    pub fn from_file(path: &Path) -> MediatorResult<Self> {
        let config: MediatorConfig = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> MediatorResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading mediator configuration file");
            builder = builder.add_source(File::from(path).required(false));
        }

        let config: MediatorConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX).try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!(
            policy = ?config.notification_failure_policy,
            observe_cancellation = config.observe_cancellation,
            record_stats = config.record_stats,
            "Mediator configuration loaded"
        );

        Ok(config)
    }

    #[must_use]
    pub fn with_notification_failure_policy(mut self, policy: NotificationFailurePolicy) -> Self {
        self.notification_failure_policy = policy;
        self
    }

    #[must_use]
    pub fn with_stats(mut self, record_stats: bool) -> Self {
        self.record_stats = record_stats;
        self
    }

    #[must_use]
    pub fn with_dispatch_logging(mut self, log_dispatches: bool) -> Self {
        self.log_dispatches = log_dispatches;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MediatorConfig::default();
        assert_eq!(
            config.notification_failure_policy,
            NotificationFailurePolicy::AbortOnFirst
        );
        assert!(config.observe_cancellation);
        assert!(config.record_stats);
        assert!(!config.log_dispatches);
    }

    #[test]
    fn test_from_file_with_partial_settings() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "notification_failure_policy = \"collect_all\"").unwrap();
        writeln!(file, "log_dispatches = true").unwrap();

        let config = MediatorConfig::from_file(file.path()).unwrap();

        assert_eq!(
            config.notification_failure_policy,
            NotificationFailurePolicy::CollectAll
        );
        assert!(config.log_dispatches);
        assert!(config.record_stats);
    }

    #[test]
    fn test_collect_all_without_cancellation_is_accepted() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "notification_failure_policy = \"collect_all\"").unwrap();
        writeln!(file, "observe_cancellation = false").unwrap();

        let config = MediatorConfig::from_file(file.path()).unwrap();
        assert!(!config.observe_cancellation);
    }

    #[test]
    fn test_unknown_policy_is_a_configuration_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "notification_failure_policy = \"best_effort\"").unwrap();

        let error = MediatorConfig::from_file(file.path()).unwrap_err();
        assert_eq!(error.error_kind(), "configuration");
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("MEDIATOR_RECORD_STATS", "false");
        let config = MediatorConfig::from_env().unwrap();
        std::env::remove_var("MEDIATOR_RECORD_STATS");

        assert!(!config.record_stats);
        assert!(config.observe_cancellation);
    }

    #[test]
    fn test_builder_helpers() {
        let config = MediatorConfig::default()
            .with_notification_failure_policy(NotificationFailurePolicy::CollectAll)
            .with_stats(false)
            .with_dispatch_logging(true);

        assert_eq!(
            config.notification_failure_policy,
            NotificationFailurePolicy::CollectAll
        );
        assert!(!config.record_stats);
        assert!(config.log_dispatches);
    }
}
