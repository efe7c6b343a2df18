use std::time::Duration;

use worktrace_core::types::DbId;

/// Default period between screenshot ticks.
pub const DEFAULT_SCREENSHOT_INTERVAL_SECS: u64 = 60;

/// Default upper bound on a single external capture.
pub const DEFAULT_CAPTURE_TIMEOUT_SECS: u64 = 30;

/// Tick-period policy for a [`ScreenshotScheduler`](crate::scheduler::ScreenshotScheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Delay between the end of one tick and the start of the next.
    pub period: Duration,
}

impl SchedulerConfig {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SCREENSHOT_INTERVAL_SECS))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Agent configuration loaded from environment variables.
///
/// | Env Var                    | Required | Default |
/// |----------------------------|----------|---------|
/// | `API_BASE_URL`             | yes      | --      |
/// | `API_KEY`                  | yes      | --      |
/// | `TASK_ID`                  | no       | first assigned task |
/// | `SCREENSHOT_INTERVAL_SECS` | no       | `60`    |
/// | `CAPTURE_COMMAND`          | no       | capture disabled |
/// | `CAPTURE_SOURCE`           | no       | `$DISPLAY` / `$WAYLAND_DISPLAY` |
/// | `CAPTURE_TIMEOUT_SECS`     | no       | `30`    |
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub task_id: Option<DbId>,
    pub scheduler: SchedulerConfig,
    pub capture_command: Option<String>,
    pub capture_source: Option<String>,
    pub capture_timeout: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_base_url = non_empty("API_BASE_URL").ok_or(ConfigError::Missing("API_BASE_URL"))?;
        let api_key = non_empty("API_KEY").ok_or(ConfigError::Missing("API_KEY"))?;

        let task_id: Option<DbId> = non_empty("TASK_ID")
            .map(|v| parse("TASK_ID", &v))
            .transpose()?;

        let interval_secs: u64 = match non_empty("SCREENSHOT_INTERVAL_SECS") {
            Some(v) => parse("SCREENSHOT_INTERVAL_SECS", &v)?,
            None => DEFAULT_SCREENSHOT_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SCREENSHOT_INTERVAL_SECS",
                value: "0".into(),
            });
        }

        let capture_timeout_secs: u64 = match non_empty("CAPTURE_TIMEOUT_SECS") {
            Some(v) => parse("CAPTURE_TIMEOUT_SECS", &v)?,
            None => DEFAULT_CAPTURE_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url,
            api_key,
            task_id,
            scheduler: SchedulerConfig::new(Duration::from_secs(interval_secs)),
            capture_command: non_empty("CAPTURE_COMMAND"),
            capture_source: non_empty("CAPTURE_SOURCE"),
            capture_timeout: Duration::from_secs(capture_timeout_secs),
        })
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let config = AgentConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "http://localhost:3000"),
            ("API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.task_id, None);
        assert_eq!(config.scheduler.period, Duration::from_secs(60));
        assert_eq!(config.capture_timeout, Duration::from_secs(30));
        assert!(config.capture_command.is_none());
    }

    #[test]
    fn explicit_values_are_parsed() {
        let config = AgentConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "http://localhost:3000"),
            ("API_KEY", "secret"),
            ("TASK_ID", "12"),
            ("SCREENSHOT_INTERVAL_SECS", "5"),
            ("CAPTURE_COMMAND", "grim -"),
            ("CAPTURE_SOURCE", ":1"),
        ]))
        .unwrap();

        assert_eq!(config.task_id, Some(12));
        assert_eq!(config.scheduler.period, Duration::from_secs(5));
        assert_eq!(config.capture_command.as_deref(), Some("grim -"));
        assert_eq!(config.capture_source.as_deref(), Some(":1"));
    }

    #[test]
    fn missing_key_is_reported() {
        let result = AgentConfig::from_lookup(lookup(&[("API_BASE_URL", "http://x")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("API_KEY"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = AgentConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "http://x"),
            ("API_KEY", "k"),
            ("SCREENSHOT_INTERVAL_SECS", "0"),
        ]));
        assert_matches!(
            result,
            Err(ConfigError::Invalid { var: "SCREENSHOT_INTERVAL_SECS", .. })
        );
    }

    #[test]
    fn malformed_task_id_is_rejected() {
        let result = AgentConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "http://x"),
            ("API_KEY", "k"),
            ("TASK_ID", "abc"),
        ]));
        assert_matches!(result, Err(ConfigError::Invalid { var: "TASK_ID", .. }));
    }
}
