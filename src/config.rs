//! Runtime configuration.
//!
//! Configuration is plain serde data with defaults for every field. It can be
//! loaded from YAML or JSON and then patched from `A2A_*` environment
//! variables:
//!
//! ```yaml
//! server:
//!   bind_address: "0.0.0.0:8080"
//!   base_path: "/a2a"
//! tasks:
//!   transition_policy: strict
//!   stream_retention_secs: 30
//! logging:
//!   level: debug
//!   format: json
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AgentError, AgentResult};

/// Top-level configuration for a server built on the runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub server: ServerSettings,
    pub tasks: TaskManagerConfig,
    pub logging: LoggingConfig,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    /// Prefix for every route, e.g. "/a2a". Empty mounts at the root.
    pub base_path: String,
    /// Public URL advertised in the agent card. Derived from the bound address when absent.
    pub agent_url: Option<String>,
    pub keep_alive_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            base_path: String::new(),
            agent_url: None,
            keep_alive_secs: 15,
        }
    }
}

impl ServerSettings {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Base path without a trailing slash; "" for the root.
    pub fn normalized_base_path(&self) -> String {
        self.base_path.trim_end_matches('/').to_string()
    }
}

/// How status writes are checked against the current state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any state may follow any state.
    #[default]
    Permissive,
    /// Terminal states are final: no status writes and no cancel afterwards.
    Strict,
}

impl FromStr for TransitionPolicy {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(AgentError::InvalidConfiguration {
                field: "tasks.transition_policy".to_string(),
                reason: format!("unknown policy '{other}'"),
            }),
        }
    }
}

/// Task manager behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaskManagerConfig {
    pub transition_policy: TransitionPolicy,
    pub push_notifications_enabled: bool,
    /// How long a finalized event stream stays available for resubscription
    /// when nobody drains it.
    pub stream_retention_secs: u64,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            transition_policy: TransitionPolicy::Permissive,
            push_notifications_enabled: true,
            stream_retention_secs: 60,
        }
    }
}

impl TaskManagerConfig {
    pub fn stream_retention(&self) -> Duration {
        Duration::from_secs(self.stream_retention_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> AgentResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> AgentResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AgentError::InvalidConfiguration {
            field: path.display().to_string(),
            reason: e.to_string(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(AgentError::InvalidConfiguration {
                field: path.display().to_string(),
                reason: "expected a .yaml, .yml or .json file".to_string(),
            }),
        }
    }

    /// Apply `A2A_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> AgentResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment, secret store, tests).
    pub fn with_overrides<F>(mut self, lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("A2A_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = lookup("A2A_BASE_PATH") {
            self.server.base_path = value;
        }
        if let Some(value) = lookup("A2A_AGENT_URL") {
            self.server.agent_url = Some(value);
        }
        if let Some(value) = lookup("A2A_KEEP_ALIVE_SECS") {
            self.server.keep_alive_secs = parse_number("A2A_KEEP_ALIVE_SECS", &value)?;
        }
        if let Some(value) = lookup("A2A_TRANSITION_POLICY") {
            self.tasks.transition_policy = value.parse()?;
        }
        if let Some(value) = lookup("A2A_PUSH_NOTIFICATIONS") {
            self.tasks.push_notifications_enabled = parse_bool("A2A_PUSH_NOTIFICATIONS", &value)?;
        }
        if let Some(value) = lookup("A2A_STREAM_RETENTION_SECS") {
            self.tasks.stream_retention_secs = parse_number("A2A_STREAM_RETENTION_SECS", &value)?;
        }
        if let Some(value) = lookup("A2A_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = lookup("A2A_LOG_FORMAT") {
            self.logging.format = match value.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                other => {
                    return Err(AgentError::InvalidConfiguration {
                        field: "A2A_LOG_FORMAT".to_string(),
                        reason: format!("unknown format '{other}'"),
                    })
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.server.bind_address.trim().is_empty() {
            return Err(invalid("server.bind_address", "cannot be empty"));
        }
        let base = &self.server.base_path;
        if !base.is_empty() && !base.starts_with('/') {
            return Err(invalid("server.base_path", "must start with '/'"));
        }
        if self.server.keep_alive_secs == 0 {
            return Err(invalid("server.keep_alive_secs", "must be greater than zero"));
        }
        if let Some(url) = &self.server.agent_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("server.agent_url", "must be an http(s) URL"));
            }
        }
        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging.level", "cannot be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> AgentError {
    AgentError::InvalidConfiguration {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number(field: &str, value: &str) -> AgentResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(field, &format!("'{value}' is not a number")))
}

fn parse_bool(field: &str, value: &str) -> AgentResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(field, &format!("'{value}' is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.server.keep_alive(), Duration::from_secs(15));
        assert_eq!(config.tasks.transition_policy, TransitionPolicy::Permissive);
        assert!(config.tasks.push_notifications_enabled);
        assert_eq!(config.tasks.stream_retention(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial_document() {
        let config = RuntimeConfig::from_yaml(
            r#"
server:
  base_path: "/a2a/"
tasks:
  transition_policy: strict
logging:
  format: json
"#,
        )
        .unwrap();

        assert_eq!(config.server.normalized_base_path(), "/a2a");
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.tasks.transition_policy, TransitionPolicy::Strict);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_from_json_rejects_bad_base_path() {
        let err = RuntimeConfig::from_json(r#"{"server": {"base_path": "a2a"}}"#).unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfiguration { field, .. } if field == "server.base_path"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("A2A_BIND_ADDRESS", "0.0.0.0:9000"),
            ("A2A_TRANSITION_POLICY", "Strict"),
            ("A2A_PUSH_NOTIFICATIONS", "off"),
            ("A2A_STREAM_RETENTION_SECS", "5"),
        ]);
        let config = RuntimeConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.tasks.transition_policy, TransitionPolicy::Strict);
        assert!(!config.tasks.push_notifications_enabled);
        assert_eq!(config.tasks.stream_retention_secs, 5);
    }

    #[test]
    fn test_override_parse_errors() {
        let err = RuntimeConfig::default()
            .with_overrides(|key| (key == "A2A_KEEP_ALIVE_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfiguration { .. }));

        let err = RuntimeConfig::default()
            .with_overrides(|key| (key == "A2A_TRANSITION_POLICY").then(|| "lenient".to_string()))
            .unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
