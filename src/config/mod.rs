//! Configuration system (layered: defaults < config file < env < code).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::agent_loop::DEFAULT_MAX_STEPS;
use crate::error::{Result, TaskLoopError};
use crate::types::GenerationSettings;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for running tasks.
///
/// Resolution order, later wins:
/// 1. Built-in defaults
/// 2. TOML config file (explicit path, else the per-user default path if present)
/// 3. Environment (`.env` is loaded first when present)
/// 4. Explicit overrides applied by the caller (e.g. CLI flags)
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaskLoopConfig {
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_steps: usize,
    /// Per-call bound on responder and executor calls. Unset blocks indefinitely.
    pub step_timeout_ms: Option<u64>,
    pub system_prompt: Option<String>,
    /// Restrict the tools offered to the model. Unset allows all.
    pub allowed_tools: Option<Vec<String>>,
    /// Directory built-in tools resolve relative paths and commands against.
    pub workspace: Option<PathBuf>,
    /// Attempts per model request, including the first.
    pub request_attempts: u32,
    pub generation: GenerationSettings,
}

impl Default for TaskLoopConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            max_steps: DEFAULT_MAX_STEPS,
            step_timeout_ms: None,
            system_prompt: None,
            allowed_tools: None,
            workspace: None,
            request_attempts: 3,
            generation: GenerationSettings::default(),
        }
    }
}

impl fmt::Debug for TaskLoopConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskLoopConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("max_steps", &self.max_steps)
            .field("step_timeout_ms", &self.step_timeout_ms)
            .field("system_prompt", &self.system_prompt)
            .field("allowed_tools", &self.allowed_tools)
            .field("workspace", &self.workspace)
            .field("request_attempts", &self.request_attempts)
            .field("generation", &self.generation)
            .finish()
    }
}

impl TaskLoopConfig {
    /// Defaults overlaid with the process environment. Malformed numeric
    /// variables are ignored with a warning.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();
        match defaults.clone().with_env(|key| std::env::var(key).ok()) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring invalid environment configuration");
                defaults
            }
        }
    }

    /// Load the full layer stack. An explicit `path` must exist; without one
    /// the per-user default file is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TaskLoopError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Per-user config location (`<config dir>/taskloop/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "taskloop").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay values found through `lookup` (normally `std::env::var`).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(model) = lookup("TASKLOOP_MODEL") {
            self.model = model;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(raw) = lookup("TASKLOOP_MAX_STEPS") {
            self.max_steps = parse_env("TASKLOOP_MAX_STEPS", &raw)?;
        }
        if let Some(raw) = lookup("TASKLOOP_STEP_TIMEOUT_MS") {
            self.step_timeout_ms = Some(parse_env("TASKLOOP_STEP_TIMEOUT_MS", &raw)?);
        }
        if let Some(dir) = lookup("TASKLOOP_WORKSPACE") {
            self.workspace = Some(PathBuf::from(dir));
        }
        Ok(self)
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_ms.map(Duration::from_millis)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(TaskLoopError::Configuration(
                "max_steps must be at least 1".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(TaskLoopError::Configuration("model must not be empty".to_string()));
        }
        if self.step_timeout_ms == Some(0) {
            return Err(TaskLoopError::Configuration(
                "step_timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| TaskLoopError::Configuration(format!("{key} has invalid value '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_runnable() {
        let config = TaskLoopConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.step_timeout(), None);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        config.validate().unwrap();
    }

    #[test]
    fn file_values_override_defaults() {
        let config = TaskLoopConfig::from_toml_str(
            r#"
            model = "gpt-4.1-mini"
            max_steps = 25
            step_timeout_ms = 60000
            allowed_tools = ["shell"]

            [generation]
            temperature = 0.2
            max_tokens = 512
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.max_steps, 25);
        assert_eq!(config.step_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.allowed_tools, Some(vec!["shell".to_string()]));
        assert_eq!(config.generation.temperature, Some(0.2));
        assert_eq!(config.generation.max_tokens, Some(512));
        assert_eq!(config.request_attempts, 3);
    }

    #[test]
    fn env_overrides_file() {
        let config = TaskLoopConfig::from_toml_str("model = \"from-file\"\nmax_steps = 4")
            .unwrap()
            .with_env(lookup(&[
                ("TASKLOOP_MODEL", "from-env"),
                ("OPENAI_API_KEY", "sk-test"),
                ("TASKLOOP_STEP_TIMEOUT_MS", "1500"),
            ]))
            .unwrap();

        assert_eq!(config.model, "from-env");
        assert_eq!(config.max_steps, 4);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.step_timeout_ms, Some(1500));
    }

    #[test]
    fn malformed_env_number_is_configuration_error() {
        let err = TaskLoopConfig::default()
            .with_env(lookup(&[("TASKLOOP_MAX_STEPS", "ten")]))
            .unwrap_err();
        assert!(matches!(err, TaskLoopError::Configuration(_)));
        assert!(err.to_string().contains("TASKLOOP_MAX_STEPS"));
    }

    #[test]
    fn invalid_toml_is_config_parse_error() {
        let err = TaskLoopConfig::from_toml_str("max_steps = \"many\"").unwrap_err();
        assert!(matches!(err, TaskLoopError::ConfigParse(_)));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = TaskLoopConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TaskLoopError::Configuration(_)));
    }

    #[test]
    fn validate_rejects_zero_budget_and_timeout() {
        let config = TaskLoopConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TaskLoopConfig {
            step_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_hides_api_key() {
        let config = TaskLoopConfig {
            api_key: Some("sk-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
    }
}
