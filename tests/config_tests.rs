//! Tests for configuration layering.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pretty_assertions::assert_eq;
use taskloop::config::TaskLoopConfig;
use taskloop::error::TaskLoopError;
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 6] = [
    "TASKLOOP_MODEL",
    "TASKLOOP_MAX_STEPS",
    "TASKLOOP_STEP_TIMEOUT_MS",
    "TASKLOOP_WORKSPACE",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }

    fn clear(keys: &[&str]) -> Self {
        let guard = Self::capture(keys);
        for key in keys {
            std::env::remove_var(key);
        }
        guard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn load_reads_explicit_file() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clear(&CONFIG_ENV_VARS);
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "model = \"gpt-4.1-mini\"\nmax_steps = 7\nsystem_prompt = \"Be terse.\"\n",
    );

    let config = TaskLoopConfig::load(Some(&path)).unwrap();
    assert_eq!(config.model, "gpt-4.1-mini");
    assert_eq!(config.max_steps, 7);
    assert_eq!(config.system_prompt.as_deref(), Some("Be terse."));
    assert_eq!(config.api_key, None);
}

#[test]
fn environment_overrides_file() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clear(&CONFIG_ENV_VARS);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "model = \"from-file\"\nmax_steps = 7\n");

    std::env::set_var("TASKLOOP_MODEL", "from-env");
    std::env::set_var("TASKLOOP_STEP_TIMEOUT_MS", "2500");
    std::env::set_var("OPENAI_API_KEY", "sk-env");
    std::env::set_var("TASKLOOP_WORKSPACE", dir.path());

    let config = TaskLoopConfig::load(Some(&path)).unwrap();
    assert_eq!(config.model, "from-env");
    assert_eq!(config.max_steps, 7);
    assert_eq!(config.step_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(config.api_key.as_deref(), Some("sk-env"));
    assert_eq!(config.workspace.as_deref(), Some(dir.path()));
}

#[test]
fn invalid_environment_number_fails_load() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clear(&CONFIG_ENV_VARS);
    std::env::set_var("TASKLOOP_MAX_STEPS", "lots");

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let err = TaskLoopConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, TaskLoopError::Configuration(_)));
}

#[test]
fn from_env_falls_back_to_defaults_on_bad_values() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clear(&CONFIG_ENV_VARS);
    std::env::set_var("TASKLOOP_STEP_TIMEOUT_MS", "soon");

    let config = TaskLoopConfig::from_env();
    assert_eq!(config, TaskLoopConfig::default());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let _lock = env_lock_guard();
    let dir = TempDir::new().unwrap();
    let err = TaskLoopConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("nope.toml"));
}
