//! Reading rewards out of evaluation tool results.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{value_to_text, AgentToolResult};

const REWARD_KEYS: [&str; 3] = ["reward", "grade", "score"];
const NESTED_KEYS: [&str; 2] = ["structured_content", "structuredContent"];
const TEXT_KEYS: [&str; 3] = ["content", "output", "text"];

static REWARD_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn reward_pattern() -> Option<&'static Regex> {
    REWARD_PATTERN
        .get_or_init(|| Regex::new(r"(?i)\b(?:reward|grade|score)\s*[:=]\s*(-?\d+(?:\.\d+)?)").ok())
        .as_ref()
}

/// Outcome of the evaluation phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Evaluation {
    Scored {
        reward: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    /// The evaluation tool flagged its result as an error.
    Failed { content: String },
    /// The task defines no evaluation tool.
    Skipped,
}

impl Evaluation {
    pub fn from_result(result: &AgentToolResult) -> Self {
        if result.is_error {
            return Self::Failed {
                content: find_content(result).unwrap_or_else(|| result.text()),
            };
        }
        Self::Scored {
            reward: find_reward(result),
            content: find_content(result),
        }
    }

    pub fn reward(&self) -> Option<f64> {
        match self {
            Self::Scored { reward, .. } => Some(*reward),
            _ => None,
        }
    }
}

/// Reward reported by an evaluation result; 0.0 when none is found.
///
/// Looks for a numeric `reward`, `grade` or `score` field (also inside a
/// structured-content object), then for a `reward: <n>` style mention in the
/// result text.
pub fn find_reward(result: &AgentToolResult) -> f64 {
    if let Some(reward) = reward_field(&result.result) {
        return reward;
    }
    let text = find_content(result).unwrap_or_else(|| result.text());
    reward_pattern()
        .and_then(|re| re.captures(&text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Human-readable content of a result: a string payload, or the first of
/// its `content`/`output`/`text` string fields.
pub fn find_content(result: &AgentToolResult) -> Option<String> {
    match &result.result {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => TEXT_KEYS
            .iter()
            .find_map(|key| obj.get(*key))
            .map(value_to_text),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn reward_field(value: &serde_json::Value) -> Option<f64> {
    let obj = value.as_object()?;
    REWARD_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(number_like))
        .or_else(|| {
            NESTED_KEYS
                .iter()
                .find_map(|key| obj.get(*key).and_then(reward_field))
        })
}

fn number_like(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
