//! Benchmark task definitions.

pub mod dataset;
pub mod evaluation;

pub use dataset::{load_dataset, load_task, parse_dataset};
pub use evaluation::{find_content, find_reward, Evaluation};

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::agent_loop::ToolPhase;
use crate::error::{Result, TaskLoopError};
use crate::types::AgentToolCall;

/// A tool invocation described by the dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default, alias = "args")]
    pub arguments: serde_json::Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Turn into a call with a fresh id prefixed by `phase`.
    pub fn to_call(&self, phase: ToolPhase) -> AgentToolCall {
        AgentToolCall::new(
            format!("{phase}_{}", Uuid::new_v4().simple()),
            self.name.clone(),
            self.arguments.clone(),
        )
    }
}

/// One benchmark unit: setup, prompt, evaluation. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub setup_tool: Vec<ToolSpec>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub evaluate_tool: Vec<ToolSpec>,
    /// Environment description, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: None,
            prompt: prompt.into(),
            system_prompt: None,
            setup_tool: Vec::new(),
            evaluate_tool: Vec::new(),
            mcp_config: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_setup(mut self, spec: ToolSpec) -> Self {
        self.setup_tool.push(spec);
        self
    }

    pub fn with_evaluation(mut self, spec: ToolSpec) -> Self {
        self.evaluate_tool.push(spec);
        self
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("unnamed")
    }

    pub fn setup_calls(&self) -> Vec<AgentToolCall> {
        self.setup_tool.iter().map(|s| s.to_call(ToolPhase::Setup)).collect()
    }

    pub fn evaluate_calls(&self) -> Vec<AgentToolCall> {
        self.evaluate_tool.iter().map(|s| s.to_call(ToolPhase::Evaluate)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(TaskLoopError::InvalidArgument(format!(
                "task '{}' has an empty prompt",
                self.id()
            )));
        }
        if let Some(spec) = self
            .setup_tool
            .iter()
            .chain(&self.evaluate_tool)
            .find(|s| s.name.trim().is_empty())
        {
            return Err(TaskLoopError::InvalidArgument(format!(
                "task '{}' has a tool spec without a name: {spec:?}",
                self.id()
            )));
        }
        Ok(())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<ToolSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(ToolSpec),
        Many(Vec<ToolSpec>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(spec)) => vec![spec],
        Some(OneOrMany::Many(specs)) => specs,
    })
}
