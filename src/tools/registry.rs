//! Named tool collection that executes tool calls for the loop.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agent_loop::{Executor, ToolPhase};
use crate::error::Result;
use crate::types::{AgentToolCall, AgentToolResult};

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolDefinition;

/// Registered tools plus an optional allow-list.
///
/// Calls run one at a time in request order. A missing tool, a failing tool
/// or a model call outside the allow-list yields an error-flagged result
/// rather than a fault, so the model sees what went wrong on its next turn.
/// Setup and evaluation calls bypass the allow-list.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    allowed: Option<HashSet<String>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Restrict the tools offered to and callable by the model to `names`.
    /// `None` allows all.
    pub fn with_allowed_tools(mut self, names: Option<Vec<String>>) -> Self {
        self.allowed = names.map(|n| n.into_iter().collect());
        self
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.as_ref().map_or(true, |set| set.contains(name))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Names of all registered tools, allowed or not.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Definitions of the allowed tools, for the model request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .filter(|t| self.is_allowed(t.name()))
            .map(|t| t.definition().clone())
            .collect()
    }

    async fn run_calls(&self, phase: ToolPhase, calls: &[AgentToolCall]) -> Vec<AgentToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            debug!(tool = %call.name, call_id = %call.id, %phase, "executing tool call");
            results.push(self.execute_one(call, phase).await);
        }
        results
    }

    async fn execute_one(&self, call: &AgentToolCall, phase: ToolPhase) -> AgentToolResult {
        // The allow-list bounds the model, not the task's own setup and grading.
        if phase == ToolPhase::Agent && !self.is_allowed(&call.name) {
            return AgentToolResult::error(&call.id, format!("Tool '{}' is not allowed", call.name));
        }
        let Some(tool) = self.get(&call.name) else {
            return AgentToolResult::error(&call.id, format!("Tool '{}' not found", call.name));
        };

        let args = ToolArguments::new(call.arguments.clone());
        let ctx = ToolExecutionContext::new(&call.id, phase);
        match tool.execute(&args, &ctx).await {
            Ok(value) => AgentToolResult::success(&call.id, value),
            Err(err) => {
                warn!(tool = %call.name, call_id = %call.id, %phase, error = %err, "tool failed");
                AgentToolResult::error(&call.id, err.to_string())
            }
        }
    }
}

#[async_trait]
impl Executor for ToolRegistry {
    async fn execute(&self, calls: &[AgentToolCall]) -> Result<Vec<AgentToolResult>> {
        Ok(self.run_calls(ToolPhase::Agent, calls).await)
    }

    async fn execute_task_calls(
        &self,
        phase: ToolPhase,
        calls: &[AgentToolCall],
    ) -> Result<Vec<AgentToolResult>> {
        Ok(self.run_calls(phase, calls).await)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("allowed", &self.allowed)
            .finish()
    }
}
