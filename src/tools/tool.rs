//! The `Tool` trait and closure-backed tools.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::arguments::ToolArguments;
use super::types::{AgentToolParameters, ToolDefinition};
use crate::agent_loop::ToolPhase;
use crate::error::TaskLoopError;

/// The call a tool is serving and which part of the run issued it.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    pub call_id: String,
    pub phase: ToolPhase,
}

impl ToolExecutionContext {
    pub fn new(call_id: impl Into<String>, phase: ToolPhase) -> Self {
        Self {
            call_id: call_id.into(),
            phase,
        }
    }
}

/// A callable tool. Implement directly or wrap a closure in [`AgentTool`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and schema as offered to the model.
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, TaskLoopError>;
}

type Handler = dyn Fn(ToolArguments, ToolExecutionContext) -> BoxFuture<'static, Result<serde_json::Value, TaskLoopError>>
    + Send
    + Sync;

/// A tool whose behavior is an async closure.
pub struct AgentTool {
    definition: ToolDefinition,
    handler: Arc<Handler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, TaskLoopError>> + Send + 'static,
    {
        Self {
            definition: ToolDefinition::new(name, description, parameters),
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, TaskLoopError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AgentTool").field(&self.definition.name).finish()
    }
}
