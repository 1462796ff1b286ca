//! Capabilities the loop consumes: a responder, an executor and a formatter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AgentResponse, AgentToolCall, AgentToolResult, ModelMessage};

use super::types::ToolPhase;

/// Produces the next model response for the current conversation.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, messages: &[ModelMessage]) -> Result<AgentResponse>;
}

/// Performs requested tool invocations.
///
/// Must return one result per call, in call order. Error-flagged results are
/// data; only faults that prevent producing results should be `Err`.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run calls requested by the model.
    async fn execute(&self, calls: &[AgentToolCall]) -> Result<Vec<AgentToolResult>>;

    /// Run the task's own setup or evaluation calls. Restrictions on what the
    /// model may call do not apply here.
    async fn execute_task_calls(
        &self,
        _phase: ToolPhase,
        calls: &[AgentToolCall],
    ) -> Result<Vec<AgentToolResult>> {
        self.execute(calls).await
    }

    /// Release any resources held by the tool environment.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Turns a tool round into the messages appended to the conversation.
pub trait ResultFormatter: Send + Sync {
    fn format(&self, response: &AgentResponse, results: &[AgentToolResult]) -> Vec<ModelMessage>;
}

#[async_trait]
impl<T: Responder + ?Sized> Responder for Arc<T> {
    async fn respond(&self, messages: &[ModelMessage]) -> Result<AgentResponse> {
        (**self).respond(messages).await
    }
}

#[async_trait]
impl<T: Executor + ?Sized> Executor for Arc<T> {
    async fn execute(&self, calls: &[AgentToolCall]) -> Result<Vec<AgentToolResult>> {
        (**self).execute(calls).await
    }

    async fn execute_task_calls(
        &self,
        phase: ToolPhase,
        calls: &[AgentToolCall],
    ) -> Result<Vec<AgentToolResult>> {
        (**self).execute_task_calls(phase, calls).await
    }

    async fn shutdown(&self) -> Result<()> {
        (**self).shutdown().await
    }
}

#[async_trait]
impl<T: Responder + ?Sized> Responder for &T {
    async fn respond(&self, messages: &[ModelMessage]) -> Result<AgentResponse> {
        (**self).respond(messages).await
    }
}

#[async_trait]
impl<T: Executor + ?Sized> Executor for &T {
    async fn execute(&self, calls: &[AgentToolCall]) -> Result<Vec<AgentToolResult>> {
        (**self).execute(calls).await
    }

    async fn execute_task_calls(
        &self,
        phase: ToolPhase,
        calls: &[AgentToolCall],
    ) -> Result<Vec<AgentToolResult>> {
        (**self).execute_task_calls(phase, calls).await
    }

    async fn shutdown(&self) -> Result<()> {
        (**self).shutdown().await
    }
}
