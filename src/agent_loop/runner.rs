//! The bounded request/respond/act loop.

use std::future::Future;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, TaskLoopError};
use crate::util::timeout::with_timeout;

use super::collaborators::{Executor, Responder, ResultFormatter};
use super::conversation::Conversation;
use super::events::{LoopEventEmitter, LoopEventPayload, LoopEventSink};
use super::format::ToolMessageFormatter;
use super::types::{CallStage, LoopOutcome, LoopStatus, RunId, Termination};

/// Step budget used when none is configured.
pub const DEFAULT_MAX_STEPS: usize = 10;

static DEFAULT_FORMATTER: ToolMessageFormatter = ToolMessageFormatter;

/// Drives at most `max_steps` responder/executor cycles over a conversation.
///
/// Each iteration asks the responder for a response. A response without tool
/// calls ends the loop as [`Termination::Completed`]; otherwise the executor
/// runs the calls, the formatted round is appended and the step counter
/// advances. Reaching the budget ends the loop as
/// [`Termination::BudgetExhausted`] even if tool calls are still pending.
///
/// Faults from either collaborator are returned as-is; nothing is retried.
pub struct BoundedLoop<'a> {
    responder: &'a dyn Responder,
    executor: &'a dyn Executor,
    formatter: &'a dyn ResultFormatter,
    max_steps: usize,
    call_timeout: Option<Duration>,
    run_id: RunId,
    event_sink: Option<LoopEventSink>,
}

impl<'a> BoundedLoop<'a> {
    pub fn new(responder: &'a dyn Responder, executor: &'a dyn Executor) -> Self {
        Self {
            responder,
            executor,
            formatter: &DEFAULT_FORMATTER,
            max_steps: DEFAULT_MAX_STEPS,
            call_timeout: None,
            run_id: Uuid::new_v4(),
            event_sink: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_formatter(mut self, formatter: &'a dyn ResultFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Bound every responder and executor call. Without this a hung call
    /// blocks the loop indefinitely.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_event_sink(mut self, sink: Option<LoopEventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Run the loop, appending each tool round to `conversation`.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<LoopOutcome> {
        if self.max_steps == 0 {
            return Err(TaskLoopError::InvalidArgument(
                "step budget must be at least 1".to_string(),
            ));
        }

        let emitter = LoopEventEmitter::new(self.run_id, self.event_sink.clone());
        let mut status = LoopStatus::Running;
        let mut steps = 0usize;
        let mut tool_rounds = 0usize;
        let mut final_response = None;

        while status == LoopStatus::Running {
            let step = steps + 1;
            emitter.emit(LoopEventPayload::StepStarted { step });

            let response = self
                .call(CallStage::Respond, self.responder.respond(conversation.messages()))
                .await?;

            if let Some(text) = response.content.as_deref().filter(|t| !t.is_empty()) {
                emitter.emit(LoopEventPayload::AssistantMessage {
                    step,
                    text: text.to_string(),
                });
            }
            final_response = response.content.clone();

            if response.requests_tools() {
                emitter.emit(LoopEventPayload::ToolCallsRequested {
                    step,
                    calls: response.tool_calls.clone(),
                });

                let results = self
                    .call(CallStage::Execute, self.executor.execute(&response.tool_calls))
                    .await?;
                if results.len() != response.tool_calls.len() {
                    return Err(TaskLoopError::InvalidState(format!(
                        "executor returned {} results for {} tool calls",
                        results.len(),
                        response.tool_calls.len()
                    )));
                }
                tool_rounds += 1;

                conversation.extend(self.formatter.format(&response, &results));
                emitter.emit(LoopEventPayload::ToolResults { step, results });
            } else {
                status = LoopStatus::Done(Termination::Completed);
            }

            steps += 1;
            if status == LoopStatus::Running && steps >= self.max_steps {
                status = LoopStatus::Done(Termination::BudgetExhausted);
            }

            debug!(
                run_id = %self.run_id,
                step = steps,
                tool_calls = response.tool_calls.len(),
                messages = conversation.len(),
                "loop iteration complete"
            );
        }

        let LoopStatus::Done(termination) = status else {
            return Err(TaskLoopError::InvalidState("loop exited while running".to_string()));
        };

        emitter.emit(LoopEventPayload::Finished { steps, termination });
        debug!(run_id = %self.run_id, steps, tool_rounds, %termination, "loop finished");

        Ok(LoopOutcome {
            steps,
            tool_rounds,
            termination,
            final_response,
        })
    }

    async fn call<T>(
        &self,
        stage: CallStage,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.call_timeout {
            Some(duration) => with_timeout(stage, duration, future).await,
            None => future.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::{AgentResponse, AgentToolCall, AgentToolResult, ModelMessage};

    struct Echo;

    #[async_trait]
    impl Responder for Echo {
        async fn respond(&self, messages: &[ModelMessage]) -> Result<AgentResponse> {
            Ok(AgentResponse::text(format!("seen {}", messages.len())))
        }
    }

    struct ShortExecutor {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Executor for ShortExecutor {
        async fn execute(&self, _calls: &[AgentToolCall]) -> Result<Vec<AgentToolResult>> {
            *self.calls.lock().unwrap() += 1;
            Ok(Vec::new())
        }
    }

    struct AlwaysTools;

    #[async_trait]
    impl Responder for AlwaysTools {
        async fn respond(&self, _messages: &[ModelMessage]) -> Result<AgentResponse> {
            Ok(AgentResponse::with_tool_calls(vec![AgentToolCall::new(
                "c1",
                "shell",
                serde_json::json!({}),
            )]))
        }
    }

    #[tokio::test]
    async fn zero_budget_is_rejected_before_any_call() {
        let executor = ShortExecutor { calls: Mutex::new(0) };
        let mut conversation = Conversation::new();
        let err = BoundedLoop::new(&Echo, &executor)
            .with_max_steps(0)
            .run(&mut conversation)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskLoopError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn final_text_is_reported_but_not_appended() {
        let executor = ShortExecutor { calls: Mutex::new(0) };
        let mut conversation = Conversation::from(vec![ModelMessage::user("hi")]);
        let outcome = BoundedLoop::new(&Echo, &executor).run(&mut conversation).await.unwrap();
        assert_eq!(outcome.final_response.as_deref(), Some("seen 1"));
        assert_eq!(conversation.len(), 1);
        assert_eq!(*executor.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn result_count_mismatch_is_invalid_state() {
        let executor = ShortExecutor { calls: Mutex::new(0) };
        let mut conversation = Conversation::new();
        let err = BoundedLoop::new(&AlwaysTools, &executor)
            .run(&mut conversation)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskLoopError::InvalidState(_)));
        assert!(conversation.is_empty());
    }
}
