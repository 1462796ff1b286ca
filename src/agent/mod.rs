//! Task lifecycle: setup, bounded loop, evaluation, cleanup.

pub mod report;

pub use report::TaskReport;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::agent_loop::{
    BoundedLoop, CallStage, Conversation, Executor, LoopEventSink, Responder, RunId, ToolPhase,
};
use crate::config::TaskLoopConfig;
use crate::error::Result;
use crate::task::{find_content, Evaluation, Task};
use crate::types::{AgentToolCall, AgentToolResult, ModelMessage};
use crate::util::timeout::with_timeout;

/// System prompt used when neither the task nor the config provides one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an agent completing a benchmark task. \
Use the available tools to inspect and change the environment. \
When the task is done, reply with a short summary and no tool calls.";

/// Runs one task end-to-end against a responder and a tool executor.
pub struct TaskAgent<R, E> {
    config: TaskLoopConfig,
    responder: R,
    executor: E,
    event_sink: Option<LoopEventSink>,
}

impl<R: Responder, E: Executor> TaskAgent<R, E> {
    pub fn new(config: TaskLoopConfig, responder: R, executor: E) -> Self {
        Self {
            config,
            responder,
            executor,
            event_sink: None,
        }
    }

    pub fn with_event_sink(mut self, sink: Option<LoopEventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    pub fn config(&self) -> &TaskLoopConfig {
        &self.config
    }

    /// Run the task. The executor is shut down afterwards whether or not the
    /// run succeeded; a run fault takes precedence over a shutdown fault.
    pub async fn run(&self, task: &Task) -> Result<TaskReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("task_run", %run_id, task_id = %task.id());

        async {
            let outcome = self.run_phases(run_id, task).await;
            info!("cleaning up");
            let shutdown = self.executor.shutdown().await;
            match (outcome, shutdown) {
                (Ok(report), Ok(())) => Ok(report),
                (Ok(_), Err(err)) => Err(err),
                (Err(err), Ok(())) => Err(err),
                (Err(err), Err(shutdown_err)) => {
                    warn!(error = %shutdown_err, "shutdown failed after run error");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_phases(&self, run_id: RunId, task: &Task) -> Result<TaskReport> {
        self.config.validate()?;
        task.validate()?;
        info!(max_steps = self.config.max_steps, "initializing");

        let setup_content = self.setup(task).await?;
        let mut conversation = self.initial_conversation(task, setup_content);

        let outcome = BoundedLoop::new(&self.responder, &self.executor)
            .with_max_steps(self.config.max_steps)
            .with_call_timeout(self.config.step_timeout())
            .with_run_id(run_id)
            .with_event_sink(self.event_sink.clone())
            .run(&mut conversation)
            .await?;
        info!(
            steps = outcome.steps,
            termination = %outcome.termination,
            "agent loop finished"
        );

        let evaluation = self.evaluate(task).await?;
        if let Some(reward) = evaluation.reward() {
            info!(reward, "evaluation complete");
        }

        Ok(TaskReport {
            run_id,
            task_id: task.id().to_string(),
            steps: outcome.steps,
            tool_rounds: outcome.tool_rounds,
            termination: outcome.termination,
            evaluation,
            final_response: outcome.final_response,
            conversation,
        })
    }

    async fn setup(&self, task: &Task) -> Result<Vec<String>> {
        let calls = task.setup_calls();
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        info!(tools = calls.len(), "running setup");

        let results = self.execute_phase(ToolPhase::Setup, &calls).await?;
        Ok(results
            .iter()
            .map(|result| {
                if result.is_error {
                    warn!(call_id = %result.tool_call_id, "setup tool reported an error");
                }
                find_content(result).unwrap_or_else(|| result.text())
            })
            .collect())
    }

    fn initial_conversation(&self, task: &Task, setup_content: Vec<String>) -> Conversation {
        let system_prompt = task
            .system_prompt
            .as_deref()
            .or(self.config.system_prompt.as_deref())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);

        let mut conversation = Conversation::new();
        conversation.push(ModelMessage::system(system_prompt));
        conversation.push(ModelMessage::user_parts(
            setup_content
                .into_iter()
                .filter(|c| !c.trim().is_empty())
                .chain(std::iter::once(task.prompt.clone())),
        ));
        conversation
    }

    async fn evaluate(&self, task: &Task) -> Result<Evaluation> {
        let calls = task.evaluate_calls();
        if calls.is_empty() {
            return Ok(Evaluation::Skipped);
        }
        info!(tools = calls.len(), "running evaluation");

        let results = self.execute_phase(ToolPhase::Evaluate, &calls).await?;
        Ok(results
            .first()
            .map(Evaluation::from_result)
            .unwrap_or(Evaluation::Skipped))
    }

    async fn execute_phase(
        &self,
        phase: ToolPhase,
        calls: &[AgentToolCall],
    ) -> Result<Vec<AgentToolResult>> {
        let future = self.executor.execute_task_calls(phase, calls);
        match self.config.step_timeout() {
            Some(duration) => with_timeout(CallStage::Execute, duration, future).await,
            None => future.await,
        }
    }
}
