//! Shared test helpers: scripted responder and recording executor.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use taskloop::agent_loop::{Executor, Responder};
use taskloop::error::{Result, TaskLoopError};
use taskloop::types::*;

/// A responder that replays queued responses, then answers with plain text.
pub struct ScriptedResponder {
    script: Mutex<VecDeque<Result<AgentResponse>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<usize>>,
    delay: Option<Duration>,
}

impl ScriptedResponder {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Respond only after `delay` (use with paused tokio time).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn then_text(self, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(AgentResponse::text(text)));
        self
    }

    pub fn then_tool(self, id: &str, name: &str, args: serde_json::Value) -> Self {
        self.then_tools(vec![AgentToolCall::new(id, name, args)])
    }

    pub fn then_tools(self, calls: Vec<AgentToolCall>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(AgentResponse::with_tool_calls(calls)));
        self
    }

    pub fn then_error(self, err: TaskLoopError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    /// Queue `n` identical tool-call responses with distinct ids.
    pub fn always_tools(mut self, n: usize) -> Self {
        for i in 0..n {
            self = self.then_tool(&format!("call_{i}"), "shell", serde_json::json!({"command": "true"}));
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Conversation length observed on each call.
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, messages: &[ModelMessage]) -> Result<AgentResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.len());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(AgentResponse::text("done")))
    }
}

/// An executor that answers every call with `{"output": "ran <name>"}` and
/// records what it was asked to do.
pub struct RecordingExecutor {
    batches: Mutex<Vec<Vec<AgentToolCall>>>,
    shutdowns: AtomicUsize,
    fail_on_batch: Option<usize>,
    fail_shutdown: bool,
    canned: Mutex<VecDeque<serde_json::Value>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            shutdowns: AtomicUsize::new(0),
            fail_on_batch: None,
            fail_shutdown: false,
            canned: Mutex::new(VecDeque::new()),
        }
    }

    /// Fail the executor call with this zero-based batch index.
    pub fn failing_on(mut self, batch: usize) -> Self {
        self.fail_on_batch = Some(batch);
        self
    }

    pub fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    /// Use `value` as the payload of the next result instead of the default.
    pub fn with_canned(self, value: serde_json::Value) -> Self {
        self.canned.lock().unwrap().push_back(value);
        self
    }

    pub fn batches(&self) -> Vec<Vec<AgentToolCall>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(&self, calls: &[AgentToolCall]) -> Result<Vec<AgentToolResult>> {
        let batch = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(calls.to_vec());
            batches.len() - 1
        };
        if self.fail_on_batch == Some(batch) {
            return Err(TaskLoopError::tool("environment", "connection lost"));
        }
        let mut canned = self.canned.lock().unwrap();
        Ok(calls
            .iter()
            .map(|call| {
                let value = canned
                    .pop_front()
                    .unwrap_or_else(|| serde_json::json!({"output": format!("ran {}", call.name)}));
                AgentToolResult::success(&call.id, value)
            })
            .collect())
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            return Err(TaskLoopError::tool("environment", "shutdown failed"));
        }
        Ok(())
    }
}
