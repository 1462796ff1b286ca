//! Core run types for the bounded loop.

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Unique run identifier.
pub type RunId = Uuid;

/// Collaborator call the loop suspends on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CallStage {
    Respond,
    Execute,
}

/// Which part of a task run issued a tool call.
///
/// Only `Agent` calls come from the model; `Setup` and `Evaluate` calls come
/// from the task definition itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolPhase {
    Setup,
    #[default]
    Agent,
    Evaluate,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Termination {
    /// The responder requested no further tool invocations.
    Completed,
    /// The step budget ran out, possibly with tool calls still pending.
    BudgetExhausted,
}

/// Loop state machine: `Running` until one of the terminal reasons applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Running,
    Done(Termination),
}

/// Result of a finished loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoopOutcome {
    /// Iterations performed (responder invocations).
    pub steps: usize,
    /// Executor invocations performed.
    pub tool_rounds: usize,
    pub termination: Termination,
    /// Text of the last response, if it had any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
}

impl LoopOutcome {
    pub fn completed(&self) -> bool {
        self.termination == Termination::Completed
    }
}
