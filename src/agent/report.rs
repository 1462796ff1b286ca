//! Summary of a finished task run.

use serde::{Deserialize, Serialize};

use crate::agent_loop::{Conversation, RunId, Termination};
use crate::task::Evaluation;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskReport {
    pub run_id: RunId,
    pub task_id: String,
    pub steps: usize,
    pub tool_rounds: usize,
    pub termination: Termination,
    pub evaluation: Evaluation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
    pub conversation: Conversation,
}

impl TaskReport {
    /// True when the model stopped on its own rather than hitting the budget.
    pub fn completed(&self) -> bool {
        self.termination == Termination::Completed
    }
}
