//! Terminal rendering of loop events and run reports.

use std::sync::Arc;

use crate::agent::TaskReport;
use crate::agent_loop::{LoopEvent, LoopEventPayload, LoopEventSink};
use crate::task::{Evaluation, Task};

const AGENT_PREVIEW_CHARS: usize = 100;
const RESULT_PREVIEW_CHARS: usize = 200;

/// Lines to print for one loop event.
pub fn render_event(payload: &LoopEventPayload) -> Vec<String> {
    match payload {
        LoopEventPayload::StepStarted { step } => vec![format!("\nStep {step}:")],
        LoopEventPayload::AssistantMessage { text, .. } => {
            vec![format!("💭 Agent: {}", preview(text, AGENT_PREVIEW_CHARS))]
        }
        LoopEventPayload::ToolCallsRequested { calls, .. } => calls
            .iter()
            .map(|call| format!("⚡ {} ({})", call.name, call.id))
            .collect(),
        LoopEventPayload::ToolResults { results, .. } => results
            .iter()
            .map(|result| {
                let marker = if result.is_error { "❌" } else { "✅" };
                format!("  {marker} {}", preview(&result.text(), RESULT_PREVIEW_CHARS))
            })
            .collect(),
        LoopEventPayload::Finished { steps, termination } => {
            vec![format!("\nLoop finished after {steps} steps ({termination})")]
        }
    }
}

/// Event sink that prints progress to stderr.
pub fn progress_sink() -> LoopEventSink {
    Arc::new(|event: LoopEvent| {
        for line in render_event(&event.payload) {
            eprintln!("{line}");
        }
    })
}

/// Summary lines for a finished run.
pub fn render_report(report: &TaskReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Task: {}", report.task_id));
    match &report.evaluation {
        Evaluation::Scored { reward, content } => {
            lines.push(format!("📊 Reward: {reward}"));
            if let Some(content) = content {
                lines.push(format!("   {}", preview(content, RESULT_PREVIEW_CHARS)));
            }
        }
        Evaluation::Failed { content } => {
            lines.push(format!(
                "❌ Evaluation failed: {}",
                preview(content, RESULT_PREVIEW_CHARS)
            ));
        }
        Evaluation::Skipped => lines.push("📊 No evaluation tool defined".to_string()),
    }
    lines.push(format!("Total steps: {}", report.steps));
    lines.push(format!("Tool rounds: {}", report.tool_rounds));
    if report.completed() {
        lines.push("✅ Task completed".to_string());
    } else {
        lines.push("⚠️ Step budget exhausted before the agent finished".to_string());
    }
    lines
}

/// The task's environment description as pretty JSON, if it has one.
pub fn render_environment(task: &Task) -> Option<String> {
    let env = task.mcp_config.as_ref()?;
    let pretty = serde_json::to_string_pretty(env).ok()?;
    Some(format!("🌐 Environment:\n{pretty}"))
}

/// Truncate to `max` characters, appending `...` when cut.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.trim();
    match flat.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &flat[..end]),
        None => flat.to_string(),
    }
}
