//! Default formatting of a tool round into conversation messages.

use crate::types::{AgentResponse, AgentToolResult, ModelMessage};

use super::collaborators::ResultFormatter;

/// Appends one assistant message holding the response text and tool calls,
/// followed by one tool message per result. This is the shape Chat
/// Completions style APIs expect on the next request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolMessageFormatter;

impl ResultFormatter for ToolMessageFormatter {
    fn format(&self, response: &AgentResponse, results: &[AgentToolResult]) -> Vec<ModelMessage> {
        let mut messages = Vec::with_capacity(results.len() + 1);
        messages.push(ModelMessage::assistant_tool_calls(
            response.content.as_deref(),
            &response.tool_calls,
        ));
        messages.extend(results.iter().cloned().map(ModelMessage::tool_result));
        messages
    }
}
