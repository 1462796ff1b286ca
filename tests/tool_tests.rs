//! Tests for the tool system and registry executor.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use taskloop::agent_loop::{Executor, ToolPhase};
use taskloop::error::TaskLoopError;
use taskloop::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use taskloop::tools::*;
use taskloop::types::AgentToolCall;
use tempfile::TempDir;

fn echo_tool(name: &str) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        name,
        "Echo the text argument",
        AgentToolParameters::object()
            .string("text", "Text to echo", true),
        |args, _ctx: ToolExecutionContext| async move {
            let text = args.get_str("text")?;
            Ok(serde_json::json!({ "content": text }))
        },
    ))
}

fn call(id: &str, name: &str, args: serde_json::Value) -> AgentToolCall {
    AgentToolCall::new(id, name, args)
}

#[test]
fn parameter_builder_constructs_schema() {
    let params = AgentToolParameters::object()
        .string("query", "Search query", true)
        .number("limit", "Max results", false)
        .boolean("verbose", "Enable verbose output", false);

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert_eq!(schema["properties"]["limit"]["type"], "number");
    assert_eq!(params.required(), vec!["query"]);
}

#[test]
fn definition_carries_name_description_and_schema() {
    let tool = echo_tool("echo");
    let def = tool.definition();
    assert_eq!(tool.name(), "echo");
    assert_eq!(def.description, "Echo the text argument");
    assert_eq!(def.parameters.required(), vec!["text"]);
}

#[test]
fn tool_arguments_accept_string_encoded_json() {
    let args = ToolArguments::new(serde_json::json!("{\"path\": \"a.txt\"}"));
    assert_eq!(args.get_str("path").unwrap(), "a.txt");
    assert!(args.get_str("missing").is_err());
}

#[tokio::test]
async fn registry_returns_one_result_per_call_in_order() {
    let registry = ToolRegistry::from_tools(vec![echo_tool("echo")]);
    let results = registry
        .execute(&[
            call("1", "echo", serde_json::json!({"text": "first"})),
            call("2", "echo", serde_json::json!({"text": "second"})),
        ])
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tool_call_id, "1");
    assert_eq!(results[0].result["content"], "first");
    assert_eq!(results[1].result["content"], "second");
}

#[tokio::test]
async fn unknown_tool_and_bad_arguments_become_error_results() {
    let registry = ToolRegistry::from_tools(vec![echo_tool("echo")]);
    let results = registry
        .execute(&[
            call("1", "nope", serde_json::json!({})),
            call("2", "echo", serde_json::json!({})),
        ])
        .await
        .unwrap();

    assert!(results[0].is_error);
    assert!(results[0].text().contains("not found"));
    assert!(results[1].is_error);
}

#[tokio::test]
async fn disallowed_tools_are_hidden_and_refused() {
    let registry = ToolRegistry::from_tools(vec![echo_tool("echo"), echo_tool("other")])
        .with_allowed_tools(Some(vec!["echo".to_string()]));

    let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["echo"]);

    let results = registry
        .execute(&[call("1", "other", serde_json::json!({"text": "x"}))])
        .await
        .unwrap();
    assert!(results[0].is_error);
    assert!(results[0].text().contains("not allowed"));
}

#[test]
fn register_replaces_tool_with_same_name() {
    let mut registry = ToolRegistry::new();
    registry.register(echo_tool("echo"));
    registry.register(echo_tool("echo"));
    assert_eq!(registry.names(), vec!["echo"]);
}

#[tokio::test]
async fn builtin_tools_share_a_workspace() {
    let dir = TempDir::new().unwrap();
    let registry = ToolRegistry::from_tools(builtin::all_tools(Some(dir.path().to_path_buf())));

    let results = registry
        .execute(&[
            call("w", "write_file", serde_json::json!({"path": "note.txt", "content": "hello"})),
            call("s", "shell", serde_json::json!({"command": "cat note.txt"})),
            call("r", "read_file", serde_json::json!({"path": "note.txt"})),
        ])
        .await
        .unwrap();

    assert!(results.iter().all(|r| !r.is_error), "{results:?}");
    assert_eq!(results[1].result["output"], "hello");
    assert_eq!(results[1].result["exit_code"], 0);
    assert_eq!(results[2].result["content"], "hello");
    assert!(dir.path().join("note.txt").is_file());
}

#[tokio::test]
async fn tool_error_becomes_error_result() {
    let failing: Arc<dyn Tool> = Arc::new(AgentTool::new(
        "broken",
        "Always fails",
        AgentToolParameters::empty(),
        |_args, _ctx: ToolExecutionContext| async move {
            Err(TaskLoopError::tool("broken", "no environment"))
        },
    ));
    let registry = ToolRegistry::from_tools(vec![failing]);
    let results = registry
        .execute(&[call("1", "broken", serde_json::Value::Null)])
        .await
        .unwrap();
    assert!(results[0].is_error);
    assert!(results[0].text().contains("no environment"));
}

fn phase_reporting_tool(name: &str) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        name,
        "Report which phase issued the call",
        AgentToolParameters::empty(),
        |_args, ctx: ToolExecutionContext| async move {
            Ok(serde_json::json!({ "call_id": ctx.call_id, "phase": ctx.phase.to_string() }))
        },
    ))
}

#[tokio::test]
async fn task_calls_bypass_the_allow_list() {
    let registry = ToolRegistry::from_tools(vec![echo_tool("echo"), phase_reporting_tool("grade")])
        .with_allowed_tools(Some(vec!["echo".to_string()]));

    let refused = registry
        .execute(&[call("m", "grade", serde_json::json!({}))])
        .await
        .unwrap();
    assert!(refused[0].text().contains("not allowed"));

    let results = registry
        .execute_task_calls(ToolPhase::Evaluate, &[call("e", "grade", serde_json::json!({}))])
        .await
        .unwrap();
    assert!(!results[0].is_error, "{results:?}");
    assert_eq!(results[0].result["call_id"], "e");
    assert_eq!(results[0].result["phase"], "evaluate");
}

#[tokio::test]
async fn model_calls_run_in_the_agent_phase() {
    let registry = ToolRegistry::from_tools(vec![phase_reporting_tool("grade")]);
    let results = registry
        .execute(&[call("a", "grade", serde_json::json!({}))])
        .await
        .unwrap();
    assert_eq!(results[0].result["phase"], "agent");
}

#[tokio::test]
async fn task_calls_still_report_missing_tools() {
    let registry = ToolRegistry::from_tools(vec![echo_tool("echo")]);
    let results = registry
        .execute_task_calls(ToolPhase::Setup, &[call("s", "nope", serde_json::json!({}))])
        .await
        .unwrap();
    assert!(results[0].is_error);
    assert!(results[0].text().contains("not found"));
}
