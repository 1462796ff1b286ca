//! Built-in environment tools.
//!
//! `shell`, `read_file` and `write_file` give a task a local environment to
//! act on: setup and evaluation tools in a dataset are usually `shell`
//! calls, and the model drives the same tools during the loop. Relative
//! paths and commands resolve against the workspace directory when one is
//! set.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::TaskLoopError;
use crate::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use crate::tools::types::AgentToolParameters;

const SHELL_OUTPUT_MAX_BYTES: usize = 32_768;
const READ_FILE_MAX_BYTES: usize = 65_536;
const SHELL_TIMEOUT: Duration = Duration::from_secs(30);

fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut cutoff = max_bytes;
    while cutoff > 0 && !s.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    s[..cutoff].to_string()
}

fn resolve(workspace: Option<&Path>, path: &str) -> PathBuf {
    match workspace {
        Some(root) if Path::new(path).is_relative() => root.join(path),
        _ => PathBuf::from(path),
    }
}

/// Create the `shell` tool: runs `sh -c <command>`.
///
/// Captures stdout and stderr, applies a 30-second timeout and truncates
/// output beyond 32 KB. A non-zero exit code is reported in the result, not
/// as a failure.
pub fn shell_tool(workspace: Option<PathBuf>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "shell",
        "Execute a shell command and return its output",
        AgentToolParameters::object()
            .string("command", "The shell command to execute", true),
        move |args, ctx: ToolExecutionContext| {
            let workspace = workspace.clone();
            async move {
                let command = args.get_str("command")?;
                debug!(call_id = %ctx.call_id, phase = %ctx.phase, command, "running shell command");

                let mut cmd = tokio::process::Command::new("sh");
                cmd.arg("-c").arg(command).kill_on_drop(true);
                if let Some(dir) = &workspace {
                    cmd.current_dir(dir);
                }

                let output = match tokio::time::timeout(SHELL_TIMEOUT, cmd.output()).await {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => return Err(TaskLoopError::tool("shell", e.to_string())),
                    Err(_) => {
                        return Err(TaskLoopError::tool(
                            "shell",
                            format!("command timed out after {}s", SHELL_TIMEOUT.as_secs()),
                        ))
                    }
                };

                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let mut combined = format!("{stdout}{stderr}");
                let truncated = combined.len() > SHELL_OUTPUT_MAX_BYTES;
                if truncated {
                    combined = truncate_utf8(&combined, SHELL_OUTPUT_MAX_BYTES);
                    combined.push_str("\n... (truncated)");
                }

                Ok(serde_json::json!({
                    "exit_code": output.status.code(),
                    "output": combined,
                    "truncated": truncated,
                }))
            }
        },
    ))
}

/// Create the `read_file` tool: reads a file as UTF-8 text, capped at 64 KB.
pub fn read_file_tool(workspace: Option<PathBuf>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "read_file",
        "Read a file's contents as UTF-8 text",
        AgentToolParameters::object()
            .string("path", "Path to the file to read", true),
        move |args, _ctx: ToolExecutionContext| {
            let workspace = workspace.clone();
            async move {
                let path = resolve(workspace.as_deref(), args.get_str("path")?);

                let content = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| TaskLoopError::tool("read_file", format!("{}: {e}", path.display())))?;

                let total_bytes = content.len();
                let truncated = total_bytes > READ_FILE_MAX_BYTES;
                let content = if truncated {
                    let mut s = truncate_utf8(&content, READ_FILE_MAX_BYTES);
                    s.push_str("\n... (truncated)");
                    s
                } else {
                    content
                };

                Ok(serde_json::json!({
                    "content": content,
                    "bytes": total_bytes,
                    "truncated": truncated,
                }))
            }
        },
    ))
}

/// Create the `write_file` tool: writes a file, creating parent directories.
pub fn write_file_tool(workspace: Option<PathBuf>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "write_file",
        "Write content to a file, creating parent directories if needed",
        AgentToolParameters::object()
            .string("path", "Path to the file to write", true)
            .string("content", "Content to write to the file", true),
        move |args, _ctx: ToolExecutionContext| {
            let workspace = workspace.clone();
            async move {
                let path = resolve(workspace.as_deref(), args.get_str("path")?);
                let content = args.get_str("content")?;

                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        TaskLoopError::tool(
                            "write_file",
                            format!("failed to create directories for {}: {e}", path.display()),
                        )
                    })?;
                }

                tokio::fs::write(&path, content)
                    .await
                    .map_err(|e| TaskLoopError::tool("write_file", format!("{}: {e}", path.display())))?;

                Ok(serde_json::json!({
                    "success": true,
                    "path": path.display().to_string(),
                    "bytes_written": content.len(),
                }))
            }
        },
    ))
}

/// All built-in tools rooted at `workspace`.
pub fn all_tools(workspace: Option<PathBuf>) -> Vec<Arc<dyn Tool>> {
    vec![
        shell_tool(workspace.clone()),
        read_file_tool(workspace.clone()),
        write_file_tool(workspace),
    ]
}
