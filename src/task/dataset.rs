//! Local dataset files.
//!
//! A `.jsonl` file holds one task per non-blank line. Any other file holds a
//! JSON array of tasks or a single task object. Tasks without an `id` get
//! their position in the file.

use std::path::Path;

use crate::error::{Result, TaskLoopError};

use super::Task;

/// Load every task in a dataset file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<Task>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| TaskLoopError::Dataset(format!("cannot read {}: {e}", path.display())))?;
    let jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    let tasks = parse_dataset(&raw, jsonl)?;
    tracing::debug!(path = %path.display(), tasks = tasks.len(), "loaded dataset");
    Ok(tasks)
}

/// Load the task at `index`.
pub fn load_task(path: impl AsRef<Path>, index: usize) -> Result<Task> {
    let mut tasks = load_dataset(path)?;
    let count = tasks.len();
    if index >= count {
        return Err(TaskLoopError::InvalidArgument(format!(
            "task index {index} out of range (dataset has {count} tasks)"
        )));
    }
    Ok(tasks.swap_remove(index))
}

/// Parse dataset text, as JSON lines or as a JSON document.
pub fn parse_dataset(raw: &str, jsonl: bool) -> Result<Vec<Task>> {
    let mut tasks = if jsonl {
        parse_lines(raw)?
    } else {
        parse_document(raw)?
    };

    for (index, task) in tasks.iter_mut().enumerate() {
        if task.id.is_none() {
            task.id = Some(index.to_string());
        }
    }
    Ok(tasks)
}

fn parse_lines(raw: &str) -> Result<Vec<Task>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|e| TaskLoopError::Dataset(format!("line {}: {e}", n + 1)))
        })
        .collect()
}

fn parse_document(raw: &str) -> Result<Vec<Task>> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| TaskLoopError::Dataset(format!("invalid JSON: {e}")))?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        object @ serde_json::Value::Object(_) => vec![object],
        _ => {
            return Err(TaskLoopError::Dataset(
                "expected a task object or an array of tasks".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| TaskLoopError::Dataset(format!("task {i}: {e}")))
        })
        .collect()
}
