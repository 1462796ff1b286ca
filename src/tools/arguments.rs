//! Typed access to tool call arguments.

use crate::error::TaskLoopError;

/// Wrapper around tool call arguments providing typed extraction.
///
/// Models sometimes send arguments as a JSON-encoded string; those are
/// decoded on construction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        let value = match value {
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(trimmed).unwrap_or(serde_json::Value::String(raw))
                }
            }
            serde_json::Value::Null => serde_json::json!({}),
            other => other,
        };
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, TaskLoopError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| TaskLoopError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, TaskLoopError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| TaskLoopError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, TaskLoopError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| TaskLoopError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, TaskLoopError> {
        serde_json::from_value(self.value.clone())
            .map_err(|e| TaskLoopError::InvalidArgument(format!("Invalid tool arguments: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_encoded_arguments_are_decoded() {
        let args = ToolArguments::new(serde_json::json!(r#"{"command": "ls"}"#));
        assert_eq!(args.get_str("command").unwrap(), "ls");
    }

    #[test]
    fn empty_and_null_arguments_become_empty_object() {
        assert_eq!(ToolArguments::new(serde_json::json!("  ")).raw(), &serde_json::json!({}));
        assert_eq!(ToolArguments::new(serde_json::Value::Null).raw(), &serde_json::json!({}));
    }

    #[test]
    fn typed_getters_report_missing_keys() {
        let args = ToolArguments::new(serde_json::json!({"n": 3, "flag": true}));
        assert_eq!(args.get_i64("n").unwrap(), 3);
        assert!(args.get_bool("flag").unwrap());
        assert_eq!(args.get_str_opt("nope"), None);
        let err = args.get_str("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
