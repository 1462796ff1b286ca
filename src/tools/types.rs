//! Parameter schemas and the tool definitions offered to the model.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// JSON Schema for a tool's arguments. Serializes as the bare schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AgentToolParameters {
    pub schema: Value,
}

impl AgentToolParameters {
    pub fn from_schema(schema: Value) -> Self {
        Self { schema }
    }

    /// An object schema without properties.
    pub fn empty() -> Self {
        Self::object()
    }

    /// Start an object schema; chain `string`/`number`/`boolean` to add
    /// properties.
    pub fn object() -> Self {
        Self::from_schema(json!({ "type": "object", "properties": {}, "required": [] }))
    }

    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.with_property(name.into(), "string", description.into(), required)
    }

    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.with_property(name.into(), "number", description.into(), required)
    }

    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.with_property(name.into(), "boolean", description.into(), required)
    }

    /// Names listed under `required`.
    pub fn required(&self) -> Vec<&str> {
        self.schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn with_property(mut self, name: String, kind: &str, description: String, required: bool) -> Self {
        let Some(obj) = self.schema.as_object_mut() else {
            return self;
        };
        if let Some(props) = obj.entry("properties").or_insert_with(|| json!({})).as_object_mut() {
            props.insert(name.clone(), json!({ "type": kind, "description": description }));
        }
        if required {
            if let Some(names) = obj.entry("required").or_insert_with(|| json!([])).as_array_mut() {
                names.push(Value::String(name));
            }
        }
        self
    }
}

/// What the model sees of a tool: name, purpose and argument schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: AgentToolParameters,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
