use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// A single declared environment requirement: `VAR: {type, description, default?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvRequirement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub default: Option<String>,
}

/// The JSON-schema-shaped parameter document returned by `--usage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Full `--usage` stdout document: `{ schema: {...}, env: {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageDocument {
    pub schema: ToolSchema,
    #[serde(default)]
    pub env: HashMap<String, EnvRequirement>,
}

/// `--health` stdout document: `{ status: bool, details: string }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDocument {
    pub status: bool,
    #[serde(default)]
    pub details: String,
}

/// A cached, compiled, introspected tool descriptor.
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: String,
    pub binary_path: PathBuf,
    pub schema: ToolSchema,
    pub env_requirements: HashMap<String, EnvRequirement>,
    pub last_built: SystemTime,
}

/// Structural-only validation of `input` against `schema.parameters`: root
/// must be `"object"`, `properties` must itself be an object, and every name
/// listed in `required` must be a top-level key of `input`. Not a full
/// JSON-schema validator.
pub fn validate_input(tool_name: &str, schema: &ToolSchema, input: &Value) -> Result<(), ToolError> {
    let params = schema.parameters.as_object().ok_or_else(|| ToolError::SchemaError {
        name: tool_name.to_string(),
        reason: "parameters is not a JSON object".to_string(),
    })?;

    let root_type = params.get("type").and_then(Value::as_str);
    if root_type != Some("object") {
        return Err(ToolError::SchemaError {
            name: tool_name.to_string(),
            reason: "parameters.type must be \"object\"".to_string(),
        });
    }

    if let Some(properties) = params.get("properties") {
        if !properties.is_object() {
            return Err(ToolError::SchemaError {
                name: tool_name.to_string(),
                reason: "parameters.properties must be an object".to_string(),
            });
        }
    }

    let input_obj = input.as_object().ok_or_else(|| ToolError::InvalidToolInput {
        name: tool_name.to_string(),
        reason: "input is not a JSON object".to_string(),
    })?;

    if let Some(required) = params.get("required").and_then(Value::as_array) {
        for name in required {
            let Some(name) = name.as_str() else {
                return Err(ToolError::SchemaError {
                    name: tool_name.to_string(),
                    reason: "parameters.required entries must be strings".to_string(),
                });
            };
            if !input_obj.contains_key(name) {
                return Err(ToolError::InvalidToolInput {
                    name: tool_name.to_string(),
                    reason: format!("missing required field `{name}`"),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(params: Value) -> ToolSchema {
        ToolSchema {
            name: "t".to_string(),
            description: "desc".to_string(),
            parameters: params,
        }
    }

    #[test]
    fn accepts_object_with_required_fields_present() {
        let s = schema(json!({"type": "object", "properties": {"text": {}}, "required": ["text"]}));
        assert!(validate_input("t", &s, &json!({"text": "hi"})).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let s = schema(json!({"type": "object", "required": ["text"]}));
        let err = validate_input("t", &s, &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidToolInput { .. }));
    }

    #[test]
    fn rejects_non_object_root_type() {
        let s = schema(json!({"type": "array"}));
        let err = validate_input("t", &s, &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::SchemaError { .. }));
    }

    #[test]
    fn rejects_non_object_input() {
        let s = schema(json!({"type": "object"}));
        let err = validate_input("t", &s, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidToolInput { .. }));
    }
}
