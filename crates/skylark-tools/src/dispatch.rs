use std::collections::HashMap;

use serde_json::Value;
use skylark_sandbox::{ChildSpec, Sandbox};

use crate::error::ToolError;
use crate::schema::{Tool, validate_input};

/// Parse `input` as JSON and run the structural schema checks of
/// [`validate_input`]. Non-JSON input is `InvalidToolInput`, matching the
/// `ValidateInput` step of the tool invocation path.
pub fn validate_input_bytes(tool: &Tool, input: &[u8]) -> Result<Value, ToolError> {
    let value: Value = serde_json::from_slice(input).map_err(|e| ToolError::InvalidToolInput {
        name: tool.name.clone(),
        reason: format!("input is not valid JSON: {e}"),
    })?;
    validate_input(&tool.name, &tool.schema, &value)?;
    Ok(value)
}

/// Assemble the environment a tool's child process receives: `PATH` from the
/// host always, then for each declared env-requirement, caller-provided >
/// non-empty host value > declared default > omitted.
pub fn assemble_env(tool: &Tool, caller_env: &HashMap<String, String>) -> HashMap<String, String> {
    let mut env = HashMap::new();
    if let Ok(path) = std::env::var("PATH") {
        env.insert("PATH".to_string(), path);
    }

    for (name, requirement) in &tool.env_requirements {
        if let Some(value) = caller_env.get(name) {
            env.insert(name.clone(), value.clone());
            continue;
        }
        if let Ok(host_value) = std::env::var(name) {
            if !host_value.is_empty() {
                env.insert(name.clone(), host_value);
                continue;
            }
        }
        if let Some(default) = &requirement.default {
            env.insert(name.clone(), default.clone());
        }
    }

    env
}

/// If `bytes` parses as JSON, re-serialize it pretty-printed with a 2-space
/// indent; otherwise return it verbatim.
pub fn format_output(bytes: Vec<u8>) -> Vec<u8> {
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            if serde::Serialize::serialize(&value, &mut serializer).is_ok() {
                buf
            } else {
                bytes
            }
        }
        Err(_) => bytes,
    }
}

/// Validate, assemble environment, and run `tool` with `input` under
/// `sandbox`. Returns the tool's stdout, pretty-printed if it parsed as
/// JSON.
pub async fn execute_tool(
    tool: &Tool,
    input: &[u8],
    caller_env: &HashMap<String, String>,
    sandbox: &Sandbox,
) -> Result<Vec<u8>, ToolError> {
    validate_input_bytes(tool, input)?;

    let mut spec = ChildSpec::new(tool.binary_path.to_string_lossy().into_owned());
    spec.env = assemble_env(tool, caller_env);
    spec.stdin = input.to_vec();

    let output = sandbox.execute(&spec).await?;
    Ok(format_output(output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnvRequirement, ToolSchema};
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn tool_with_env(reqs: HashMap<String, EnvRequirement>) -> Tool {
        Tool {
            name: "t".to_string(),
            binary_path: PathBuf::from("/bin/true"),
            schema: ToolSchema {
                name: "t".to_string(),
                description: "d".to_string(),
                parameters: json!({"type": "object"}),
            },
            env_requirements: reqs,
            last_built: SystemTime::now(),
        }
    }

    #[test]
    fn caller_value_wins_over_default() {
        let mut reqs = HashMap::new();
        reqs.insert(
            "API_KEY".to_string(),
            EnvRequirement {
                kind: "string".to_string(),
                description: "".to_string(),
                default: Some("fallback".to_string()),
            },
        );
        let tool = tool_with_env(reqs);
        let mut caller = HashMap::new();
        caller.insert("API_KEY".to_string(), "caller-value".to_string());

        let env = assemble_env(&tool, &caller);
        assert_eq!(env.get("API_KEY"), Some(&"caller-value".to_string()));
    }

    #[test]
    fn default_used_when_nothing_else_supplied() {
        let mut reqs = HashMap::new();
        reqs.insert(
            "MODE".to_string(),
            EnvRequirement {
                kind: "string".to_string(),
                description: "".to_string(),
                default: Some("prod".to_string()),
            },
        );
        let tool = tool_with_env(reqs);
        let env = assemble_env(&tool, &HashMap::new());
        assert_eq!(env.get("MODE"), Some(&"prod".to_string()));
    }

    #[test]
    fn omitted_when_no_source_provides_a_value() {
        let mut reqs = HashMap::new();
        reqs.insert(
            "OPTIONAL".to_string(),
            EnvRequirement {
                kind: "string".to_string(),
                description: "".to_string(),
                default: None,
            },
        );
        let tool = tool_with_env(reqs);
        let env = assemble_env(&tool, &HashMap::new());
        assert!(!env.contains_key("OPTIONAL"));
    }

    #[test]
    fn format_output_pretty_prints_json() {
        let formatted = format_output(br#"{"a":1}"#.to_vec());
        assert_eq!(String::from_utf8(formatted).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn format_output_passes_through_non_json() {
        let formatted = format_output(b"plain text".to_vec());
        assert_eq!(formatted, b"plain text");
    }

    #[test]
    fn validate_input_bytes_rejects_non_json() {
        let tool = tool_with_env(HashMap::new());
        let err = validate_input_bytes(&tool, b"not json").unwrap_err();
        assert!(matches!(err, ToolError::InvalidToolInput { .. }));
    }
}
