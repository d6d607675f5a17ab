//! Per-command state machine: direct-tool short-circuit, otherwise a
//! provider round trip with at most one tool-call fan-out and one re-prompt.

use std::collections::HashMap;

use skylark_llm::{ProviderError, ProviderResponse, SendOptions};
use tracing::{debug, instrument};

use crate::assistant::{Assistant, AssistantManager};
use crate::block::Block;
use crate::command::Command;
use crate::error::CoreError;

/// `use <tool> [json]` recognized case-insensitively at the start of a
/// command's text. An empty remainder after the tool name is input `{}`;
/// anything else must parse as JSON.
fn parse_direct_tool(text: &str) -> Result<Option<(String, String)>, CoreError> {
    let trimmed = text.trim_start();
    if !trimmed.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("use ")) {
        return Ok(None);
    }

    let remainder = trimmed[4..].trim_start();
    let (name, json_part) = match remainder.find(char::is_whitespace) {
        Some(idx) => (remainder[..idx].to_string(), remainder[idx..].trim().to_string()),
        None => (remainder.to_string(), String::new()),
    };

    if name.is_empty() {
        return Ok(None);
    }

    let input = if json_part.is_empty() {
        "{}".to_string()
    } else {
        serde_json::from_str::<serde_json::Value>(&json_part).map_err(|e| CoreError::InvalidCommand {
            reason: format!("direct tool input is not valid JSON: {e}"),
        })?;
        json_part
    };

    Ok(Some((name, input)))
}

fn ensure_tool_allowed(assistant: &Assistant, tool_name: &str) -> Result<(), CoreError> {
    if assistant.tool_allowlist.is_empty() || assistant.tool_allowlist.contains(tool_name) {
        Ok(())
    } else {
        Err(CoreError::InvalidCommand {
            reason: format!("tool `{tool_name}` is not permitted for assistant `{}`", assistant.name),
        })
    }
}

async fn invoke_tool(
    assistant: &Assistant,
    assistants: &AssistantManager,
    tool_name: &str,
    input: &[u8],
) -> Result<Vec<u8>, CoreError> {
    ensure_tool_allowed(assistant, tool_name)?;
    let tool = assistants.tools.load_tool(tool_name).await?;
    let output = skylark_tools::execute_tool(&tool, input, &HashMap::new(), &assistants.sandbox).await?;
    Ok(output)
}

fn build_prompt(assistant: &Assistant, text: &str, context: &HashMap<String, Block>) -> String {
    let mut prompt = String::new();
    prompt.push_str(&assistant.system_prompt);
    prompt.push('\n');

    if !assistant.tool_allowlist.is_empty() {
        let mut names: Vec<&String> = assistant.tool_allowlist.iter().collect();
        names.sort();
        prompt.push_str("Available tools:\n");
        for name in names {
            prompt.push_str(&format!("- {name}\n"));
        }
    }

    if !context.is_empty() {
        let mut labels: Vec<&String> = context.keys().collect();
        labels.sort();
        prompt.push_str("Context:\n");
        for label in labels {
            prompt.push_str(&format!("## {label}\n{}\n", context[label].content()));
        }
    }

    prompt.push_str(&format!("Command: {text}\n"));
    prompt
}

/// Abort the command if the provider reported a response-level failure,
/// per spec.md §4.2 step 3.
fn check_response_error(provider_name: &str, response: &ProviderResponse) -> Result<(), CoreError> {
    if let Some(message) = &response.error {
        return Err(CoreError::Provider(ProviderError::Response {
            provider: provider_name.to_string(),
            message: message.clone(),
        }));
    }
    Ok(())
}

/// Run one command to completion. A direct `use <tool>` command runs the
/// tool first and folds its result into the command text (`"\nTool result:
/// {result}"`) before proceeding through the same BUILD_PROMPT → SEND path
/// as any other command — it is not a shortcut around the provider. Any
/// provider-initiated tool calls from that send are executed in the order
/// returned and folded into a single re-prompt; the second response's own
/// tool calls (if any) are ignored.
#[instrument(skip(context, assistants))]
pub async fn run_command(
    command: &Command,
    context: &HashMap<String, Block>,
    assistants: &AssistantManager,
) -> Result<String, CoreError> {
    let assistant = assistants.get(&command.assistant)?;

    let text = if let Some((tool_name, input)) = parse_direct_tool(&command.text)? {
        debug!(tool = %tool_name, "direct tool invocation");
        let output = invoke_tool(&assistant, assistants, &tool_name, input.as_bytes()).await?;
        format!("{}\nTool result: {}", command.text, String::from_utf8_lossy(&output))
    } else {
        command.text.clone()
    };

    let prompt = build_prompt(&assistant, &text, context);
    let (provider, model) = assistants.registry.resolve(&assistant.model_spec)?;
    let options = SendOptions::new(model);

    let response = provider.send(&prompt, &options).await?;
    check_response_error(provider.name(), &response)?;
    if response.tool_calls.is_empty() {
        return Ok(response.content);
    }

    let mut followup = prompt;
    for call in &response.tool_calls {
        let output = invoke_tool(&assistant, assistants, &call.fn_name, call.fn_args.as_bytes()).await?;
        followup.push_str(&format!(
            "\nTool '{}' result: {}",
            call.fn_name,
            String::from_utf8_lossy(&output)
        ));
    }

    let second = provider.send(&followup, &options).await?;
    check_response_error(provider.name(), &second)?;
    Ok(second.content)
}
