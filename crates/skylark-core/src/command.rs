use std::collections::HashMap;

use crate::block::Block;
use crate::error::CoreError;
use crate::limits::MAX_COMMAND_BYTES;
use crate::reference::extract_references;

/// An inline `!`-command recognized on a single source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub assistant: String,
    pub text: String,
    pub original_line: String,
    pub references: Vec<String>,
}

fn is_assistant_name_char_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_assistant_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '-'
}

/// Split `!<rest>` into `(assistant, text)`. The first whitespace-delimited
/// token is the assistant name iff it matches `[A-Za-z][A-Za-z-]*` and is
/// followed by whitespace then non-empty text; otherwise the assistant is
/// `"default"` and `rest` (right-trimmed) is the whole text.
fn split_assistant(rest: &str) -> (String, String) {
    let rest = rest.trim_end();
    if let Some(space_idx) = rest.find(char::is_whitespace) {
        let (candidate, remainder) = rest.split_at(space_idx);
        let remainder = remainder.trim_start();
        let is_valid_name = !candidate.is_empty()
            && candidate.chars().next().is_some_and(is_assistant_name_char_start)
            && candidate.chars().all(is_assistant_name_char);

        if is_valid_name && !remainder.is_empty() {
            return (candidate.to_lowercase(), remainder.to_string());
        }
    }
    ("default".to_string(), rest.to_string())
}

/// Parse one source line as a command. Returns `Ok(None)` when the line,
/// after left-trimming, does not start with `!`.
pub fn parse_command_line(line: &str) -> Result<Option<Command>, CoreError> {
    let left_trimmed = line.trim_start();
    let Some(rest) = left_trimmed.strip_prefix('!') else {
        return Ok(None);
    };

    let (assistant, text) = split_assistant(rest);

    if text.len() > MAX_COMMAND_BYTES {
        return Err(CoreError::InvalidCommand {
            reason: format!("command text exceeds MAX_COMMAND_BYTES ({MAX_COMMAND_BYTES})"),
        });
    }

    let references = extract_references(&text);

    Ok(Some(Command {
        assistant,
        text,
        original_line: line.to_string(),
        references,
    }))
}

/// Build the context map for `command` against the document's blocks, per
/// `ExtractContext`'s size bounding.
pub fn build_command_context(
    command: &Command,
    blocks: &[Block],
) -> Result<HashMap<String, Block>, CoreError> {
    crate::context::extract_context(blocks, &command.references)
}
