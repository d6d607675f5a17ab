//! Document rewriter: turns a pending command line into its `-!`-marked,
//! already-answered form with the assistant's response inserted beneath it.

use crate::error::CoreError;

/// One resolved command awaiting insertion back into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    pub original_line: String,
    pub response: String,
}

/// Replace the first `!` in `line` with `-!`, marking the command as
/// already processed so a later pass won't re-run it.
fn insert_invalidation_marker(line: &str) -> String {
    match line.find('!') {
        Some(idx) => format!("{}-!{}", &line[..idx], &line[idx + 1..]),
        None => line.to_string(),
    }
}

fn is_command_line(line: &str) -> bool {
    line.trim_start().starts_with('!')
}

/// Rewrite `document`: every line matching (by trimmed equality) a pending
/// command's `original_line` is marked invalid and followed by a blank
/// line, then the response body. A further blank line is appended after the
/// response unless the next source line is already blank or is itself a
/// command line (spec.md §4.5 step 2). Every pair must match exactly one
/// line or the whole rewrite fails with [`CoreError::CommandNotFound`].
/// Trailing blank lines collapse to a single final newline, so
/// `rewrite_document(rewrite_document(d, pairs)?, &[])? ==
/// rewrite_document(d, pairs)?`.
pub fn rewrite_document(document: &str, pairs: &[PendingCommand]) -> Result<String, CoreError> {
    let lines: Vec<&str> = document.lines().collect();
    let mut matched = vec![false; pairs.len()];
    let mut output: Vec<String> = Vec::new();

    for (i, &line) in lines.iter().enumerate() {
        let hit = pairs
            .iter()
            .enumerate()
            .find(|(idx, pair)| !matched[*idx] && line.trim() == pair.original_line.trim());

        let Some((idx, pair)) = hit else {
            output.push(line.to_string());
            continue;
        };
        matched[idx] = true;

        if !output.last().is_none_or(|l: &String| l.trim().is_empty()) {
            output.push(String::new());
        }
        output.push(insert_invalidation_marker(line));
        output.push(String::new());
        output.extend(pair.response.lines().map(str::to_string));

        let next_is_blank_or_command = lines.get(i + 1).is_none_or(|&next| next.trim().is_empty() || is_command_line(next));
        if !next_is_blank_or_command {
            output.push(String::new());
        }
    }

    if let Some(unmatched_idx) = matched.iter().position(|m| !m) {
        return Err(CoreError::CommandNotFound {
            command: pairs[unmatched_idx].original_line.clone(),
        });
    }

    while output.last().is_some_and(|l| l.trim().is_empty()) {
        output.pop();
    }

    let mut result = output.join("\n");
    result.push('\n');
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_matched_command_with_response_inserted() {
        let doc = "intro\n!summarize #A#\nmore text\n";
        let pairs = vec![PendingCommand {
            original_line: "!summarize #A#".to_string(),
            response: "Here is the summary.".to_string(),
        }];

        let rewritten = rewrite_document(doc, &pairs).unwrap();
        assert_eq!(
            rewritten,
            "intro\n\n-!summarize #A#\n\nHere is the summary.\n\nmore text\n"
        );
    }

    #[test]
    fn unmatched_pending_command_is_an_error() {
        let doc = "no commands here\n";
        let pairs = vec![PendingCommand {
            original_line: "!missing".to_string(),
            response: "r".to_string(),
        }];
        let err = rewrite_document(doc, &pairs).unwrap_err();
        assert!(matches!(err, CoreError::CommandNotFound { .. }));
    }

    #[test]
    fn rewrite_is_idempotent_under_a_second_empty_pass() {
        let doc = "!ask #X#\n";
        let pairs = vec![PendingCommand {
            original_line: "!ask #X#".to_string(),
            response: "answer".to_string(),
        }];

        let once = rewrite_document(doc, &pairs).unwrap();
        let twice = rewrite_document(&once, &[]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn trailing_blank_lines_collapse_to_one_newline() {
        let doc = "!ask #X#\n\n\n\n";
        let pairs = vec![PendingCommand {
            original_line: "!ask #X#".to_string(),
            response: "answer".to_string(),
        }];
        let rewritten = rewrite_document(doc, &pairs).unwrap();
        assert!(rewritten.ends_with("answer\n"));
        assert!(!rewritten.ends_with("answer\n\n"));
    }

    #[test]
    fn no_forced_blank_line_when_next_source_line_is_already_blank() {
        let doc = "!ask #X#\n\nmore text\n";
        let pairs = vec![PendingCommand {
            original_line: "!ask #X#".to_string(),
            response: "answer".to_string(),
        }];
        let rewritten = rewrite_document(doc, &pairs).unwrap();
        assert_eq!(rewritten, "-!ask #X#\n\nanswer\n\nmore text\n");
    }

    #[test]
    fn no_forced_blank_line_when_next_source_line_is_a_command() {
        let doc = "!ask #X#\n!ask #Y#\n";
        let pairs = vec![
            PendingCommand { original_line: "!ask #X#".to_string(), response: "answer one".to_string() },
            PendingCommand { original_line: "!ask #Y#".to_string(), response: "answer two".to_string() },
        ];
        let rewritten = rewrite_document(doc, &pairs).unwrap();
        assert_eq!(
            rewritten,
            "-!ask #X#\n\nanswer one\n\n-!ask #Y#\n\nanswer two\n"
        );
    }

    #[test]
    fn multiline_response_is_inserted_verbatim() {
        let doc = "!ask #X#\n";
        let pairs = vec![PendingCommand {
            original_line: "!ask #X#".to_string(),
            response: "line one\nline two".to_string(),
        }];
        let rewritten = rewrite_document(doc, &pairs).unwrap();
        assert!(rewritten.contains("line one\nline two"));
    }
}
