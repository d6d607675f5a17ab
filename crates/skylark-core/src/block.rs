//! Markdown block segmentation: a line-classification state machine that
//! groups consecutive lines of the same kind into one [`Block`], flushing on
//! a type change or a blank line.

/// A Markdown block. Modeled as a sum type over a fixed set of kinds per
/// the data model — not a class hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Header { level: u8, content: String },
    Paragraph(String),
    List(String),
    Quote(String),
    Table(String),
    Code(String),
}

impl Block {
    pub fn content(&self) -> &str {
        match self {
            Block::Header { content, .. } => content,
            Block::Paragraph(c) | Block::List(c) | Block::Quote(c) | Block::Table(c) | Block::Code(c) => c,
        }
    }

    pub fn header_level(&self) -> Option<u8> {
        match self {
            Block::Header { level, .. } => Some(*level),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Paragraph,
    List,
    Quote,
    Table,
    Code,
}

fn header_level(trimmed: &str) -> Option<u8> {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) { Some(hashes as u8) } else { None }
}

fn flush(current: &mut Option<(Kind, Vec<String>)>, blocks: &mut Vec<Block>) {
    if let Some((kind, lines)) = current.take() {
        let content = lines.join("\n");
        blocks.push(match kind {
            Kind::Paragraph => Block::Paragraph(content),
            Kind::List => Block::List(content),
            Kind::Quote => Block::Quote(content),
            Kind::Table => Block::Table(content),
            Kind::Code => Block::Code(content),
        });
    }
}

/// Segment `text` into an ordered sequence of [`Block`]s.
pub fn segment_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<(Kind, Vec<String>)> = None;
    let mut in_code = false;

    for line in text.lines() {
        if in_code {
            if line.trim_start().starts_with("```") {
                in_code = false;
                flush(&mut current, &mut blocks);
            } else {
                current.get_or_insert((Kind::Code, Vec::new())).1.push(line.to_string());
            }
            continue;
        }

        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            flush(&mut current, &mut blocks);
            in_code = true;
            current = Some((Kind::Code, Vec::new()));
            continue;
        }

        if trimmed.is_empty() {
            flush(&mut current, &mut blocks);
            continue;
        }

        if let Some(level) = header_level(trimmed) {
            flush(&mut current, &mut blocks);
            let content = trimmed[level as usize..].trim().to_string();
            blocks.push(Block::Header { level, content });
            continue;
        }

        let kind = if trimmed.starts_with('-') || trimmed.starts_with('*') {
            Kind::List
        } else if trimmed.starts_with('>') {
            Kind::Quote
        } else if trimmed.starts_with('|') {
            Kind::Table
        } else {
            Kind::Paragraph
        };

        let line_content = if kind == Kind::Quote {
            trimmed.trim_start_matches('>').trim_start().to_string()
        } else {
            line.to_string()
        };

        match &mut current {
            Some((current_kind, lines)) if *current_kind == kind => lines.push(line_content),
            _ => {
                flush(&mut current, &mut blocks);
                current = Some((kind, vec![line_content]));
            }
        }
    }

    flush(&mut current, &mut blocks);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_header_levels() {
        let blocks = segment_blocks("# Title\n## Sub");
        assert_eq!(
            blocks,
            vec![
                Block::Header { level: 1, content: "Title".to_string() },
                Block::Header { level: 2, content: "Sub".to_string() },
            ]
        );
    }

    #[test]
    fn accumulates_consecutive_paragraph_lines() {
        let blocks = segment_blocks("line one\nline two");
        assert_eq!(blocks, vec![Block::Paragraph("line one\nline two".to_string())]);
    }

    #[test]
    fn blank_line_flushes_the_current_block() {
        let blocks = segment_blocks("para one\n\npara two");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("para one".to_string()),
                Block::Paragraph("para two".to_string()),
            ]
        );
    }

    #[test]
    fn quote_strips_leading_marker() {
        let blocks = segment_blocks("> quoted text");
        assert_eq!(blocks, vec![Block::Quote("quoted text".to_string())]);
    }

    #[test]
    fn code_fence_preserves_interior_verbatim() {
        let blocks = segment_blocks("```\n# not a header\n- not a list\n```");
        assert_eq!(
            blocks,
            vec![Block::Code("# not a header\n- not a list".to_string())]
        );
    }

    #[test]
    fn type_change_flushes_without_blank_line() {
        let blocks = segment_blocks("- item one\n> quote");
        assert_eq!(
            blocks,
            vec![
                Block::List("- item one".to_string()),
                Block::Quote("quote".to_string()),
            ]
        );
    }
}
