use std::collections::HashMap;

use tracing::warn;

use crate::block::Block;
use crate::error::CoreError;
use crate::limits::{MAX_SECTION_BYTES, MAX_TOTAL_BYTES};
use crate::reference::{Reference, derive_references, normalize};

/// Indices of blocks whose normalized content contains the normalized
/// `reference`. An empty result is a warning, not a fatal error.
pub fn match_blocks(blocks: &[Block], reference: &str) -> Vec<usize> {
    let needle = normalize(reference);
    if needle.is_empty() {
        return Vec::new();
    }
    let indices: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| normalize(b.content()).contains(&needle))
        .map(|(i, _)| i)
        .collect();

    if indices.is_empty() {
        warn!(reference, "no blocks matched reference");
    }
    indices
}

/// The ancestor chain, current block, and (for headers) same-level
/// siblings, as indices into `blocks`. Non-header indices resolve to just
/// the single nearest preceding header. Built on top of
/// [`derive_references`], the block sequence's header-span decomposition.
pub fn assemble_context(blocks: &[Block], i: usize) -> Vec<usize> {
    let headers = derive_references(blocks);

    let Some(current) = headers.iter().find(|r| r.start_index == i) else {
        return nearest_preceding_header(&headers, i).map(|r| r.start_index).into_iter().collect();
    };

    let mut parents = Vec::new();
    let mut cursor = i;
    let mut bound = current.level;
    while let Some(parent) = headers.iter().rev().find(|r| r.start_index < cursor && r.level < bound) {
        parents.push(parent.start_index);
        bound = parent.level;
        cursor = parent.start_index;
    }
    parents.reverse();

    let mut result = parents;
    result.push(i);

    for header in &headers {
        if header.start_index <= i {
            continue;
        }
        if header.level == current.level {
            result.push(header.start_index);
        } else if header.level < current.level {
            break;
        }
    }

    result
}

fn nearest_preceding_header(headers: &[Reference], i: usize) -> Option<&Reference> {
    headers.iter().filter(|r| r.start_index < i).max_by_key(|r| r.start_index)
}

/// Assemble a bounded reference context for a command's reference list.
/// Truncates each section to `MAX_SECTION_BYTES`; fails with
/// [`CoreError::ContextOverflow`] if the running total would exceed
/// `MAX_TOTAL_BYTES`.
pub fn extract_context(
    blocks: &[Block],
    references: &[String],
) -> Result<HashMap<String, Block>, CoreError> {
    let mut out: HashMap<String, Block> = HashMap::new();
    let mut total = 0usize;

    for reference in references {
        for matched_idx in match_blocks(blocks, reference) {
            for section_idx in assemble_context(blocks, matched_idx) {
                let block = &blocks[section_idx];
                let label = block_label(block, section_idx);
                if out.contains_key(&label) {
                    continue;
                }

                let mut content = block.content().to_string();
                if content.len() > MAX_SECTION_BYTES {
                    content.truncate(MAX_SECTION_BYTES);
                }

                if total + content.len() > MAX_TOTAL_BYTES {
                    return Err(CoreError::ContextOverflow {
                        reason: format!(
                            "adding section `{label}` would exceed MAX_TOTAL_BYTES ({MAX_TOTAL_BYTES})"
                        ),
                    });
                }
                total += content.len();

                let bounded = match block {
                    Block::Header { level, .. } => Block::Header { level: *level, content },
                    Block::Paragraph(_) => Block::Paragraph(content),
                    Block::List(_) => Block::List(content),
                    Block::Quote(_) => Block::Quote(content),
                    Block::Table(_) => Block::Table(content),
                    Block::Code(_) => Block::Code(content),
                };
                out.insert(label, bounded);
            }
        }
    }

    Ok(out)
}

fn block_label(block: &Block, index: usize) -> String {
    match block {
        Block::Header { content, .. } => content.clone(),
        _ => format!("#{index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::segment_blocks;

    #[test]
    fn assemble_context_for_header_includes_ancestors_and_siblings() {
        let blocks = segment_blocks("# A\n## B\n## C\n# D\n## E");
        // indices: 0=A(1) 1=B(2) 2=C(2) 3=D(1) 4=E(2)
        let ctx = assemble_context(&blocks, 1); // B
        assert_eq!(ctx, vec![0, 1, 2]); // parent A, self B, sibling C
    }

    #[test]
    fn assemble_context_for_non_header_uses_nearest_preceding_header() {
        let blocks = segment_blocks("# A\nsome text");
        let ctx = assemble_context(&blocks, 1);
        assert_eq!(ctx, vec![0]);
    }

    #[test]
    fn extract_context_bounds_total_size() {
        // Three large sibling headers: matching the first pulls all three in
        // via `assemble_context`'s sibling scan, exceeding MAX_TOTAL_BYTES.
        let section = MAX_TOTAL_BYTES / 3 + 100;
        let doc = format!(
            "# {}\n# {}\n# {}",
            "a".repeat(section),
            "b".repeat(section),
            "c".repeat(section)
        );
        let blocks = segment_blocks(&doc);
        let err = extract_context(&blocks, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, CoreError::ContextOverflow { .. }));
    }

    #[test]
    fn extract_context_truncates_oversized_sections() {
        let doc = format!("# {}", "x".repeat(MAX_SECTION_BYTES + 100));
        let blocks = segment_blocks(&doc);
        let ctx = extract_context(&blocks, &["x".to_string()]).unwrap();
        assert_eq!(ctx.len(), 1);
        let header = ctx.values().next().unwrap();
        assert_eq!(header.content().len(), MAX_SECTION_BYTES);
    }

    #[test]
    fn unmatched_reference_yields_empty_context_not_an_error() {
        let blocks = segment_blocks("# A\nbody");
        let ctx = extract_context(&blocks, &["NoSuchHeader".to_string()]).unwrap();
        assert!(ctx.is_empty());
    }
}
