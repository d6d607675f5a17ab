use regex::Regex;
use std::sync::LazyLock;

use crate::block::Block;

/// Matches a `#Header#` or `#Header` token inside a command's text.
static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*([^#\n]+?)(?:\s*#|$)").expect("valid reference regex"));

/// A header span derived from the block sequence: the header itself plus
/// every block up to (not including) the next header at the same or a
/// shallower level. `start_index`/`end_index` index into the `&[Block]`
/// slice `derive_references` was called with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub header: String,
    pub level: u8,
    pub start_index: usize,
    pub end_index: usize,
}

/// Normalize for `MatchBlocks` comparison: lowercase, map punctuation to a
/// space, then collapse whitespace runs to a single space and trim.
pub fn normalize(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Extract raw (non-normalized) header reference captures from command text.
pub fn extract_references(text: &str) -> Vec<String> {
    REFERENCE_PATTERN
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Compute header spans from a document's block sequence (per the data
/// model, a `Reference` is derived from the block sequence, not raw text).
pub fn derive_references(blocks: &[Block]) -> Vec<Reference> {
    let headers: Vec<(usize, u8, &str)> = blocks
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.header_level().map(|level| (i, level, b.content())))
        .collect();

    let mut refs = Vec::with_capacity(headers.len());
    for (idx, &(start, level, content)) in headers.iter().enumerate() {
        let end = headers[idx + 1..]
            .iter()
            .find(|(_, other_level, _)| *other_level <= level)
            .map(|(other_start, ..)| other_start - 1)
            .unwrap_or(blocks.len().saturating_sub(1));

        refs.push(Reference {
            header: content.to_string(),
            level,
            start_index: start,
            end_index: end,
        });
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hashed_reference_tokens() {
        let refs = extract_references("see #Setup# for details");
        assert_eq!(refs, vec!["Setup".to_string()]);
    }

    #[test]
    fn extracts_unterminated_reference_to_end_of_text() {
        let refs = extract_references("see #Setup Guide");
        assert_eq!(refs, vec!["Setup Guide".to_string()]);
    }

    #[test]
    fn normalization_is_case_and_whitespace_insensitive() {
        assert_eq!(normalize("Setup Guide"), normalize("SETUP  GUIDE"));
        assert_eq!(normalize("Setup Guide"), normalize("setup guide  "));
    }

    #[test]
    fn derives_header_spans_ending_before_next_sibling() {
        use crate::block::segment_blocks;

        // blocks: 0=Top(1) 1=body 2=Child(2) 3=more 4=Next(1) 5=end
        let blocks = segment_blocks("# Top\nbody\n## Child\nmore\n# Next\nend");
        let refs = derive_references(&blocks);
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].header, "Top");
        assert_eq!(refs[0].start_index, 0);
        assert_eq!(refs[0].end_index, 3);
        assert_eq!(refs[1].header, "Child");
        assert_eq!(refs[1].start_index, 2);
        assert_eq!(refs[1].end_index, 3);
        assert_eq!(refs[2].header, "Next");
        assert_eq!(refs[2].start_index, 4);
        assert_eq!(refs[2].end_index, 5);
    }
}
