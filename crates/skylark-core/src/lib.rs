//! Command parsing, Markdown block/context assembly, assistant definitions,
//! the per-command orchestrator, and the document rewriter.
//!
//! Sits above `skylark-tools` (tool lifecycle) and `skylark-llm` (provider
//! contract), wiring both into the command-processing pipeline described by
//! the external file/command formats this crate parses and rewrites.

pub mod assistant;
pub mod block;
pub mod command;
pub mod context;
pub mod error;
pub mod limits;
pub mod orchestrator;
pub mod reference;
pub mod rewriter;

pub use assistant::{Assistant, AssistantManager, parse_assistant};
pub use block::{Block, segment_blocks};
pub use command::{Command, build_command_context, parse_command_line};
pub use context::{assemble_context, extract_context, match_blocks};
pub use error::CoreError;
pub use limits::{MAX_COMMAND_BYTES, MAX_SECTION_BYTES, MAX_TOTAL_BYTES};
pub use orchestrator::run_command;
pub use reference::{Reference, derive_references, extract_references, normalize};
pub use rewriter::{PendingCommand, rewrite_document};
