/// Maximum byte length of a single command's text (§3 invariants).
pub const MAX_COMMAND_BYTES: usize = 4000;

/// Maximum byte length of the assembled reference context across all
/// referenced sections for one command.
pub const MAX_TOTAL_BYTES: usize = 8000;

/// Maximum byte length of any one referenced section after truncation.
pub const MAX_SECTION_BYTES: usize = 4000;
