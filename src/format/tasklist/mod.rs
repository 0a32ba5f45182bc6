//! TaskList: the human-editable outline format

mod lexer;
mod render;

pub use lexer::TaskListLexer;
pub use render::TaskListRenderer;

/// Underline characters in depth order
pub const HEADER_CHARS: [char; 11] = ['=', '-', '`', ':', '.', '\'', '"', '~', '^', '_', '+'];

pub(crate) const ID_OPEN: &str = "{*";
pub(crate) const ID_CLOSE: &str = "*}";
pub(crate) const FILE_PREFIX: &str = "file::";

/// Spaces per task nesting level
pub(crate) const TASK_INDENT: usize = 4;
/// Extra spaces before the second and later lines of a task name
pub(crate) const CONTINUATION_INDENT: usize = 2;
