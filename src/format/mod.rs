//! Document formats
//!
//! Both formats go through the same stages:
//!
//! ```text
//! text -> IoStream -> lexer -> tokens -> build_tree -> AstTree -> renderer -> text
//! ```
//!
//! The helpers at the bottom of this module wire the stages together.

mod builder;
pub mod iostream;
pub mod mtask;
pub mod tasklist;
mod token;

pub use builder::build_tree;
pub use iostream::IoStream;
pub use mtask::{MtaskLexer, MtaskRenderer};
pub use tasklist::{TaskListLexer, TaskListRenderer};
pub use token::{ParseError, Token};

use crate::domain::AstTree;

/// Parses TaskList text
pub fn parse_tasklist(text: &str) -> Result<AstTree, ParseError> {
    build_tree(TaskListLexer::new(IoStream::from_text(text)).tokenize()?)
}

/// Parses an editor buffer given as lines without terminators
pub fn parse_tasklist_lines<I, S>(lines: I) -> Result<AstTree, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let stream = IoStream::from_lines(lines.into_iter().map(Into::into).collect::<Vec<String>>());
    build_tree(TaskListLexer::new(stream).tokenize()?)
}

/// Parses an Mtask document
pub fn parse_mtask(text: &str) -> Result<AstTree, ParseError> {
    build_tree(MtaskLexer::new(IoStream::from_text(text)).tokenize()?)
}

pub fn render_tasklist(tree: &AstTree) -> String {
    TaskListRenderer::new().render(tree)
}

pub fn render_tasklist_lines(tree: &AstTree) -> Vec<String> {
    TaskListRenderer::new().render_lines(tree)
}

pub fn render_mtask(tree: &AstTree) -> serde_json::Result<String> {
    MtaskRenderer::new().render(tree)
}
