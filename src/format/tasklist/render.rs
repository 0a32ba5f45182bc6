//! TaskList renderer
//!
//! Produces the text a user edits. Headers are surrounded by blank lines and
//! underlined with the character for their header depth; tasks are indented
//! four spaces per level below the enclosing header. Rendering never fails.
//!
//! The underline palette has eleven characters. Headers nested deeper than
//! that share the last character and read back as siblings at depth 10.

use super::{CONTINUATION_INDENT, FILE_PREFIX, HEADER_CHARS, ID_CLOSE, ID_OPEN, TASK_INDENT};
use crate::domain::{AstTree, Node, NodeId, NodeKind};

/// Renders an AST as TaskList lines
#[derive(Debug, Default)]
pub struct TaskListRenderer {
    lines: Vec<String>,
}

impl TaskListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `tree` as lines without terminators, the form an editor
    /// buffer takes
    pub fn render_lines(mut self, tree: &AstTree) -> Vec<String> {
        self.nodes(&tree.roots, 0, 0);
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    /// Renders `tree` as text; every line ends with `\n`
    pub fn render(self, tree: &AstTree) -> String {
        let mut text = String::new();
        for line in self.render_lines(tree) {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    fn nodes(&mut self, nodes: &[Node], header_depth: usize, task_depth: usize) {
        for node in nodes {
            if node.kind.is_header() {
                self.header(node, header_depth);
                self.nodes(&node.children, header_depth + 1, 0);
            } else {
                self.task(node, task_depth);
                self.nodes(&node.children, header_depth, task_depth + 1);
            }
        }
    }

    fn header(&mut self, node: &Node, depth: usize) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }

        let mut title = id_tag(node.id.as_ref());
        if node.kind == NodeKind::File {
            title.push_str(FILE_PREFIX);
        }
        title.push_str(&node.name.replace('\n', " "));

        let underline_char = HEADER_CHARS[depth.min(HEADER_CHARS.len() - 1)];
        let underline = underline_char.to_string().repeat(title.chars().count());

        self.lines.push(title);
        self.lines.push(underline);
        self.lines.push(String::new());
    }

    fn task(&mut self, node: &Node, depth: usize) {
        let indent = " ".repeat(TASK_INDENT * depth);
        let status = node.status().unwrap_or_default().as_char();
        let mut name_lines = node.name.split('\n');
        let first = name_lines.next().unwrap_or_default();

        self.lines.push(format!(
            "{}{}{} {}",
            indent,
            status,
            id_tag(node.id.as_ref()),
            first
        ));

        for line in name_lines {
            if line.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!(
                    "{}{}{}",
                    indent,
                    " ".repeat(CONTINUATION_INDENT),
                    line
                ));
            }
        }
    }
}

fn id_tag(id: Option<&NodeId>) -> String {
    match id {
        Some(id) => format!("{}{}{}", ID_OPEN, id, ID_CLOSE),
        None => String::new(),
    }
}
