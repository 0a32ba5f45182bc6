//! Linear tokens shared by both lexers

use thiserror::Error;

use crate::domain::{MetaError, Node, NodeId, NodeKind, NodeMeta};

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Invalid Mtask document: {0}")]
    Json(String),

    #[error("Mtask record {index}: {message}")]
    Record { index: usize, message: String },

    #[error("Mtask record {index}: {source}")]
    Data { index: usize, source: MetaError },

    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Node {child} refers to unknown parent {parent}")]
    UnknownParent { child: NodeId, parent: NodeId },

    #[error("A {child_kind} cannot be nested under task {parent}")]
    InvalidNesting { child_kind: NodeKind, parent: NodeId },

    #[error("Parent cycle involving node {0}")]
    Cycle(NodeId),
}

impl ParseError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// One node in document order, with a reference to its parent
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// Columns of indentation (TaskList tasks), header depth (TaskList
    /// headers) or tree depth (Mtask)
    pub indent: usize,
    pub parent: Option<NodeId>,
    pub meta: NodeMeta,
}

impl Token {
    pub(crate) fn into_node(self) -> Node {
        Node {
            id: Some(self.id),
            kind: self.kind,
            name: self.name,
            meta: self.meta,
            children: Vec::new(),
        }
    }
}
