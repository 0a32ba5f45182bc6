//! AST nodes
//!
//! A node is a task, a section header or a file header. Each node owns its
//! children exclusively. Parent links are not stored; walkers recompute
//! them while descending (see [`super::tree::AstTree::walk`]).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::NodeId;
use super::meta::{NodeMeta, TaskMeta, TaskStatus};
use super::time::Timestamp;

/// Kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Task,
    Section,
    File,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Task => "task",
            NodeKind::Section => "section",
            NodeKind::File => "file",
        }
    }

    /// Returns true for header kinds (section, file)
    pub fn is_header(&self) -> bool {
        !matches!(self, NodeKind::Task)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the abstract syntax tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unset only in freshly built trees, before `touch`/`finalize`
    pub id: Option<NodeId>,
    pub kind: NodeKind,
    /// Task names may span several lines, separated by `\n`
    pub name: String,
    pub meta: NodeMeta,
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a childless node with default metadata for its kind
    pub fn new(id: Option<NodeId>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            meta: NodeMeta::for_kind(kind),
            children: Vec::new(),
        }
    }

    /// Creates a task node with the given status
    pub fn task(id: Option<NodeId>, status: TaskStatus, name: impl Into<String>) -> Self {
        Self {
            meta: NodeMeta::Task(TaskMeta::new(status)),
            ..Self::new(id, NodeKind::Task, name)
        }
    }

    pub fn section(id: Option<NodeId>, name: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Section, name)
    }

    pub fn file(id: Option<NodeId>, name: impl Into<String>) -> Self {
        Self::new(id, NodeKind::File, name)
    }

    /// Builder-style helper that replaces the children
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Task metadata, if this is a task
    pub fn task_meta(&self) -> Option<&TaskMeta> {
        self.meta.as_task()
    }

    /// Task status, if this is a task
    pub fn status(&self) -> Option<TaskStatus> {
        self.task_meta().map(|meta| meta.status)
    }

    /// Returns true when the whole subtree can be archived
    ///
    /// - files are never complete
    /// - sections are complete when non-empty and every child is complete
    /// - tasks are complete when closed (done/skip) and every child is complete
    pub fn is_complete(&self) -> bool {
        match self.kind {
            NodeKind::File => false,
            NodeKind::Section => {
                !self.children.is_empty() && self.children.iter().all(Node::is_complete)
            }
            NodeKind::Task => {
                self.status().is_some_and(|s| s.is_closed())
                    && self.children.iter().all(Node::is_complete)
            }
        }
    }

    /// Assigns missing ids and bumps `modified` across the subtree
    pub fn touch(&mut self, now: Timestamp) {
        self.id.get_or_insert_with(NodeId::generate);
        self.meta = self.meta.touch(now);
        for child in &mut self.children {
            child.touch(now);
        }
    }

    /// Assigns missing ids and fills in missing timestamps across the subtree
    pub fn finalize(&mut self, now: Timestamp) {
        self.id.get_or_insert_with(NodeId::generate);
        self.meta = self.meta.finalize(now);
        for child in &mut self.children {
            child.finalize(now);
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}
