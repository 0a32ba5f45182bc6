//! Merging an edited tree into its saved version
//!
//! The saved tree ("ours") is authoritative for identity and history; the
//! edited tree ("theirs") is authoritative for content and ordering. At each
//! level the children of "theirs" are walked in order:
//!
//! - a child whose id matches one of our siblings is merged into it
//! - a child whose id exists elsewhere in our tree (it was moved to another
//!   parent) is merged into that node's saved kind/name/metadata
//! - any other child is taken as-is
//!
//! Our children that "theirs" no longer mentions are dropped.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use super::id::NodeId;
use super::node::Node;
use super::time::Timestamp;

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("Cannot merge node {theirs} into node {ours}: ids differ")]
    IdMismatch { ours: String, theirs: String },
}

/// Summary of what a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Existing nodes whose name, kind or metadata changed
    pub changed: usize,
    /// Nodes that did not exist in the saved tree
    pub added: usize,
    /// Saved nodes that were moved under a different parent
    pub moved: usize,
    /// Saved nodes that no longer exist
    pub removed: usize,
}

impl MergeReport {
    pub fn is_noop(&self) -> bool {
        *self == MergeReport::default()
    }
}

/// State of one merge: the time stamp to apply and the saved nodes not yet
/// claimed by the edit
pub(crate) struct Merge {
    now: Timestamp,
    unclaimed: HashMap<NodeId, Node>,
    report: MergeReport,
}

impl Merge {
    /// Indexes every node of `ours` so moved nodes can be found later
    pub(crate) fn new(ours: &[Node], now: Timestamp) -> Self {
        let mut unclaimed = HashMap::new();
        let mut stack: Vec<&Node> = ours.iter().collect();

        while let Some(node) = stack.pop() {
            if let Some(id) = &node.id {
                unclaimed.insert(id.clone(), node.clone_shallow());
            }
            stack.extend(node.children.iter());
        }

        Self {
            now,
            unclaimed,
            report: MergeReport::default(),
        }
    }

    pub(crate) fn claim(&mut self, id: &Option<NodeId>) {
        if let Some(id) = id {
            self.unclaimed.remove(id);
        }
    }

    pub(crate) fn finish(self) -> MergeReport {
        MergeReport {
            removed: self.unclaimed.len(),
            ..self.report
        }
    }

    /// Merges one level: the edited children replace ours
    pub(crate) fn children(
        &mut self,
        ours: Vec<Node>,
        theirs: Vec<Node>,
    ) -> Result<Vec<Node>, MergeError> {
        let mut siblings: HashMap<NodeId, Node> = ours
            .into_iter()
            .filter_map(|node| node.id.clone().map(|id| (id, node)))
            .collect();

        let mut merged = Vec::with_capacity(theirs.len());
        for their_child in theirs {
            let sibling = their_child.id.as_ref().and_then(|id| siblings.remove(id));
            let node = match sibling {
                Some(mut our_child) => {
                    self.claim(&our_child.id);
                    self.node(&mut our_child, their_child)?;
                    our_child
                }
                None => self.adopt(their_child)?,
            };
            merged.push(node);
        }

        Ok(merged)
    }

    /// Places a child that has no matching sibling on our side
    fn adopt(&mut self, theirs: Node) -> Result<Node, MergeError> {
        let moved = theirs.id.as_ref().and_then(|id| self.unclaimed.remove(id));

        match moved {
            Some(mut ours) => {
                trace!(id = ?ours.id, "node moved to a new parent");
                self.report.moved += 1;
                self.node(&mut ours, theirs)?;
                Ok(ours)
            }
            None => {
                trace!(id = ?theirs.id, name = %theirs.name, "new node");
                self.report.added += 1;
                let Node {
                    id,
                    kind,
                    name,
                    meta,
                    children,
                } = theirs;
                Ok(Node {
                    id,
                    kind,
                    name,
                    meta,
                    children: self.children(Vec::new(), children)?,
                })
            }
        }
    }

    /// Merges `theirs` into `ours`, then recurses into the children
    pub(crate) fn node(&mut self, ours: &mut Node, theirs: Node) -> Result<(), MergeError> {
        if ours.id != theirs.id {
            return Err(MergeError::IdMismatch {
                ours: display_id(&ours.id),
                theirs: display_id(&theirs.id),
            });
        }

        let mut changed = false;

        if ours.name != theirs.name {
            ours.name = theirs.name;
            changed = true;
        }

        if ours.kind != theirs.kind {
            ours.kind = theirs.kind;
            changed = true;
        }

        if let Some(meta) = ours.meta.update(&theirs.meta, self.now) {
            ours.meta = meta;
            changed = true;
        }

        if changed {
            debug!(id = ?ours.id, name = %ours.name, "node changed");
            ours.meta = ours.meta.touch(self.now);
            self.report.changed += 1;
        }

        let our_children = std::mem::take(&mut ours.children);
        ours.children = self.children(our_children, theirs.children)?;

        Ok(())
    }
}

fn display_id(id: &Option<NodeId>) -> String {
    id.as_ref()
        .map_or_else(|| "<unset>".to_string(), NodeId::to_string)
}

impl Node {
    fn clone_shallow(&self) -> Node {
        Node {
            id: self.id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            meta: self.meta,
            children: Vec::new(),
        }
    }

    /// Merges an edited version of this node into it
    ///
    /// Fails with [`MergeError::IdMismatch`] if the ids differ.
    pub fn update(&mut self, other: Node, now: Timestamp) -> Result<MergeReport, MergeError> {
        let mut merge = Merge::new(std::slice::from_ref(self), now);
        merge.claim(&self.id);
        merge.node(self, other)?;
        Ok(merge.finish())
    }
}
