//! The abstract syntax tree of a task document
//!
//! A tree is an ordered list of root nodes. Both document formats parse into
//! it and render from it; merging and archiving operate on it.

use tracing::debug;

use super::id::NodeId;
use super::merge::{Merge, MergeError, MergeReport};
use super::node::Node;
use super::time::Timestamp;

/// An ordered sequence of root nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AstTree {
    pub roots: Vec<Node>,
}

/// A node reached by [`AstTree::walk`], with its recomputed position
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    /// Number of ancestors (roots are at depth 0)
    pub depth: usize,
    pub parent: Option<&'a Node>,
}

/// Depth-first, pre-order traversal
pub struct Walk<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        for child in visit.node.children.iter().rev() {
            self.stack.push(Visit {
                node: child,
                depth: visit.depth + 1,
                parent: Some(visit.node),
            });
        }
        Some(visit)
    }
}

impl AstTree {
    pub fn new(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.roots.iter().map(Node::count).sum()
    }

    /// Iterates over every node in document order
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self
                .roots
                .iter()
                .rev()
                .map(|node| Visit {
                    node,
                    depth: 0,
                    parent: None,
                })
                .collect(),
        }
    }

    /// Finds a node by id anywhere in the tree
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.walk()
            .map(|visit| visit.node)
            .find(|node| node.id.as_ref() == Some(id))
    }

    /// Assigns missing ids and bumps `modified` on every node
    pub fn touch(&mut self, now: Timestamp) {
        for root in &mut self.roots {
            root.touch(now);
        }
    }

    /// Assigns missing ids and fills in missing timestamps on every node
    pub fn finalize(&mut self, now: Timestamp) {
        for root in &mut self.roots {
            root.finalize(now);
        }
    }

    /// Merges an edited tree into this (saved) tree
    ///
    /// The edit decides which nodes exist and in which order; this tree keeps
    /// ids and timestamps of nodes that survive.
    pub fn update(&mut self, other: AstTree, now: Timestamp) -> Result<MergeReport, MergeError> {
        let mut merge = Merge::new(&self.roots, now);
        let ours = std::mem::take(&mut self.roots);
        self.roots = merge.children(ours, other.roots)?;

        let report = merge.finish();
        debug!(
            changed = report.changed,
            added = report.added,
            moved = report.moved,
            removed = report.removed,
            "merged edited tree"
        );
        Ok(report)
    }

    /// Splits off complete roots: returns `(active, archive)`
    ///
    /// A root moves only when its whole subtree is complete; partially
    /// complete roots stay in `active` untouched. Both halves keep document
    /// order.
    pub fn archive_completed(self) -> (AstTree, AstTree) {
        let (archive, active): (Vec<Node>, Vec<Node>) =
            self.roots.into_iter().partition(Node::is_complete);

        debug!(
            active = active.len(),
            archived = archive.len(),
            "split completed task chains"
        );
        (AstTree::new(active), AstTree::new(archive))
    }

    /// Appends archived roots to this archive tree
    ///
    /// A root whose id is already present at the same level is folded into
    /// it: its name and metadata are replaced and its children absorbed the
    /// same way. Nothing already archived is dropped.
    pub fn absorb(&mut self, archived: AstTree) {
        absorb_into(&mut self.roots, archived.roots);
    }
}

fn absorb_into(existing: &mut Vec<Node>, incoming: Vec<Node>) {
    for node in incoming {
        let position = node
            .id
            .as_ref()
            .and_then(|id| existing.iter().position(|n| n.id.as_ref() == Some(id)));

        match position {
            Some(index) => {
                let target = &mut existing[index];
                target.kind = node.kind;
                target.name = node.name;
                target.meta = node.meta;
                absorb_into(&mut target.children, node.children);
            }
            None => existing.push(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meta::{Finished, TaskStatus};

    fn now() -> Timestamp {
        "2023-06-01T00:00:00+00:00".parse().unwrap()
    }

    fn task(status: TaskStatus, name: &str) -> Node {
        Node::task(Some(NodeId::generate()), status, name)
    }

    #[test]
    fn touch_bumps_every_task() {
        let mut tree = AstTree::new(vec![
            Node::section(None, "s").with_children(vec![
                task(TaskStatus::Done, "a").with_children(vec![Node::task(None, TaskStatus::Todo, "b")]),
            ]),
            task(TaskStatus::Wip, "c"),
        ]);
        tree.finalize(now());
        let ids: Vec<_> = tree.walk().map(|v| v.node.id.clone()).collect();

        let later: Timestamp = "2023-07-01T12:00:00+02:00".parse().unwrap();
        tree.touch(later);

        assert_eq!(tree.walk().map(|v| v.node.id.clone()).collect::<Vec<_>>(), ids);
        let metas: Vec<_> = tree.walk().filter_map(|v| v.node.task_meta().copied()).collect();
        assert_eq!(metas.len(), 3);
        for meta in metas {
            assert_eq!(meta.modified, Some(later));
            assert_eq!(meta.created, Some(now()));
        }
        let done = tree.roots[0].children[0].task_meta().unwrap();
        assert_eq!(done.finished, Finished::At(now()));
    }

    #[test]
    fn touch_assigns_missing_ids() {
        let mut tree = AstTree::new(vec![Node::task(None, TaskStatus::Todo, "fresh")]);
        tree.touch(now());
        assert!(tree.roots[0].id.is_some());
        assert_eq!(tree.roots[0].task_meta().unwrap().modified, Some(now()));
    }

    #[test]
    fn walk_is_preorder_with_parents() {
        let tree = AstTree::new(vec![
            Node::section(Some(NodeId::generate()), "s").with_children(vec![
                task(TaskStatus::Todo, "a").with_children(vec![task(TaskStatus::Todo, "b")]),
                task(TaskStatus::Todo, "c"),
            ]),
            task(TaskStatus::Todo, "d"),
        ]);

        let visits: Vec<_> = tree
            .walk()
            .map(|v| (v.node.name.as_str(), v.depth, v.parent.map(|p| p.name.as_str())))
            .collect();

        assert_eq!(
            visits,
            vec![
                ("s", 0, None),
                ("a", 1, Some("s")),
                ("b", 2, Some("a")),
                ("c", 1, Some("s")),
                ("d", 0, None),
            ]
        );
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn find_by_id() {
        let child = task(TaskStatus::Todo, "child");
        let id = child.id.clone().unwrap();
        let tree = AstTree::new(vec![task(TaskStatus::Todo, "root").with_children(vec![child])]);

        assert_eq!(tree.find(&id).map(|n| n.name.as_str()), Some("child"));
        assert!(tree.find(&NodeId::generate()).is_none());
    }

    #[test]
    fn update_reorders_and_adds_roots() {
        let a = task(TaskStatus::Todo, "A");
        let b = task(TaskStatus::Todo, "B");
        let c = task(TaskStatus::Todo, "C");
        let mut ours = AstTree::new(vec![a.clone(), b.clone()]);
        let theirs = AstTree::new(vec![b.clone(), c.clone(), a.clone()]);

        ours.update(theirs, now()).unwrap();

        assert_eq!(ours.roots, vec![b, c, a]);
    }

    #[test]
    fn update_removes_missing_roots() {
        let a = task(TaskStatus::Todo, "A");
        let b = task(TaskStatus::Todo, "B");
        let mut ours = AstTree::new(vec![a.clone(), b]);

        let report = ours.update(AstTree::new(vec![a.clone()]), now()).unwrap();

        assert_eq!(ours.roots, vec![a]);
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn update_with_empty_edit_clears_tree() {
        let mut ours = AstTree::new(vec![task(TaskStatus::Todo, "A")]);
        ours.update(AstTree::default(), now()).unwrap();
        assert!(ours.is_empty());
    }

    #[test]
    fn archive_moves_only_complete_chains() {
        let p1 = task(TaskStatus::Done, "P1").with_children(vec![task(TaskStatus::Done, "c1")]);
        let p2 = task(TaskStatus::Done, "P2").with_children(vec![task(TaskStatus::Todo, "c2")]);
        let tree = AstTree::new(vec![p1.clone(), p2.clone()]);

        let (active, archive) = tree.archive_completed();

        assert_eq!(active.roots, vec![p2]);
        assert_eq!(archive.roots, vec![p1]);
    }

    #[test]
    fn archive_keeps_order() {
        let d1 = task(TaskStatus::Done, "d1");
        let t1 = task(TaskStatus::Todo, "t1");
        let d2 = task(TaskStatus::Skip, "d2");
        let t2 = task(TaskStatus::Wip, "t2");
        let tree = AstTree::new(vec![d1.clone(), t1.clone(), d2.clone(), t2.clone()]);

        let (active, archive) = tree.archive_completed();

        assert_eq!(active.roots, vec![t1, t2]);
        assert_eq!(archive.roots, vec![d1, d2]);
    }

    #[test]
    fn archive_never_moves_files() {
        let file = Node::file(Some(NodeId::generate()), "f")
            .with_children(vec![task(TaskStatus::Done, "a")]);
        let (active, archive) = AstTree::new(vec![file]).archive_completed();
        assert_eq!(active.roots.len(), 1);
        assert!(archive.is_empty());
    }

    #[test]
    fn absorb_appends_and_folds() {
        let section_id = NodeId::generate();
        let old = task(TaskStatus::Done, "old");
        let new = task(TaskStatus::Done, "new");
        let loose = task(TaskStatus::Skip, "loose");

        let mut archive = AstTree::new(vec![
            Node::section(Some(section_id.clone()), "work").with_children(vec![old.clone()]),
        ]);
        archive.absorb(AstTree::new(vec![
            Node::section(Some(section_id), "work").with_children(vec![new.clone()]),
            loose.clone(),
        ]));

        assert_eq!(archive.roots.len(), 2);
        assert_eq!(archive.roots[0].children, vec![old, new]);
        assert_eq!(archive.roots[1], loose);
    }
}
