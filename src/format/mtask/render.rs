use serde::Serialize;

use crate::domain::{AstTree, NodeId, NodeKind, NodeMeta};

/// A flat record; field order is the on-disk key order
#[derive(Debug, Serialize)]
struct Record<'a> {
    #[serde(rename = "_id")]
    id: Option<&'a NodeId>,
    #[serde(rename = "type")]
    kind: NodeKind,
    name: &'a str,
    indent: usize,
    parent: Option<&'a NodeId>,
    data: &'a NodeMeta,
}

/// Renders an AST as an Mtask document
#[derive(Debug, Default)]
pub struct MtaskRenderer {
    compact: bool,
}

impl MtaskRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the array on one line instead of pretty-printing it
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Renders `tree`; the text ends with a newline
    pub fn render(&self, tree: &AstTree) -> serde_json::Result<String> {
        let records: Vec<Record<'_>> = tree
            .walk()
            .map(|visit| Record {
                id: visit.node.id.as_ref(),
                kind: visit.node.kind,
                name: &visit.node.name,
                indent: visit.depth,
                parent: visit.parent.and_then(|p| p.id.as_ref()),
                data: &visit.node.meta,
            })
            .collect();

        let mut text = if self.compact {
            serde_json::to_string(&records)?
        } else {
            serde_json::to_string_pretty(&records)?
        };
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Finished, Node, TaskMeta, TaskStatus, Timestamp};
    use crate::format::parse_mtask;
    use serde_json::json;

    const ID_A: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const ID_B: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";
    const ID_C: &str = "CCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC";

    fn id(s: &str) -> Option<NodeId> {
        Some(s.parse().unwrap())
    }

    fn render_value(tree: &AstTree) -> serde_json::Value {
        let text = MtaskRenderer::new().render(tree).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn empty_tree() {
        assert_eq!(MtaskRenderer::new().render(&AstTree::default()).unwrap(), "[]\n");
    }

    #[test]
    fn flat_records_in_preorder() {
        let tree = AstTree::new(vec![Node::section(id(ID_A), "Home").with_children(vec![
            Node::task(id(ID_B), TaskStatus::Todo, "clean")
                .with_children(vec![Node::task(id(ID_C), TaskStatus::Done, "dishes")]),
        ])]);

        assert_eq!(
            render_value(&tree),
            json!([
                {"_id": ID_A, "type": "section", "name": "Home", "indent": 0, "parent": null, "data": {}},
                {"_id": ID_B, "type": "task", "name": "clean", "indent": 1, "parent": ID_A,
                 "data": {"status": "todo", "created": null, "finished": null, "modified": null}},
                {"_id": ID_C, "type": "task", "name": "dishes", "indent": 2, "parent": ID_B,
                 "data": {"status": "done", "created": null, "finished": null, "modified": null}},
            ])
        );
    }

    #[test]
    fn keys_in_record_order() {
        let tree = AstTree::new(vec![Node::file(id(ID_A), "notes")]);
        let text = MtaskRenderer::new().compact(true).render(&tree).unwrap();
        assert_eq!(
            text,
            format!(
                "[{{\"_id\":\"{}\",\"type\":\"file\",\"name\":\"notes\",\"indent\":0,\"parent\":null,\"data\":{{}}}}]\n",
                ID_A
            )
        );
    }

    #[test]
    fn timestamps_and_finished_false() {
        let created: Timestamp = "2020-01-01T00:00:00+00:00".parse().unwrap();
        let mut node = Node::task(id(ID_A), TaskStatus::Todo, "t");
        node.meta = NodeMeta::Task(TaskMeta {
            status: TaskStatus::Todo,
            created: Some(created),
            finished: Finished::No,
            modified: Some(created),
        });

        let value = render_value(&AstTree::new(vec![node]));
        assert_eq!(
            value[0]["data"],
            json!({
                "status": "todo",
                "created": "2020-01-01T00:00:00+00:00",
                "finished": false,
                "modified": "2020-01-01T00:00:00+00:00"
            })
        );
    }

    #[test]
    fn parse_then_render_is_identity() {
        let doc = json!([
            {"_id": ID_A, "type": "file", "name": "notes", "indent": 0, "parent": null, "data": {}},
            {"_id": ID_B, "type": "task", "name": "two\nlines", "indent": 1, "parent": ID_A,
             "data": {"status": "skip", "created": "2021-03-04T05:06:07+01:00",
                      "finished": "2021-03-05T00:00:00+00:00", "modified": null}},
        ]);
        let tree = parse_mtask(&doc.to_string()).unwrap();
        assert_eq!(render_value(&tree), doc);
    }
}
