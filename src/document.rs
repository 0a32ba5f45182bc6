//! Open, save and archive pipelines
//!
//! These glue the formats and the tree operations together and work on
//! already materialized bytes; reading and writing files is the storage
//! layer's job.
//!
//! - **Open**: Mtask bytes to TaskList text
//! - **Save**: TaskList buffer, merged into the saved Mtask document if there
//!   is one, finalized and rendered back to Mtask
//! - **Archive**: complete task chains moved from an active document into
//!   its archive document

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{AstTree, MergeError, MergeReport, Timestamp};
use crate::format::{parse_mtask, parse_tasklist, render_mtask, render_tasklist, ParseError};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Failed to render Mtask document: {0}")]
    Render(#[from] serde_json::Error),
}

/// Result of merging an edit buffer into a saved tree
#[derive(Debug, Clone)]
pub struct Saved {
    pub tree: AstTree,
    pub report: MergeReport,
}

/// Result of archiving one document
#[derive(Debug, Clone)]
pub struct Archived {
    pub active: AstTree,
    pub archive: AstTree,
    /// Number of root chains moved
    pub moved: usize,
}

/// Parses Mtask bytes into a tree
pub fn read_mtask(bytes: &[u8]) -> Result<AstTree, DocumentError> {
    Ok(parse_mtask(std::str::from_utf8(bytes)?)?)
}

/// Renders Mtask bytes as the TaskList text shown to the user
pub fn open_document(bytes: &[u8]) -> Result<String, DocumentError> {
    let tree = read_mtask(bytes)?;
    debug!(nodes = tree.len(), "opened document");
    Ok(render_tasklist(&tree))
}

/// Parses an edit buffer and merges it into `saved`
///
/// Without a saved tree the buffer tree is taken as is. Either way the result
/// is finalized, so every node has an id and every task its timestamps.
pub fn merge_buffer(
    buffer: &str,
    saved: Option<AstTree>,
    now: Timestamp,
) -> Result<Saved, DocumentError> {
    let edited = parse_tasklist(buffer)?;

    let (mut tree, report) = match saved {
        Some(mut tree) => {
            let report = tree.update(edited, now)?;
            (tree, report)
        }
        None => {
            let report = MergeReport {
                added: edited.len(),
                ..MergeReport::default()
            };
            (edited, report)
        }
    };

    tree.finalize(now);
    Ok(Saved { tree, report })
}

/// Converts an edit buffer to the Mtask document to store
pub fn save_document(
    buffer: &str,
    saved: Option<&[u8]>,
    now: Timestamp,
) -> Result<String, DocumentError> {
    let saved = saved.map(read_mtask).transpose()?;
    let Saved { tree, report } = merge_buffer(buffer, saved, now)?;

    info!(
        nodes = tree.len(),
        changed = report.changed,
        added = report.added,
        removed = report.removed,
        "saved document"
    );
    Ok(render_mtask(&tree)?)
}

/// Moves complete root chains from `active` into `archive`
pub fn archive_trees(active: AstTree, mut archive: AstTree, now: Timestamp) -> Archived {
    let (active, completed) = active.archive_completed();
    let moved = completed.roots.len();

    archive.absorb(completed);
    archive.finalize(now);

    Archived {
        active,
        archive,
        moved,
    }
}

/// Archives Mtask documents; returns the new `(active, archive)` documents
pub fn archive_document(
    active: &[u8],
    archive: Option<&[u8]>,
    now: Timestamp,
) -> Result<(String, String), DocumentError> {
    let active = read_mtask(active)?;
    let archive = archive.map(read_mtask).transpose()?.unwrap_or_default();

    let archived = archive_trees(active, archive, now);
    info!(moved = archived.moved, "archived completed task chains");

    Ok((render_mtask(&archived.active)?, render_mtask(&archived.archive)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Finished, NodeId, TaskStatus};
    use serde_json::json;

    const ID_X: &str = "0123456789ABCDEF0123456789ABCDEF";

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn saved_x() -> String {
        json!([{
            "_id": ID_X, "type": "task", "name": "write report", "indent": 0, "parent": null,
            "data": {
                "status": "todo",
                "created": "2020-01-01T00:00:00+00:00",
                "finished": false,
                "modified": "2020-01-01T00:00:00+00:00"
            }
        }])
        .to_string()
    }

    #[test]
    fn open_renders_tasklist() {
        let text = open_document(saved_x().as_bytes()).unwrap();
        assert_eq!(text, format!("*{{*{}*}} write report\n", ID_X));
    }

    #[test]
    fn open_empty_file() {
        assert_eq!(open_document(b"").unwrap(), "");
    }

    #[test]
    fn open_rejects_invalid_utf8() {
        assert!(matches!(
            open_document(&[0xff, 0xfe]),
            Err(DocumentError::Encoding(_))
        ));
    }

    #[test]
    fn save_merges_status_change() {
        let now = ts("2023-06-01T00:00:00+00:00");
        let buffer = format!("x{{*{}*}} write report\n", ID_X);

        let doc = save_document(&buffer, Some(saved_x().as_bytes()), now).unwrap();
        let tree = parse_mtask(&doc).unwrap();
        let meta = tree.roots[0].task_meta().copied().unwrap();

        assert_eq!(meta.status, TaskStatus::Done);
        assert_eq!(meta.created, Some(ts("2020-01-01T00:00:00+00:00")));
        assert_eq!(meta.modified, Some(now));
        assert_eq!(meta.finished, Finished::At(now));
    }

    #[test]
    fn save_without_changes_keeps_document() {
        let now = ts("2023-06-01T00:00:00+00:00");
        let buffer = open_document(saved_x().as_bytes()).unwrap();

        let doc = save_document(&buffer, Some(saved_x().as_bytes()), now).unwrap();
        let saved: serde_json::Value = serde_json::from_str(&saved_x()).unwrap();
        let stored: serde_json::Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(saved, stored);
    }

    #[test]
    fn save_new_document_finalizes() {
        let now = ts("2023-06-01T00:00:00+00:00");
        let doc = save_document("* one\n    x two\n", None, now).unwrap();
        let tree = parse_mtask(&doc).unwrap();

        assert_eq!(tree.len(), 2);
        let done = tree.roots[0].children[0].task_meta().copied().unwrap();
        assert_eq!(done.created, Some(now));
        assert_eq!(done.finished, Finished::At(now));
    }

    #[test]
    fn save_parse_error_propagates() {
        let now = Timestamp::now();
        let result = save_document("? nope\n", Some(saved_x().as_bytes()), now);
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn merge_reports_removed_nodes() {
        let now = Timestamp::now();
        let saved = read_mtask(saved_x().as_bytes()).unwrap();
        let Saved { tree, report } = merge_buffer("* something else\n", Some(saved), now).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(report.added, 1);
        assert_eq!(report.removed, 1);
        assert!(tree.find(&ID_X.parse::<NodeId>().unwrap()).is_none());
    }

    #[test]
    fn archive_moves_complete_chains() {
        let now = ts("2023-06-01T00:00:00+00:00");
        let active = save_document("x done\n    x sub\n* open\n", None, now).unwrap();

        let (active, archive) = archive_document(active.as_bytes(), None, now).unwrap();
        let active = parse_mtask(&active).unwrap();
        let archive = parse_mtask(&archive).unwrap();

        assert_eq!(active.roots.len(), 1);
        assert_eq!(active.roots[0].name, "open");
        assert_eq!(archive.roots.len(), 1);
        assert_eq!(archive.roots[0].name, "done");
        assert_eq!(archive.roots[0].children.len(), 1);
    }

    #[test]
    fn archive_appends_to_existing_archive() {
        let now = ts("2023-06-01T00:00:00+00:00");
        let old = save_document("x old\n", None, now).unwrap();
        let active = save_document("x new\n", None, now).unwrap();

        let (_, archive) = archive_document(active.as_bytes(), Some(old.as_bytes()), now).unwrap();
        let archive = parse_mtask(&archive).unwrap();
        let names: Vec<_> = archive.roots.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["old", "new"]);
    }

    #[test]
    fn archive_nothing_complete() {
        let now = Timestamp::now();
        let active = save_document("* a\no b\n", None, now).unwrap();
        let (after, archive) = archive_document(active.as_bytes(), None, now).unwrap();

        assert_eq!(parse_mtask(&after).unwrap().len(), 2);
        assert!(parse_mtask(&archive).unwrap().is_empty());
    }
}
