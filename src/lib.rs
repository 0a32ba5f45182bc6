//! TaskMage - outline task lists backed by a mergeable JSON store
//!
//! Tasks are edited as TaskList text (status characters, indentation and
//! underlined headers) and stored as Mtask, a flat JSON array. Saving merges
//! the edit into the stored document so ids and timestamps survive edits.

pub mod domain;
pub mod format;
pub mod document;
pub mod storage;
pub mod cli;

pub use domain::{AstTree, Node, NodeId, NodeKind, NodeMeta, TaskMeta, TaskStatus, Timestamp};
pub use document::{archive_document, open_document, save_document, DocumentError};
pub use format::ParseError;
