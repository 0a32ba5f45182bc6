//! Domain models for TaskMage
//!
//! The document tree, per-node metadata and the merge/archive logic,
//! without any I/O concerns.

mod id;
mod time;
mod meta;
mod node;
mod tree;
mod merge;

pub use id::{IdError, NodeId};
pub use time::Timestamp;
pub use meta::{FileMeta, Finished, MetaError, NodeMeta, SectionMeta, TaskMeta, TaskStatus};
pub use node::{Node, NodeKind};
pub use tree::{AstTree, Visit, Walk};
pub use merge::{MergeError, MergeReport};
