//! Per-node metadata
//!
//! Metadata is a tagged sum over the node kinds. Every variant is an
//! immutable value: `touch`, `finalize` and `update` return a new value and
//! never modify the receiver.
//!
//! Only tasks carry data. `FileMeta` and `SectionMeta` are empty and exist so
//! that every node has a metadata value of the matching kind.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use super::node::NodeKind;
use super::time::Timestamp;

#[derive(Debug, Error, PartialEq)]
pub enum MetaError {
    #[error("Unknown task status: '{0}' (expected todo, wip, done or skip)")]
    UnknownStatus(String),

    #[error("Unknown status character: '{0}' (expected one of '*', 'o', 'x', '-')")]
    UnknownStatusChar(char),

    #[error("Timestamp has no timezone: '{0}'")]
    NaiveTimestamp(String),

    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("Invalid value for '{field}': expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Missing task field: '{0}'")]
    MissingField(&'static str),

    #[error("Unexpected task field: '{0}'")]
    UnexpectedField(String),

    #[error("Expected empty data for {0}")]
    NonEmptyData(NodeKind),
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TaskStatus {
    #[default]
    Todo,
    Wip,
    Done,
    Skip,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::Wip,
        TaskStatus::Done,
        TaskStatus::Skip,
    ];

    /// Returns true for statuses that close a task (done, skip)
    pub fn is_closed(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Skip)
    }

    /// The TaskList status character
    pub fn as_char(&self) -> char {
        match self {
            TaskStatus::Todo => '*',
            TaskStatus::Wip => 'o',
            TaskStatus::Done => 'x',
            TaskStatus::Skip => '-',
        }
    }

    /// Parses a TaskList status character
    pub fn from_char(c: char) -> Result<Self, MetaError> {
        match c {
            '*' => Ok(TaskStatus::Todo),
            'o' => Ok(TaskStatus::Wip),
            'x' => Ok(TaskStatus::Done),
            '-' => Ok(TaskStatus::Skip),
            other => Err(MetaError::UnknownStatusChar(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Wip => "wip",
            TaskStatus::Done => "done",
            TaskStatus::Skip => "skip",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "wip" => Ok(TaskStatus::Wip),
            "done" => Ok(TaskStatus::Done),
            "skip" => Ok(TaskStatus::Skip),
            other => Err(MetaError::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = MetaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Completion time of a task
///
/// `No` is the explicit "not finished" sentinel (`false` in Mtask). `Unset`
/// only appears in freshly lexed TaskList tokens, which say nothing about
/// completion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Finished {
    #[default]
    Unset,
    No,
    At(Timestamp),
}

impl Finished {
    pub fn instant(&self) -> Option<Timestamp> {
        match self {
            Finished::At(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Finished::Unset)
    }
}

impl Serialize for Finished {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Finished::Unset => serializer.serialize_none(),
            Finished::No => serializer.serialize_bool(false),
            Finished::At(ts) => ts.serialize(serializer),
        }
    }
}

/// Task attributes: status plus creation, completion and modification times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaskMeta {
    pub status: TaskStatus,
    pub created: Option<Timestamp>,
    pub finished: Finished,
    pub modified: Option<Timestamp>,
}

const TASK_FIELDS: [&str; 4] = ["status", "created", "finished", "modified"];

impl TaskMeta {
    /// Creates metadata carrying only a status, as the TaskList lexer does
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Returns a copy with `modified` bumped to `now` and defaults filled in
    pub fn touch(&self, now: Timestamp) -> Self {
        Self {
            modified: Some(now),
            ..self.fill_defaults(now)
        }
    }

    /// Returns a copy with defaults filled in; an existing `modified` is kept
    pub fn finalize(&self, now: Timestamp) -> Self {
        Self {
            modified: self.modified.or(Some(now)),
            ..self.fill_defaults(now)
        }
    }

    fn fill_defaults(&self, now: Timestamp) -> Self {
        let finished = if self.status.is_closed() {
            Finished::At(self.finished.instant().unwrap_or(now))
        } else {
            Finished::No
        };

        Self {
            status: self.status,
            created: self.created.or(Some(now)),
            finished,
            modified: self.modified,
        }
    }

    /// Returns true if `other` agrees with `self` on every field it expresses
    ///
    /// Unset `created`/`finished`/`modified` on `other` mean "unspecified".
    pub fn agrees_with(&self, other: &TaskMeta) -> bool {
        self.status == other.status
            && other.created.map_or(true, |c| self.created == Some(c))
            && (!other.finished.is_set() || self.finished == other.finished)
            && other.modified.map_or(true, |m| self.modified == Some(m))
    }

    /// Merges `other` (the edit) into `self` (the saved value)
    ///
    /// Returns `None` when `other` expresses nothing new, otherwise the merged
    /// value with `modified` set to `now`.
    pub fn update(&self, other: &TaskMeta, now: Timestamp) -> Option<TaskMeta> {
        if self.agrees_with(other) {
            return None;
        }

        let finished = if !other.status.is_closed() {
            Finished::No
        } else if let (true, Some(ts)) = (self.status.is_closed(), self.finished.instant()) {
            Finished::At(ts)
        } else if let Some(ts) = other.finished.instant() {
            Finished::At(ts)
        } else if let Some(ts) = self.finished.instant() {
            Finished::At(ts)
        } else {
            Finished::At(now)
        };

        Some(TaskMeta {
            status: other.status,
            created: other.created.or(self.created),
            finished,
            modified: Some(now),
        })
    }

    /// Reads the `data` object of an Mtask task record
    ///
    /// Exactly the keys `status`, `created`, `finished` and `modified` must
    /// be present.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, MetaError> {
        let obj = value.as_object().ok_or(MetaError::WrongType {
            field: "data",
            expected: "an object",
        })?;

        if let Some(extra) = obj.keys().find(|k| !TASK_FIELDS.contains(&k.as_str())) {
            return Err(MetaError::UnexpectedField(extra.clone()));
        }
        let field = |name: &'static str| obj.get(name).ok_or(MetaError::MissingField(name));

        let status = match field("status")? {
            serde_json::Value::String(s) => s.parse()?,
            _ => {
                return Err(MetaError::WrongType {
                    field: "status",
                    expected: "a string",
                })
            }
        };

        let finished = match field("finished")? {
            serde_json::Value::Null => Finished::Unset,
            serde_json::Value::Bool(false) => Finished::No,
            serde_json::Value::String(s) => Finished::At(s.parse()?),
            _ => {
                return Err(MetaError::WrongType {
                    field: "finished",
                    expected: "false, null or an ISO-8601 timestamp",
                })
            }
        };

        Ok(Self {
            status,
            created: optional_timestamp("created", field("created")?)?,
            finished,
            modified: optional_timestamp("modified", field("modified")?)?,
        })
    }
}

fn optional_timestamp(
    field: &'static str,
    value: &serde_json::Value,
) -> Result<Option<Timestamp>, MetaError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s.parse()?)),
        _ => Err(MetaError::WrongType {
            field,
            expected: "null or an ISO-8601 timestamp",
        }),
    }
}

/// Metadata of a section header (empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionMeta;

/// Metadata of a file header (empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileMeta;

/// Kind-specific metadata of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMeta {
    Task(TaskMeta),
    Section(SectionMeta),
    File(FileMeta),
}

impl NodeMeta {
    /// Default metadata for a node kind
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Task => NodeMeta::Task(TaskMeta::default()),
            NodeKind::Section => NodeMeta::Section(SectionMeta),
            NodeKind::File => NodeMeta::File(FileMeta),
        }
    }

    /// The node kind this metadata belongs to
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeMeta::Task(_) => NodeKind::Task,
            NodeMeta::Section(_) => NodeKind::Section,
            NodeMeta::File(_) => NodeKind::File,
        }
    }

    pub fn as_task(&self) -> Option<&TaskMeta> {
        match self {
            NodeMeta::Task(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn touch(&self, now: Timestamp) -> Self {
        match self {
            NodeMeta::Task(meta) => NodeMeta::Task(meta.touch(now)),
            other => *other,
        }
    }

    pub fn finalize(&self, now: Timestamp) -> Self {
        match self {
            NodeMeta::Task(meta) => NodeMeta::Task(meta.finalize(now)),
            other => *other,
        }
    }

    /// Merges `other` into `self`; `None` means nothing changed
    ///
    /// Metadata of a different variant replaces `self` wholesale.
    pub fn update(&self, other: &NodeMeta, now: Timestamp) -> Option<NodeMeta> {
        match (self, other) {
            (NodeMeta::Task(ours), NodeMeta::Task(theirs)) => {
                ours.update(theirs, now).map(NodeMeta::Task)
            }
            (NodeMeta::Section(_), NodeMeta::Section(_)) | (NodeMeta::File(_), NodeMeta::File(_)) => {
                None
            }
            (_, theirs) => Some(*theirs),
        }
    }

    /// Reads the `data` object of an Mtask record of the given kind
    pub fn from_json(kind: NodeKind, value: &serde_json::Value) -> Result<Self, MetaError> {
        match kind {
            NodeKind::Task => TaskMeta::from_json(value).map(NodeMeta::Task),
            NodeKind::Section | NodeKind::File => match value.as_object() {
                Some(obj) if obj.is_empty() => Ok(NodeMeta::for_kind(kind)),
                _ => Err(MetaError::NonEmptyData(kind)),
            },
        }
    }
}

/// Serializes as the Mtask `data` object: the task fields, or `{}`
impl Serialize for NodeMeta {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            NodeMeta::Task(meta) => meta.serialize(serializer),
            NodeMeta::Section(_) | NodeMeta::File(_) => serializer.serialize_map(Some(0))?.end(),
        }
    }
}
