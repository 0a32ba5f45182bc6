//! Node identifiers
//!
//! ID Format: 32 uppercase hex characters, the simple form of a UUID
//! (e.g., `0F8A3C2B9D1E4F5A8B7C6D5E4F3A2B1C`).
//!
//! Ids are written into TaskList documents as `{*ID*}` tags and into Mtask
//! files as the `_id`/`parent` fields. Once assigned they never change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Number of hex characters in a node id
pub const ID_LEN: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid node ID: expected 32 hex characters, got '{0}'")]
    InvalidNodeId(String),
}

/// Identifier of a task, section or file node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Generates a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string().to_ascii_uppercase())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_LEN || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidNodeId(s.to_string()));
        }

        Ok(Self(s.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for NodeId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
