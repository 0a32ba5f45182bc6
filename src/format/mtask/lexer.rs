use serde::Deserialize;
use tracing::trace;

use crate::domain::{NodeId, NodeKind, NodeMeta};
use crate::format::iostream::IoStream;
use crate::format::token::{ParseError, Token};

/// One record exactly as stored; every key is required and no others are
/// allowed
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecord {
    #[serde(rename = "_id")]
    id: NodeId,
    #[serde(rename = "type")]
    kind: NodeKind,
    name: String,
    indent: usize,
    #[serde(deserialize_with = "Option::deserialize")]
    parent: Option<NodeId>,
    data: serde_json::Value,
}

/// Lexer over one Mtask document
pub struct MtaskLexer<'a> {
    stream: IoStream<'a>,
}

impl<'a> MtaskLexer<'a> {
    pub fn new(stream: IoStream<'a>) -> Self {
        Self { stream }
    }

    /// Reads the whole document; blank input yields no tokens
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let text = self.stream.read();
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| ParseError::Json(e.to_string()))?;

        let tokens = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| record_token(index, value))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(tokens = tokens.len(), "lexed mtask");
        Ok(tokens)
    }
}

fn record_token(index: usize, value: serde_json::Value) -> Result<Token, ParseError> {
    let record: RawRecord = serde_json::from_value(value).map_err(|e| ParseError::Record {
        index,
        message: e.to_string(),
    })?;

    let meta = NodeMeta::from_json(record.kind, &record.data)
        .map_err(|source| ParseError::Data { index, source })?;

    Ok(Token {
        id: record.id,
        kind: record.kind,
        name: record.name,
        indent: record.indent,
        parent: record.parent,
        meta,
    })
}
