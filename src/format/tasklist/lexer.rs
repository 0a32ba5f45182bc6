//! TaskList lexer
//!
//! Turns TaskList text into linear tokens whose `parent` links are already
//! resolved. The lexer works line by line:
//!
//! ```text
//! {*ID*}file::notes.mtask      <- header title (optional id, optional file::)
//! =======================      <- underline, at least as long as the title
//!
//! *{*ID*} buy milk             <- task: status char, optional id, space, name
//!     x call the vet           <- nested task (deeper indentation)
//!       second line of name    <- continuation (two spaces deeper)
//! # a comment
//! ```
//!
//! Parents are resolved with two stacks. Open headers are kept as
//! `(depth, id)`; the depth of an underline character is the order in which
//! it was first seen, with `=` always at depth 0. Open tasks are kept as
//! `(indent, id)` and reset at every header. A task's parent is the nearest
//! open task with smaller indentation, else the innermost open header.

use tracing::trace;

use super::{CONTINUATION_INDENT, FILE_PREFIX, HEADER_CHARS, ID_CLOSE, ID_OPEN};
use crate::domain::{NodeId, NodeKind, NodeMeta, TaskMeta, TaskStatus};
use crate::format::iostream::IoStream;
use crate::format::token::{ParseError, Token};

/// Lexer over one TaskList document
pub struct TaskListLexer<'a> {
    stream: IoStream<'a>,
    /// 1-based number of the line under the cursor
    line_no: usize,
    /// Underline characters in depth order
    header_chars: Vec<char>,
    headers: Vec<(usize, NodeId)>,
    tasks: Vec<(usize, NodeId)>,
    tokens: Vec<Token>,
}

impl<'a> TaskListLexer<'a> {
    pub fn new(stream: IoStream<'a>) -> Self {
        Self {
            stream,
            line_no: 1,
            header_chars: vec!['='],
            headers: Vec::new(),
            tasks: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Consumes the whole stream
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        while let Some(line) = self.stream.peek_line(0) {
            if is_blank(&line) {
                self.advance();
            } else if let Some(underline) = self.header_underline(&line) {
                self.lex_header(&line, &underline)?;
            } else if line.starts_with('#') {
                self.advance();
            } else {
                self.lex_task(&line)?;
            }
        }

        trace!(tokens = self.tokens.len(), "lexed tasklist");
        Ok(self.tokens)
    }

    fn advance(&mut self) {
        self.stream.next_line();
        self.line_no += 1;
    }

    /// Returns the `k`-th line after the current one (0 = next line)
    fn peek_following(&mut self, k: usize) -> Option<String> {
        let mut offset = 0;
        let mut line = self.stream.peek_line(0)?;
        for _ in 0..=k {
            offset += line.chars().count() + 1;
            line = self.stream.peek_line(offset)?;
        }
        Some(line)
    }

    /// If `line` is a header title, returns its underline
    fn header_underline(&mut self, line: &str) -> Option<String> {
        if line.starts_with(char::is_whitespace) {
            return None;
        }

        let next = self.peek_following(0)?;
        is_underline(&next).then(|| next.trim_end().to_string())
    }

    fn lex_header(&mut self, line: &str, underline: &str) -> Result<(), ParseError> {
        let title = line.trim_end();
        if underline.chars().count() < title.chars().count() {
            return Err(ParseError::syntax(
                self.line_no + 1,
                format!(
                    "underline is shorter than header '{}' ({} < {})",
                    title,
                    underline.chars().count(),
                    title.chars().count()
                ),
            ));
        }

        let (id, rest) = self.split_id(title)?;
        let (kind, name) = match rest.strip_prefix(FILE_PREFIX) {
            Some(name) => (NodeKind::File, name),
            None => (NodeKind::Section, rest),
        };
        if name.trim().is_empty() {
            return Err(ParseError::syntax(self.line_no, "header has no name"));
        }

        let underline_char = underline.chars().next().unwrap_or('=');
        let depth = match self.header_chars.iter().position(|&c| c == underline_char) {
            Some(depth) => depth,
            None => {
                self.header_chars.push(underline_char);
                self.header_chars.len() - 1
            }
        };

        while self.headers.last().is_some_and(|(d, _)| *d >= depth) {
            self.headers.pop();
        }
        let parent = self.headers.last().map(|(_, id)| id.clone());
        let id = id.unwrap_or_else(NodeId::generate);

        self.headers.push((depth, id.clone()));
        self.tasks.clear();
        self.tokens.push(Token {
            id,
            kind,
            name: name.trim().to_string(),
            indent: depth,
            parent,
            meta: NodeMeta::for_kind(kind),
        });

        self.advance();
        self.advance();
        Ok(())
    }

    fn lex_task(&mut self, line: &str) -> Result<(), ParseError> {
        let indent = leading_spaces(line);
        let rest = &line[indent..];

        let Some(status_char) = rest.chars().next() else {
            return Err(ParseError::syntax(self.line_no, "expected a task"));
        };
        if status_char == '\t' {
            return Err(ParseError::syntax(
                self.line_no,
                "tabs are not allowed in indentation",
            ));
        }
        let status = TaskStatus::from_char(status_char).map_err(|_| {
            ParseError::syntax(
                self.line_no,
                format!("unexpected character '{}' at start of line", status_char),
            )
        })?;

        let (id, after) = self.split_id(&rest[status_char.len_utf8()..])?;
        if !after.starts_with(' ') {
            return Err(ParseError::syntax(
                self.line_no,
                format!("expected a space after status '{}'", status_char),
            ));
        }
        let first = after.trim();
        if first.is_empty() {
            return Err(ParseError::syntax(self.line_no, "task has no name"));
        }
        self.advance();

        let mut name = first.to_string();
        self.lex_continuation(indent, &mut name);

        while self.tasks.last().is_some_and(|(i, _)| *i >= indent) {
            self.tasks.pop();
        }
        let parent = self
            .tasks
            .last()
            .or(self.headers.last())
            .map(|(_, id)| id.clone());
        let id = id.unwrap_or_else(NodeId::generate);

        self.tasks.push((indent, id.clone()));
        self.tokens.push(Token {
            id,
            kind: NodeKind::Task,
            name,
            indent,
            parent,
            meta: NodeMeta::Task(TaskMeta::new(status)),
        });
        Ok(())
    }

    /// Appends continuation lines of a task name
    ///
    /// A continuation line is indented deeper than the task and either sits
    /// exactly at the continuation column or does not start a task itself.
    /// Blank lines belong to the name only when the next non-blank line is a
    /// continuation.
    fn lex_continuation(&mut self, indent: usize, name: &mut String) {
        let column = indent + CONTINUATION_INDENT;
        let is_continuation = |line: &str| {
            let lead = leading_spaces(line);
            lead == column || (lead > indent && !starts_task(line.trim_start()))
        };

        loop {
            let Some(line) = self.stream.peek_line(0) else {
                break;
            };

            if is_blank(&line) {
                let mut blanks = 1;
                let next = loop {
                    match self.peek_following(blanks - 1) {
                        Some(l) if is_blank(&l) => blanks += 1,
                        other => break other,
                    }
                };

                if !next.as_deref().is_some_and(is_continuation) {
                    break;
                }
                for _ in 0..blanks {
                    name.push('\n');
                    self.advance();
                }
            } else if is_continuation(line.as_str()) {
                let strip = leading_spaces(&line).min(column);
                name.push('\n');
                name.push_str(line[strip..].trim_end());
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Splits a leading `{*ID*}` tag off `text`
    fn split_id<'t>(&self, text: &'t str) -> Result<(Option<NodeId>, &'t str), ParseError> {
        let Some(tagged) = text.strip_prefix(ID_OPEN) else {
            return Ok((None, text));
        };

        let end = tagged.find(ID_CLOSE).ok_or_else(|| {
            ParseError::syntax(self.line_no, "unterminated id tag (missing '*}')")
        })?;
        let id = tagged[..end].parse::<NodeId>().map_err(|e| {
            ParseError::syntax(self.line_no, format!("malformed id tag: {}", e))
        })?;

        Ok((Some(id), &tagged[end + ID_CLOSE.len()..]))
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// A line made of one repeated header character
fn is_underline(line: &str) -> bool {
    let line = line.trim_end();
    let mut chars = line.chars();
    match chars.next() {
        Some(first) => HEADER_CHARS.contains(&first) && chars.all(|c| c == first),
        None => false,
    }
}

/// Whether `text` (already stripped of indentation) begins a task
fn starts_task(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if TaskStatus::from_char(c).is_ok() => {
            let after = chars.as_str();
            after.starts_with(' ') || after.starts_with(ID_OPEN)
        }
        _ => false,
    }
}
