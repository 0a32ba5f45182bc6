//! Character cursor with lookahead
//!
//! Lexers read their input through an [`IoStream`]. Characters are pulled
//! from the source on demand into a small lookahead buffer, so peeking ahead
//! never re-reads or seeks the source.
//!
//! Two sources are supported:
//! - text (a string or anything readable), consumed character by character
//! - an editor buffer given as newline-free lines; the stream inserts a `\n`
//!   after every line, including the last one
//!
//! Reading past the end is not an error: `next`/`peek` return `None`.

use std::collections::VecDeque;
use std::io::Read;

enum Source<'a> {
    Text { text: String, pos: usize },
    Lines(Box<dyn Iterator<Item = String> + 'a>),
}

/// A character cursor over text
pub struct IoStream<'a> {
    source: Source<'a>,
    lookahead: VecDeque<char>,
}

impl<'a> IoStream<'a> {
    /// Stream over a string
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            source: Source::Text {
                text: text.into(),
                pos: 0,
            },
            lookahead: VecDeque::new(),
        }
    }

    /// Stream over UTF-8 bytes read from `reader`
    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_text(text))
    }

    /// Stream over editor buffer lines (without line terminators)
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: Into<String> + 'a,
    {
        Self {
            source: Source::Lines(Box::new(lines.into_iter().map(Into::into))),
            lookahead: VecDeque::new(),
        }
    }

    /// Pulls from the source until at least `count` characters are buffered
    /// or the source is exhausted
    fn fill(&mut self, count: usize) {
        while self.lookahead.len() < count {
            match &mut self.source {
                Source::Text { text, pos } => match text[*pos..].chars().next() {
                    Some(c) => {
                        *pos += c.len_utf8();
                        self.lookahead.push_back(c);
                    }
                    None => return,
                },
                Source::Lines(lines) => match lines.next() {
                    Some(line) => {
                        self.lookahead.extend(line.chars());
                        self.lookahead.push_back('\n');
                    }
                    None => return,
                },
            }
        }
    }

    /// Returns the character `n` positions ahead and advances past it
    pub fn next(&mut self, n: usize) -> Option<char> {
        self.fill(n + 1);
        if self.lookahead.len() > n {
            self.lookahead.drain(..n);
            self.lookahead.pop_front()
        } else {
            self.lookahead.clear();
            None
        }
    }

    /// Returns the character `n` positions ahead without advancing
    pub fn peek(&mut self, n: usize) -> Option<char> {
        self.fill(n + 1);
        self.lookahead.get(n).copied()
    }

    /// Returns the characters from offset `n` up to the next newline,
    /// without advancing; `None` if offset `n` is at or past the end
    pub fn peek_line(&mut self, n: usize) -> Option<String> {
        self.peek(n)?;

        let mut line = String::new();
        let mut offset = n;
        while let Some(c) = self.peek(offset) {
            if c == '\n' {
                break;
            }
            line.push(c);
            offset += 1;
        }
        Some(line)
    }

    /// Consumes the current line including its newline and returns it
    /// without the newline; `None` at the end
    pub fn next_line(&mut self) -> Option<String> {
        let line = self.peek_line(0)?;
        self.next(line.chars().count());
        Some(line)
    }

    /// Returns true when no characters remain
    pub fn is_eof(&mut self) -> bool {
        self.peek(0).is_none()
    }

    /// Consumes and returns everything that remains
    ///
    /// Non-empty output always ends with a newline.
    pub fn read(&mut self) -> String {
        let mut rest: String = self.lookahead.drain(..).collect();
        match &mut self.source {
            Source::Text { text, pos } => {
                rest.push_str(&text[*pos..]);
                *pos = text.len();
                if !rest.is_empty() && !rest.ends_with('\n') {
                    rest.push('\n');
                }
            }
            Source::Lines(lines) => {
                for line in lines {
                    rest.push_str(&line);
                    rest.push('\n');
                }
            }
        }
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_peek() {
        let mut stream = IoStream::from_text("abc");
        assert_eq!(stream.peek(0), Some('a'));
        assert_eq!(stream.peek(2), Some('c'));
        assert_eq!(stream.next(0), Some('a'));
        assert_eq!(stream.next(1), Some('c'));
        assert_eq!(stream.next(0), None);
        assert!(stream.is_eof());
    }

    #[test]
    fn past_eof_is_none() {
        let mut stream = IoStream::from_text("ab");
        assert_eq!(stream.peek(5), None);
        assert_eq!(stream.next(5), None);
        assert_eq!(stream.next(0), None);
    }

    #[test]
    fn peek_line_does_not_advance() {
        let mut stream = IoStream::from_text("first\nsecond\n");
        assert_eq!(stream.peek_line(0).as_deref(), Some("first"));
        assert_eq!(stream.peek_line(6).as_deref(), Some("second"));
        assert_eq!(stream.peek(0), Some('f'));
    }

    #[test]
    fn peek_line_at_eof() {
        let mut stream = IoStream::from_text("x\n");
        assert_eq!(stream.peek_line(2), None);
        stream.next(1);
        assert_eq!(stream.peek_line(0), None);
    }

    #[test]
    fn next_line_consumes_newline() {
        let mut stream = IoStream::from_text("one\n\nthree");
        assert_eq!(stream.next_line().as_deref(), Some("one"));
        assert_eq!(stream.next_line().as_deref(), Some(""));
        assert_eq!(stream.next_line().as_deref(), Some("three"));
        assert_eq!(stream.next_line(), None);
    }

    #[test]
    fn buffer_lines_get_newlines() {
        let mut stream = IoStream::from_lines(vec!["* a", "* b"]);
        assert_eq!(stream.peek(3), Some('\n'));
        assert_eq!(stream.read(), "* a\n* b\n");
    }

    #[test]
    fn read_returns_remainder() {
        let mut stream = IoStream::from_text("héllo\nworld\n");
        stream.next(1);
        assert_eq!(stream.read(), "llo\nworld\n");
        assert_eq!(stream.read(), "");
    }

    #[test]
    fn multibyte_characters() {
        let mut stream = IoStream::from_text("ü✓");
        assert_eq!(stream.next(0), Some('ü'));
        assert_eq!(stream.peek(0), Some('✓'));
    }

    #[test]
    fn from_reader() {
        let mut stream = IoStream::from_reader("x y\n".as_bytes()).unwrap();
        assert_eq!(stream.read(), "x y\n");
    }

    #[test]
    fn read_terminates_last_line() {
        let mut stream = IoStream::from_text("one\ntwo");
        stream.next(0);
        assert_eq!(stream.read(), "ne\ntwo\n");
        assert_eq!(IoStream::from_text("").read(), "");
    }

    #[test]
    fn buffer_lines_from_borrowed_strings() {
        let owned = vec![String::from("* a"), String::from("x b")];
        let mut stream = IoStream::from_lines(owned.iter().map(String::as_str));
        assert_eq!(stream.read(), "* a\nx b\n");
    }

    #[test]
    fn empty_sources() {
        assert!(IoStream::from_text("").is_eof());
        assert!(IoStream::from_lines(Vec::<String>::new()).is_eof());
    }
}
