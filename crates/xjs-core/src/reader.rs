use crate::error::{CoreError, Result};

/// A position-tracking cursor over a `str`.
///
/// Every read advances `index`/`line`/`column` together so parsers never have to
/// recompute position from an offset. Captures are zero-copy slices of the original
/// input (the source is borrowed for the lifetime of the reader).
pub struct Reader<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    lines_skipped: usize,
    capture_start: Option<usize>,
}

/// Opaque snapshot returned by [`Reader::checkpoint`].
#[derive(Clone, Copy)]
pub struct ReaderCheckpoint {
    pos: usize,
    line: usize,
    column: usize,
    lines_skipped: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            lines_skipped: 0,
            capture_start: None,
        }
    }

    pub fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    pub fn index(&self) -> usize {
        self.pos
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn lines_skipped(&self) -> usize {
        self.lines_skipped
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// The raw source text between two byte offsets previously obtained from `index()`.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Advance past the current character, updating line/column bookkeeping.
    pub fn read(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Advance only if the current character equals `c`.
    pub fn read_if(&mut self, c: char) -> bool {
        if self.current() == Some(c) {
            self.read();
            true
        } else {
            false
        }
    }

    /// Advance past `c`, or fail with a `Syntax` error naming what was expected.
    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.read_if(c) {
            Ok(())
        } else {
            Err(self.syntax_error(format!(
                "expected '{c}', found {}",
                self.describe_current()
            )))
        }
    }

    pub fn syntax_error(&self, message: impl Into<String>) -> CoreError {
        CoreError::syntax(self.line, self.column, message)
    }

    fn describe_current(&self) -> String {
        match self.current() {
            Some(c) => format!("'{c}'"),
            None => "end of input".to_string(),
        }
    }

    /// Save position/line/column/lines_skipped for a later `restore`. Used by parsers
    /// that need to try a grammar production and fall back without a dedicated lookahead
    /// buffer.
    pub fn checkpoint(&self) -> ReaderCheckpoint {
        ReaderCheckpoint {
            pos: self.pos,
            line: self.line,
            column: self.column,
            lines_skipped: self.lines_skipped,
        }
    }

    pub fn restore(&mut self, checkpoint: ReaderCheckpoint) {
        self.pos = checkpoint.pos;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.lines_skipped = checkpoint.lines_skipped;
    }

    pub fn start_capture(&mut self) {
        self.capture_start = Some(self.pos);
    }

    /// Stop extending a capture without discarding the recorded start, so a later
    /// `end_capture` still yields the slice up to *this* point.
    pub fn pause_capture(&mut self) -> Result<&'a str> {
        let start = self
            .capture_start
            .ok_or_else(|| CoreError::InvalidState("pause_capture with no active capture".into()))?;
        Ok(&self.input[start..self.pos])
    }

    pub fn end_capture(&mut self) -> Result<&'a str> {
        let start = self
            .capture_start
            .take()
            .ok_or_else(|| CoreError::InvalidState("end_capture with no active capture".into()))?;
        Ok(&self.input[start..self.pos])
    }

    // -- whitespace -----------------------------------------------------

    pub fn skip_whitespace(&mut self) {
        self.lines_skipped = 0;
        while let Some(c) = self.current() {
            if c == '\n' {
                self.lines_skipped += 1;
                self.read();
            } else if c.is_whitespace() {
                self.read();
            } else {
                break;
            }
        }
    }

    /// Skip spaces, tabs, and CR, but stop at a newline.
    pub fn skip_line_whitespace(&mut self) {
        while matches!(self.current(), Some(' ' | '\t' | '\r')) {
            self.read();
        }
    }

    /// Skip up to `n` non-newline whitespace characters.
    pub fn skip_to_offset(&mut self, n: usize) {
        let mut skipped = 0;
        while skipped < n && matches!(self.current(), Some(c) if c != '\n' && c.is_whitespace()) {
            self.read();
            skipped += 1;
        }
    }

    pub fn skip_to_nl(&mut self) {
        while let Some(c) = self.current() {
            if c == '\n' {
                break;
            }
            self.read();
        }
    }

    // -- literals ---------------------------------------------------------

    /// Read a JSON-grammar number: optional `-`, integer part, optional fraction,
    /// optional exponent.
    pub fn read_number(&mut self) -> Result<f64> {
        self.start_capture();
        if self.current() == Some('-') {
            self.read();
        }
        if !matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            return Err(self.syntax_error("expected a digit"));
        }
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.read();
        }
        if self.current() == Some('.') {
            self.read();
            if !matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                return Err(self.syntax_error("expected a digit after decimal point"));
            }
            while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.read();
            }
        }
        if matches!(self.current(), Some('e' | 'E')) {
            self.read();
            if matches!(self.current(), Some('+' | '-')) {
                self.read();
            }
            if !matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                return Err(self.syntax_error("expected a digit in exponent"));
            }
            while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.read();
            }
        }
        let text = self.end_capture()?;
        text.parse()
            .map_err(|_| self.syntax_error(format!("invalid number literal '{text}'")))
    }

    /// Read a `quote`-delimited string with JSON escape sequences. The opening quote
    /// must already have been consumed by the caller.
    pub fn read_quoted(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.read() {
                None => return Err(self.syntax_error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.read_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn read_escape(&mut self) -> Result<char> {
        match self.read() {
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{08}'),
            Some('f') => Ok('\u{0C}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.read_unicode_escape(),
            Some(c) => Err(self.syntax_error(format!("invalid escape sequence '\\{c}'"))),
            None => Err(self.syntax_error("unterminated escape sequence")),
        }
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            match self.read() {
                Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                _ => return Err(self.syntax_error("invalid \\u escape: expected 4 hex digits")),
            }
        }
        let cp = u32::from_str_radix(&hex, 16)
            .map_err(|_| self.syntax_error(format!("invalid hex digits '{hex}'")))?;
        char::from_u32(cp).ok_or_else(|| self.syntax_error(format!("invalid code point U+{cp:04X}")))
    }

    /// Read a triple-quoted block (`"""..."""` or `'''...'''`), dedenting to the
    /// opening column and stripping exactly one leading/trailing newline.
    pub fn read_multi(&mut self, quote: char) -> Result<String> {
        let open_column = self.column.saturating_sub(3).max(1);
        let terminator: String = core::iter::repeat(quote).take(3).collect();
        let mut raw = String::new();
        loop {
            if self.remaining().starts_with(terminator.as_str()) {
                self.read();
                self.read();
                self.read();
                break;
            }
            match self.read() {
                Some(c) => raw.push(c),
                None => return Err(self.syntax_error("unterminated triple-quoted string")),
            }
        }
        let mut content = raw.as_str();
        if let Some(rest) = content.strip_prefix('\n') {
            content = rest;
        } else if let Some(rest) = content.strip_prefix("\r\n") {
            content = rest;
        }
        if let Some(rest) = content.strip_suffix('\n') {
            content = rest;
        }
        if open_column <= 1 {
            return Ok(content.to_string());
        }
        let indent = " ".repeat(open_column - 1);
        Ok(content
            .split('\n')
            .map(|line| line.strip_prefix(indent.as_str()).unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    // -- comments ---------------------------------------------------------

    /// Read a `//`-introduced line comment. The `//` must already be consumed.
    pub fn read_line_comment(&mut self) -> String {
        self.start_capture();
        self.skip_to_nl();
        self.pause_capture().unwrap_or_default().to_string()
    }

    /// Read a `#`-introduced line comment. The `#` must already be consumed.
    pub fn read_hash_comment(&mut self) -> String {
        self.read_line_comment()
    }

    /// Read a `/* ... */` block comment. The `/*` must already be consumed. Returns
    /// the text between the introducer and terminator (exclusive of both).
    pub fn read_block_comment(&mut self) -> Result<String> {
        self.start_capture();
        loop {
            if self.remaining().starts_with("*/") {
                let text = self.pause_capture()?.to_string();
                self.read();
                self.read();
                return Ok(text);
            }
            if self.read().is_none() {
                return Err(self.syntax_error("unterminated block comment"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_and_column() {
        let mut r = Reader::new("ab\ncd");
        assert_eq!((r.line(), r.column()), (1, 1));
        r.read();
        assert_eq!((r.line(), r.column()), (1, 2));
        r.read();
        r.read();
        assert_eq!((r.line(), r.column()), (2, 1));
    }

    #[test]
    fn read_number_integer() {
        let mut r = Reader::new("42,");
        assert_eq!(r.read_number().unwrap(), 42.0);
        assert_eq!(r.current(), Some(','));
    }

    #[test]
    fn read_number_decimal_exponent() {
        let mut r = Reader::new("-1.5e3 ");
        assert_eq!(r.read_number().unwrap(), -1500.0);
    }

    #[test]
    fn read_quoted_handles_escapes() {
        let mut r = Reader::new(r#"hello\nworld""#);
        assert_eq!(r.read_quoted('"').unwrap(), "hello\nworld");
    }

    #[test]
    fn read_quoted_unicode_escape() {
        let mut r = Reader::new(r#"A""#);
        assert_eq!(r.read_quoted('"').unwrap(), "A");
    }

    #[test]
    fn read_quoted_unterminated_errors() {
        let mut r = Reader::new("abc");
        assert!(r.read_quoted('"').is_err());
    }

    #[test]
    fn read_block_comment_captures_text() {
        let mut r = Reader::new(" body */rest");
        assert_eq!(r.read_block_comment().unwrap(), " body ");
        assert_eq!(r.remaining(), "rest");
    }

    #[test]
    fn read_line_comment_stops_at_newline() {
        let mut r = Reader::new(" hello\nnext");
        assert_eq!(r.read_line_comment(), " hello");
        assert_eq!(r.current(), Some('\n'));
    }

    #[test]
    fn capture_roundtrip() {
        let mut r = Reader::new("abcdef");
        r.start_capture();
        r.read();
        r.read();
        r.read();
        assert_eq!(r.end_capture().unwrap(), "abc");
    }
}
