//! The relaxed "XJS" grammar: unquoted keys/values, single/double/triple-quoted
//! strings, always-optional trailing commas, and root-brace omission.
//!
//! Unlike [`crate::token`], this is a direct recursive-descent parser over
//! [`crate::reader::Reader`] and [`crate::scanner`] rather than a consumer of the
//! tokenizer's containerized stream. The tokenizer's pass loses the exact inter-token
//! whitespace this grammar needs to preserve (comment placement, blank-line counts), so
//! reproducing that here would mean re-deriving it from token spans — simpler to read
//! straight off the reader once.

use crate::error::Result;
use crate::reader::Reader;
use crate::scanner::{self, Context};
use crate::value::{
    Array, Comment, CommentPosition, CommentStyle, Object, Reference, StringStyle, ValueKind,
    ValueNode,
};

pub fn parse_xjs(input: &str) -> Result<Reference> {
    let mut parser = Parser::new(input);
    let (lines_above, header) = parser.take_leading()?;
    let mut root_braces_omitted = false;
    let mut node = match parser.reader.current() {
        Some('{') => {
            parser.reader.read();
            parser.parse_object_body(Some('}'))?
        }
        Some('[') => parser.parse_array()?,
        None => {
            root_braces_omitted = true;
            ValueNode::new(ValueKind::Object(Object::new()))
        }
        _ => {
            root_braces_omitted = true;
            parser.parse_object_body(None)?
        }
    };
    if root_braces_omitted {
        node.metadata.flags.set_bit(crate::value::Flags::ROOT_BRACES_OMITTED);
    }
    node.metadata.lines_above = Some(lines_above);
    if let Some(c) = header {
        node.metadata.comments_mut().set(CommentPosition::Header, c);
    }
    if let Some(c) = parser.take_eol()? {
        node.metadata.comments_mut().set(CommentPosition::Eol, c);
    }
    let (_, footer) = parser.take_leading()?;
    if let Some(c) = footer {
        node.metadata.comments_mut().set(CommentPosition::Footer, c);
    }
    if !parser.reader.at_end() {
        return Err(parser
            .reader
            .syntax_error("unexpected trailing content after document"));
    }
    Ok(Reference::new(node))
}

struct Parser<'a> {
    reader: Reader<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            reader: Reader::new(input),
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.reader.read();
        }
    }

    fn starts_comment(&self) -> bool {
        let r = self.reader.remaining();
        matches!(self.reader.current(), Some('#')) || r.starts_with("//") || r.starts_with("/*")
    }

    fn read_comment_unit(&mut self) -> Result<Comment> {
        let r = self.reader.remaining();
        if self.reader.current() == Some('#') {
            self.reader.read();
            Ok(Comment::new(CommentStyle::Hash, self.reader.read_hash_comment()))
        } else if r.starts_with("///") {
            self.advance_by(3);
            Ok(Comment::new(CommentStyle::LineDoc, self.reader.read_line_comment()))
        } else if r.starts_with("//") {
            self.advance_by(2);
            Ok(Comment::new(CommentStyle::Line, self.reader.read_line_comment()))
        } else if r.starts_with("/**") && !r.starts_with("/**/") {
            self.advance_by(3);
            Ok(Comment::new(CommentStyle::BlockDoc, self.reader.read_block_comment()?))
        } else if r.starts_with("/*") {
            self.advance_by(2);
            Ok(Comment::new(CommentStyle::Block, self.reader.read_block_comment()?))
        } else {
            Err(self.reader.syntax_error("expected a comment"))
        }
    }

    /// Skip whitespace and any run of leading comments, returning the blank-line count
    /// before the run and the last comment seen. A run of several consecutive comments
    /// collapses to the one nearest the value, matching `CommentHolder`'s one-slot-per-
    /// position shape and the object model's "last assignment wins" convention.
    fn take_leading(&mut self) -> Result<(u32, Option<Comment>)> {
        self.reader.skip_whitespace();
        let lines_above = self.reader.lines_skipped() as u32;
        let mut comment = None;
        while self.starts_comment() {
            comment = Some(self.read_comment_unit()?);
            self.reader.skip_whitespace();
        }
        Ok((lines_above, comment))
    }

    fn take_eol(&mut self) -> Result<Option<Comment>> {
        self.reader.skip_line_whitespace();
        if self.starts_comment() {
            Ok(Some(self.read_comment_unit()?))
        } else {
            Ok(None)
        }
    }

    fn word_follows(&self, word: &str) -> bool {
        let rest = self.reader.remaining();
        rest.starts_with(word)
            && !rest[word.len()..]
                .chars()
                .next()
                .is_some_and(is_word_char)
    }

    fn next_is_digit(&self) -> bool {
        self.reader.remaining()[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn at_triple(&self, quote: char) -> bool {
        let triple: String = core::iter::repeat(quote).take(3).collect();
        self.reader.remaining().starts_with(triple.as_str())
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.reader.current() {
            Some('"') if self.at_triple('"') => {
                self.advance_by(3);
                self.reader.read_multi('"')
            }
            Some('\'') if self.at_triple('\'') => {
                self.advance_by(3);
                self.reader.read_multi('\'')
            }
            Some('"') => {
                self.reader.read();
                self.reader.read_quoted('"')
            }
            Some('\'') => {
                self.reader.read();
                self.reader.read_quoted('\'')
            }
            _ => {
                let text = scanner::scan_implicit(&mut self.reader, Context::Key)?;
                if text.is_empty() {
                    return Err(self.reader.syntax_error("an implicit key cannot be empty"));
                }
                Ok(text)
            }
        }
    }

    fn parse_quoted_value(&mut self, quote: char) -> Result<ValueNode> {
        if self.at_triple(quote) {
            self.advance_by(3);
            let text = self.reader.read_multi(quote)?;
            Ok(ValueNode::new(ValueKind::String(text, StringStyle::Multi)))
        } else {
            self.reader.read();
            let text = self.reader.read_quoted(quote)?;
            let style = if quote == '"' {
                StringStyle::Double
            } else {
                StringStyle::Single
            };
            Ok(ValueNode::new(ValueKind::String(text, style)))
        }
    }

    /// Try a JSON-grammar number; if it isn't followed by a value terminator (meaning
    /// the leading digits were actually the start of an implicit string like `123abc`),
    /// roll back and scan it as implicit text instead.
    fn parse_number_or_implicit(&mut self) -> Result<ValueNode> {
        let checkpoint = self.reader.checkpoint();
        let start = self.reader.index();
        if let Ok(n) = self.reader.read_number() {
            let text = self.reader.slice(start, self.reader.index());
            let boundary_ok = matches!(self.reader.current(), None | Some(',' | '\n' | '}' | ']' | ')'))
                || self.reader.current().is_some_and(char::is_whitespace)
                || self.starts_comment();
            if boundary_ok {
                let is_integral = !text.contains(['.', 'e', 'E']);
                if is_integral {
                    if let Some(i) = crate::value::integer_if_exact(n) {
                        return Ok(ValueNode::new(ValueKind::Integer(i)));
                    }
                }
                return Ok(ValueNode::new(ValueKind::Decimal(n)));
            }
        }
        self.reader.restore(checkpoint);
        self.parse_implicit_value()
    }

    fn parse_implicit_value(&mut self) -> Result<ValueNode> {
        let text = scanner::scan_implicit(&mut self.reader, Context::Value)?;
        if !text.is_empty() && text.trim().is_empty() {
            return Err(self
                .reader
                .syntax_error("an implicit value cannot consist only of whitespace"));
        }
        Ok(ValueNode::new(ValueKind::String(text, StringStyle::Implicit)))
    }

    fn parse_value(&mut self) -> Result<ValueNode> {
        match self.reader.current() {
            Some('{') => {
                self.reader.read();
                self.parse_object_body(Some('}'))
            }
            Some('[') => self.parse_array(),
            Some('"') => self.parse_quoted_value('"'),
            Some('\'') => self.parse_quoted_value('\''),
            Some('t') if self.word_follows("true") => {
                self.advance_by(4);
                Ok(ValueNode::new(ValueKind::Bool(true)))
            }
            Some('f') if self.word_follows("false") => {
                self.advance_by(5);
                Ok(ValueNode::new(ValueKind::Bool(false)))
            }
            Some('n') if self.word_follows("null") => {
                self.advance_by(4);
                Ok(ValueNode::new(ValueKind::Null))
            }
            Some(c) if c.is_ascii_digit() || (c == '-' && self.next_is_digit()) => {
                self.parse_number_or_implicit()
            }
            Some(_) => self.parse_implicit_value(),
            None => Err(self.reader.syntax_error("unexpected end of input")),
        }
    }

    fn parse_array(&mut self) -> Result<ValueNode> {
        self.reader.expect('[')?;
        let mut arr = Array::new();
        let mut interior = None;
        loop {
            let (lines_above, header) = self.take_leading()?;
            match self.reader.current() {
                Some(']') => {
                    self.reader.read();
                    if let Some(c) = header {
                        if arr.is_empty() {
                            interior = Some(c);
                        } else {
                            set_array_footer(&arr, c)?;
                        }
                    }
                    break;
                }
                None => return Err(self.reader.syntax_error("unterminated array")),
                _ => {}
            }
            let mut value = self.parse_value()?;
            value.metadata.lines_above = Some(lines_above);
            if let Some(c) = header {
                value.metadata.comments_mut().set(CommentPosition::Header, c);
            }
            if let Some(c) = self.take_eol()? {
                value.metadata.comments_mut().set(CommentPosition::Eol, c);
            }
            arr.push(Reference::new(value));
            self.reader.read_if(',');
        }
        let mut node = ValueNode::new(ValueKind::Array(arr));
        if let Some(c) = interior {
            node.metadata.comments_mut().set(CommentPosition::Interior, c);
        }
        Ok(node)
    }

    /// Parse `key: value` members until `closer` (when braced) or end of input (when
    /// `None`, for a root that omitted its outer braces).
    fn parse_object_body(&mut self, closer: Option<char>) -> Result<ValueNode> {
        let mut obj = Object::new();
        let mut interior = None;
        loop {
            let (lines_above, header) = self.take_leading()?;
            let at_close = match closer {
                Some(c) => self.reader.current() == Some(c),
                None => self.reader.at_end(),
            };
            if at_close {
                if let Some(c) = header {
                    if obj.is_empty() {
                        interior = Some(c);
                    } else {
                        set_object_footer(&obj, c)?;
                    }
                }
                if closer.is_some() {
                    self.reader.read();
                }
                break;
            }
            if closer.is_some() && self.reader.at_end() {
                return Err(self.reader.syntax_error("unterminated object"));
            }
            let key = self.parse_key()?;
            self.reader.skip_line_whitespace();
            self.reader.expect(':')?;
            self.reader.skip_line_whitespace();
            let mut value_comment = None;
            if self.starts_comment() {
                value_comment = Some(self.read_comment_unit()?);
                self.reader.skip_line_whitespace();
            }
            let mut lines_between = None;
            if self.reader.current() == Some('\n') {
                self.reader.skip_whitespace();
                lines_between = Some(self.reader.lines_skipped() as u32);
            }
            let mut value = self.parse_value()?;
            value.metadata.lines_above = Some(lines_above);
            value.metadata.lines_between = lines_between;
            if let Some(c) = header {
                value.metadata.comments_mut().set(CommentPosition::Header, c);
            }
            if let Some(c) = value_comment {
                value.metadata.comments_mut().set(CommentPosition::Value, c);
            }
            if let Some(c) = self.take_eol()? {
                value.metadata.comments_mut().set(CommentPosition::Eol, c);
            }
            obj.push(key, Reference::new(value));
            self.reader.read_if(',');
        }
        let mut node = ValueNode::new(ValueKind::Object(obj));
        if let Some(c) = interior {
            node.metadata.comments_mut().set(CommentPosition::Interior, c);
        }
        Ok(node)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn set_array_footer(arr: &Array, comment: Comment) -> Result<()> {
    arr.get(arr.len() - 1)
        .expect("array non-empty")
        .mutate(|v| v.metadata.comments_mut().set(CommentPosition::Footer, comment))
}

fn set_object_footer(obj: &Object, comment: Comment) -> Result<()> {
    let (_, last) = obj.entry_at(obj.len() - 1).expect("object non-empty");
    last.mutate(|v| v.metadata.comments_mut().set(CommentPosition::Footer, comment))
}
