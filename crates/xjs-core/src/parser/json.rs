//! Strict JSON and JSON-with-comments parsing.
//!
//! Both entry points live in one module because they share a grammar (double-quoted
//! keys, no trailing commas, no unquoted values) and differ only in whether `//`/`/* */`
//! trivia is collected and attached to the nearest value.

use crate::error::Result;
use crate::reader::Reader;
use crate::value::{
    Array, Comment, CommentPosition, CommentStyle, Object, Reference, StringStyle, ValueKind,
    ValueNode, integer_if_exact,
};

/// Parse strict ECMA-404 JSON. No comments, no trailing commas; keys must be
/// double-quoted.
pub fn parse_json(input: &str) -> Result<Reference> {
    Parser::new(input, false).parse_document()
}

/// Parse JSON plus `//` line and `/* */` block comments, attached to the nearest value
/// via the same position rules the XJS parser uses. Still rejects trailing commas and
/// unquoted keys/values.
pub fn parse_jsonc(input: &str) -> Result<Reference> {
    Parser::new(input, true).parse_document()
}

struct Parser<'a> {
    reader: Reader<'a>,
    comments: bool,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, comments: bool) -> Self {
        Self {
            reader: Reader::new(input),
            comments,
        }
    }

    fn parse_document(mut self) -> Result<Reference> {
        let (lines_above, header) = self.take_leading()?;
        let mut node = self.parse_value()?;
        if self.comments {
            node.metadata.lines_above = Some(lines_above);
        }
        if let Some(c) = header {
            node.metadata.comments_mut().set(CommentPosition::Header, c);
        }
        if let Some(c) = self.take_eol()? {
            node.metadata.comments_mut().set(CommentPosition::Eol, c);
        }
        let (_, footer) = self.take_leading()?;
        if let Some(c) = footer {
            node.metadata.comments_mut().set(CommentPosition::Footer, c);
        }
        if !self.reader.at_end() {
            return Err(self.reader.syntax_error("unexpected trailing content after document"));
        }
        Ok(Reference::new(node))
    }

    // -- trivia ---------------------------------------------------------

    fn starts_comment(&self) -> bool {
        self.comments
            && (self.reader.remaining().starts_with("//") || self.reader.remaining().starts_with("/*"))
    }

    fn read_comment_unit(&mut self) -> Result<Comment> {
        if self.reader.remaining().starts_with("//") {
            self.reader.read();
            self.reader.read();
            Ok(Comment::new(CommentStyle::Line, self.reader.read_line_comment()))
        } else {
            self.reader.read();
            self.reader.read();
            let text = self.reader.read_block_comment()?;
            Ok(Comment::new(CommentStyle::Block, text))
        }
    }

    /// Skip whitespace and comments, returning the blank-line count before the first
    /// comment-or-value and the last comment seen (comment slots hold one entry, so a
    /// run of stacked comments collapses to the one nearest the value, mirroring
    /// duplicate-key "last wins" elsewhere in this model).
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

    /// A comment on the same line as the value just parsed, if any.
    fn take_eol(&mut self) -> Result<Option<Comment>> {
        self.reader.skip_line_whitespace();
        if self.starts_comment() {
            Ok(Some(self.read_comment_unit()?))
        } else {
            Ok(None)
        }
    }

    // -- grammar ----------------------------------------------------------

    fn parse_value(&mut self) -> Result<ValueNode> {
        match self.reader.current() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => {
                self.reader.read();
                let text = self.reader.read_quoted('"')?;
                Ok(ValueNode::new(ValueKind::String(text, StringStyle::Double)))
            }
            Some('t') if self.reader.remaining().starts_with("true") => {
                self.advance_by(4);
                Ok(ValueNode::new(ValueKind::Bool(true)))
            }
            Some('f') if self.reader.remaining().starts_with("false") => {
                self.advance_by(5);
                Ok(ValueNode::new(ValueKind::Bool(false)))
            }
            Some('n') if self.reader.remaining().starts_with("null") => {
                self.advance_by(4);
                Ok(ValueNode::new(ValueKind::Null))
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) => Err(self.reader.syntax_error(format!("unexpected character '{c}'"))),
            None => Err(self.reader.syntax_error("unexpected end of input")),
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.reader.read();
        }
    }

    fn parse_number(&mut self) -> Result<ValueNode> {
        let start = self.reader.index();
        let n = self.reader.read_number()?;
        let text = self.reader.slice(start, self.reader.index());
        let is_integral = !text.contains(['.', 'e', 'E']);
        if is_integral {
            if let Some(i) = integer_if_exact(n) {
                return Ok(ValueNode::new(ValueKind::Integer(i)));
            }
        }
        Ok(ValueNode::new(ValueKind::Decimal(n)))
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.reader.current() {
            Some('"') => {
                self.reader.read();
                self.reader.read_quoted('"')
            }
            _ => Err(self.reader.syntax_error("expected a double-quoted key")),
        }
    }

    fn parse_array(&mut self) -> Result<ValueNode> {
        self.reader.expect('[')?;
        let mut arr = Array::new();
        let mut interior = None;
        let mut trailing_comma = false;
        loop {
            let (lines_above, header) = self.take_leading()?;
            match self.reader.current() {
                Some(']') => {
                    self.reader.read();
                    if let Some(c) = header {
                        if arr.is_empty() {
                            interior = Some(c);
                        } else if trailing_comma {
                            return Err(self.reader.syntax_error("trailing comma is not allowed"));
                        } else {
                            set_footer(arr.iter().last().expect("just checked non-empty"), c)?;
                        }
                    } else if trailing_comma {
                        return Err(self.reader.syntax_error("trailing comma is not allowed"));
                    }
                    break;
                }
                None => return Err(self.reader.syntax_error("unterminated array")),
                _ if !arr.is_empty() && !trailing_comma => {
                    return Err(self.reader.syntax_error("expected ',' or ']'"));
                }
                _ => {}
            }
            let mut value = self.parse_value()?;
            if self.comments {
                value.metadata.lines_above = Some(lines_above);
            }
            if let Some(c) = header {
                value.metadata.comments_mut().set(CommentPosition::Header, c);
            }
            if let Some(c) = self.take_eol()? {
                value.metadata.comments_mut().set(CommentPosition::Eol, c);
            }
            trailing_comma = self.reader.read_if(',');
            arr.push(Reference::new(value));
        }
        let mut node = ValueNode::new(ValueKind::Array(arr));
        if let Some(c) = interior {
            node.metadata.comments_mut().set(CommentPosition::Interior, c);
        }
        Ok(node)
    }

    fn parse_object(&mut self) -> Result<ValueNode> {
        self.reader.expect('{')?;
        let mut obj = Object::new();
        let mut interior = None;
        let mut trailing_comma = false;
        loop {
            let (lines_above, header) = self.take_leading()?;
            match self.reader.current() {
                Some('}') => {
                    self.reader.read();
                    if let Some(c) = header {
                        if obj.is_empty() {
                            interior = Some(c);
                        } else if trailing_comma {
                            return Err(self.reader.syntax_error("trailing comma is not allowed"));
                        } else {
                            let (_, last) = obj.entry_at(obj.len() - 1).expect("checked non-empty");
                            set_footer(last, c)?;
                        }
                    } else if trailing_comma {
                        return Err(self.reader.syntax_error("trailing comma is not allowed"));
                    }
                    break;
                }
                None => return Err(self.reader.syntax_error("unterminated object")),
                _ if !obj.is_empty() && !trailing_comma => {
                    return Err(self.reader.syntax_error("expected ',' or '}'"));
                }
                _ => {}
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
            if self.comments {
                value.metadata.lines_above = Some(lines_above);
                value.metadata.lines_between = lines_between;
            }
            if let Some(c) = header {
                value.metadata.comments_mut().set(CommentPosition::Header, c);
            }
            if let Some(c) = value_comment {
                value.metadata.comments_mut().set(CommentPosition::Value, c);
            }
            if let Some(c) = self.take_eol()? {
                value.metadata.comments_mut().set(CommentPosition::Eol, c);
            }
            trailing_comma = self.reader.read_if(',');
            obj.push(key, Reference::new(value));
        }
        let mut node = ValueNode::new(ValueKind::Object(obj));
        if let Some(c) = interior {
            node.metadata.comments_mut().set(CommentPosition::Interior, c);
        }
        Ok(node)
    }
}

fn set_footer(reference: &Reference, comment: Comment) -> Result<()> {
    reference.mutate(|v| v.metadata.comments_mut().set(CommentPosition::Footer, comment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integer(r: &Reference) -> i64 {
        r.visiting(|v| match v.kind {
            ValueKind::Integer(n) => n,
            _ => panic!("expected integer"),
        })
    }

    #[test]
    fn parses_flat_object() {
        let root = parse_json(r#"{"a":1,"b":[2,3]}"#).unwrap();
        root.visiting(|v| {
            let ValueKind::Object(obj) = &v.kind else {
                panic!("expected object")
            };
            assert_eq!(integer(obj.get("a").unwrap()), 1);
        });
    }

    #[test]
    fn rejects_trailing_comma() {
        assert!(parse_json(r#"{"a":1,}"#).is_err());
        assert!(parse_json(r#"[1,]"#).is_err());
    }

    #[test]
    fn rejects_unquoted_key() {
        assert!(parse_json("{a:1}").is_err());
    }

    #[test]
    fn rejects_comments_in_strict_mode() {
        assert!(parse_json("{\"a\":1} // trailing").is_err());
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let root = parse_json(r#"{"k":1,"k":2}"#).unwrap();
        root.visiting(|v| {
            let ValueKind::Object(obj) = &v.kind else {
                panic!("expected object")
            };
            assert_eq!(obj.index_of("k"), Some(1));
            assert_eq!(integer(obj.get("k").unwrap()), 2);
        });
    }

    #[test]
    fn zero_and_zero_point_zero_parse_to_different_variants() {
        let int_root = parse_json("0").unwrap();
        int_root.visiting(|v| assert!(matches!(v.kind, ValueKind::Integer(0))));
        let dec_root = parse_json("0.0").unwrap();
        dec_root.visiting(|v| assert!(matches!(v.kind, ValueKind::Decimal(n) if n == 0.0)));
    }

    #[test]
    fn jsonc_attaches_header_and_eol_comments() {
        let root = parse_jsonc("// Header\n{\"a\":1} // trailing\n").unwrap();
        root.visiting(|v| {
            let comments = v.metadata.comments.as_ref().unwrap();
            assert_eq!(comments.get(CommentPosition::Header).unwrap().text, " Header");
            assert_eq!(comments.get(CommentPosition::Eol).unwrap().text, " trailing");
        });
    }

    #[test]
    fn jsonc_still_rejects_trailing_comma() {
        assert!(parse_jsonc("{\"a\":1,} // nope").is_err());
    }

    #[test]
    fn interior_comment_on_empty_object() {
        let root = parse_jsonc("{ /* nothing here */ }").unwrap();
        root.visiting(|v| {
            let comments = v.metadata.comments.as_ref().unwrap();
            assert_eq!(
                comments.get(CommentPosition::Interior).unwrap().text,
                " nothing here "
            );
        });
    }
}
