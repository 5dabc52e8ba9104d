//! Balance-aware scanning of unquoted ("implicit") strings.
//!
//! An implicit string has no delimiter of its own; its extent is determined by the
//! surrounding grammar. [`scan_implicit`] walks a [`Reader`] forward, tracking bracket
//! depth and skipping quoted strings/comments wholesale, until it finds the terminator
//! appropriate to the given [`Context`]. Comments encountered along the way are consumed
//! as part of the raw span but trimmed back out of the returned text, since they belong
//! to the value's end-of-line comment rather than its content.

use crate::error::Result;
use crate::reader::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Key,
    Value,
}

/// Scan forward from the reader's current position for the extent of an implicit
/// string in the given context, trimming trailing whitespace and a trailing comment
/// from the result. Does not consume the terminating character itself.
pub fn scan_implicit(reader: &mut Reader, context: Context) -> Result<String> {
    let start = reader.index();
    reader.start_capture();
    let mut depth: i32 = 0;
    let mut trailing_comment_at: Option<usize> = None;

    loop {
        let before = reader.index();
        match reader.current() {
            None => break,
            Some('\\') => {
                reader.read();
                reader.read();
                trailing_comment_at = None;
            }
            Some(c @ ('\'' | '"')) if is_triple_quote(reader, c) => {
                reader.read();
                reader.read();
                reader.read();
                skip_triple(reader, c)?;
                trailing_comment_at = None;
            }
            Some(c @ ('\'' | '"')) => {
                reader.read();
                skip_quoted(reader, c)?;
                trailing_comment_at = None;
            }
            Some('/') if reader.remaining().starts_with("//") => {
                trailing_comment_at = Some(before);
                reader.read();
                reader.read();
                reader.skip_to_nl();
            }
            Some('#') => {
                trailing_comment_at = Some(before);
                reader.read();
                reader.skip_to_nl();
            }
            Some('/') if reader.remaining().starts_with("/*") => {
                trailing_comment_at = Some(before);
                reader.read();
                reader.read();
                reader.read_block_comment()?;
            }
            Some('{' | '[' | '(') => {
                depth += 1;
                reader.read();
                trailing_comment_at = None;
            }
            Some('}' | ']' | ')') if depth == 0 => break,
            Some('}' | ']' | ')') => {
                depth -= 1;
                reader.read();
                trailing_comment_at = None;
            }
            Some(':') if depth == 0 && context == Context::Key => break,
            Some(',') if depth == 0 && context == Context::Value => break,
            Some('\n') if depth == 0 && context == Context::Value => break,
            Some('\n') if depth == 0 && context == Context::Key => {
                return Err(reader.syntax_error("unexpected newline in implicit key"));
            }
            Some(c) if c.is_whitespace() => {
                reader.read();
            }
            Some(_) => {
                reader.read();
                trailing_comment_at = None;
            }
        }
    }

    let raw = reader.end_capture()?;
    let relative_end = trailing_comment_at.map_or(raw.len(), |abs| abs - start);
    Ok(raw[..relative_end].trim_end().to_string())
}

fn skip_quoted(reader: &mut Reader, quote: char) -> Result<()> {
    loop {
        match reader.read() {
            None => return Err(reader.syntax_error("unterminated string")),
            Some(c) if c == quote => return Ok(()),
            Some('\\') => {
                reader.read();
            }
            Some(_) => {}
        }
    }
}

fn is_triple_quote(reader: &Reader<'_>, c: char) -> bool {
    matches!(c, '\'' | '"') && {
        let triple: String = core::iter::repeat(c).take(3).collect();
        reader.remaining().starts_with(triple.as_str())
    }
}

fn skip_triple(reader: &mut Reader, quote: char) -> Result<()> {
    let terminator: String = core::iter::repeat(quote).take(3).collect();
    loop {
        if reader.remaining().starts_with(terminator.as_str()) {
            reader.read();
            reader.read();
            reader.read();
            return Ok(());
        }
        if reader.read().is_none() {
            return Err(reader.syntax_error("unterminated triple-quoted string"));
        }
    }
}

/// Escape `text` so it parses back identically as an implicit string in `context`:
/// backslash-escape any top-level (unbalanced) occurrence of the context's terminator.
pub fn escape(text: &str, context: Context) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth: i32 = 0;
    for c in text.chars() {
        match c {
            '{' | '[' | '(' => {
                depth += 1;
                out.push(c);
            }
            '}' | ']' | ')' => {
                depth -= 1;
                out.push(c);
            }
            ':' if depth <= 0 && context == Context::Key => {
                out.push('\\');
                out.push(c);
            }
            ',' if depth <= 0 && context == Context::Value => {
                out.push('\\');
                out.push(c);
            }
            '\n' if depth <= 0 && context == Context::Value => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Whether `text` can be emitted as an implicit string in `context` without any
/// escaping and without being mistaken for something else (e.g. all-whitespace).
pub fn is_round_trippable(text: &str, context: Context) -> bool {
    if text.is_empty() {
        return context == Context::Value;
    }
    if text.trim().is_empty() {
        return false;
    }
    escape(text, context) == text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str, context: Context) -> (String, String) {
        let mut r = Reader::new(input);
        let text = scan_implicit(&mut r, context).unwrap();
        (text, r.remaining().to_string())
    }

    #[test]
    fn value_stops_at_comma() {
        let (text, rest) = scan("hello, world", Context::Value);
        assert_eq!(text, "hello");
        assert_eq!(rest, ", world");
    }

    #[test]
    fn value_stops_at_newline() {
        let (text, rest) = scan("hello\nworld", Context::Value);
        assert_eq!(text, "hello");
        assert_eq!(rest, "\nworld");
    }

    #[test]
    fn key_stops_at_colon() {
        let (text, rest) = scan("my key: value", Context::Key);
        assert_eq!(text, "my key");
        assert_eq!(rest, ": value");
    }

    #[test]
    fn balanced_parens_are_not_terminators() {
        let (text, rest) = scan("complex ( nested ( body ) here ), next", Context::Value);
        assert_eq!(text, "complex ( nested ( body ) here )");
        assert_eq!(rest, ", next");
    }

    #[test]
    fn stops_at_unbalanced_closer() {
        let (text, rest) = scan("value)", Context::Value);
        assert_eq!(text, "value");
        assert_eq!(rest, ")");
    }

    #[test]
    fn trims_trailing_eol_comment() {
        let (text, rest) = scan("value // trailing\nnext", Context::Value);
        assert_eq!(text, "value");
        assert_eq!(rest, "\nnext");
    }

    #[test]
    fn skips_quoted_content() {
        let (text, rest) = scan(r#"say "hi, there", next"#, Context::Value);
        assert_eq!(text, r#"say "hi, there""#);
        assert_eq!(rest, ", next");
    }

    #[test]
    fn empty_value_is_round_trippable() {
        assert!(is_round_trippable("", Context::Value));
    }

    #[test]
    fn whitespace_only_value_is_not_round_trippable() {
        assert!(!is_round_trippable("   ", Context::Value));
    }

    #[test]
    fn escape_handles_unbalanced_colon_in_key() {
        assert_eq!(escape("a:b", Context::Key), "a\\:b");
        assert_eq!(escape("(a:b)", Context::Key), "(a:b)");
    }

    #[test]
    fn escape_handles_unbalanced_comma_in_value() {
        assert_eq!(escape("a,b", Context::Value), "a\\,b");
        assert_eq!(escape("[a,b]", Context::Value), "[a,b]");
    }
}
