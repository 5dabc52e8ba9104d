//! Format-preserving XJS serialization.
//!
//! Unlike the strict JSON serializer, this one tries to reproduce the shape of the
//! original source: blank-line counts, comment placement, and string style (quoted vs
//! implicit) are all read back off each value's metadata rather than picked fresh, with
//! [`XjsOptions`] only filling in defaults for values that never recorded any (e.g. ones
//! built programmatically).

use core::fmt::Write as _;

use crate::coerce::{fast_style, select_style};
use crate::options::XjsOptions;
use crate::scanner::{self, Context};
use crate::value::{
    Array, Comment, CommentHolder, CommentPosition, CommentStyle, Flags, Object, Reference, StringStyle, ValueKind,
    format_decimal,
};

pub fn to_xjs_string(value: &Reference, options: &XjsOptions) -> String {
    let mut out = String::new();
    let (header, eol, footer) = value.visiting(|v| {
        let h = v.metadata.comments.as_ref();
        (
            h.and_then(|c| c.get(CommentPosition::Header)).cloned(),
            h.and_then(|c| c.get(CommentPosition::Eol)).cloned(),
            h.and_then(|c| c.get(CommentPosition::Footer)).cloned(),
        )
    });
    if options.output_comments {
        if let Some(c) = &header {
            write_comment(&mut out, c);
            out.push_str(options.eol.as_str());
        }
    }
    let root_braces_omitted = value.visiting(|v| v.metadata.flags.has_bit(Flags::ROOT_BRACES_OMITTED));
    let omit_braces =
        (options.omit_root_braces || root_braces_omitted) && value.visiting(|v| matches!(v.kind, ValueKind::Object(_)));
    if omit_braces {
        value.visiting(|v| {
            let ValueKind::Object(obj) = &v.kind else {
                unreachable!()
            };
            write_object_members(&mut out, obj, options, 0, true);
        });
    } else {
        write_value(&mut out, value, options, 0);
    }
    if options.output_comments {
        if let Some(c) = &eol {
            out.push(' ');
            write_comment(&mut out, c);
        }
        if let Some(c) = &footer {
            out.push_str(options.eol.as_str());
            write_comment(&mut out, c);
        }
    }
    out
}

fn write_comment(out: &mut String, comment: &Comment) {
    out.push_str(&comment.formatted());
}

/// Rewrite an end-of-line comment so it is safe to follow with more tokens on the same
/// physical line. A `#`/`//`/`///` comment runs to end of line, so if a delimiter or
/// closing bracket is about to come right after it, it is recast as the matching block
/// form (which already has an explicit terminator) rather than risk swallowing whatever
/// follows on reparse.
fn contextual_eol_comment(comment: &Comment, same_line_followup: bool) -> Comment {
    if !same_line_followup {
        return comment.clone();
    }
    match comment.style {
        CommentStyle::Line | CommentStyle::Hash => Comment::new(CommentStyle::Block, format!("{} ", comment.text)),
        CommentStyle::LineDoc => Comment::new(CommentStyle::BlockDoc, format!("{} ", comment.text)),
        CommentStyle::Block | CommentStyle::BlockDoc => comment.clone(),
    }
}

fn holder_get(holder: Option<&CommentHolder>, position: CommentPosition) -> Option<Comment> {
    holder.and_then(|h| h.get(position)).cloned()
}

fn write_value(out: &mut String, value: &Reference, options: &XjsOptions, depth: usize) {
    value.visiting(|node| match &node.kind {
        ValueKind::Null => out.push_str("null"),
        ValueKind::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        ValueKind::Integer(n) => {
            let _ = write!(out, "{n}");
        }
        ValueKind::Decimal(n) => out.push_str(&format_decimal(*n)),
        ValueKind::String(s, style) => write_string(out, s, *style, options, depth),
        ValueKind::Array(arr) => {
            let interior = holder_get(node.metadata.comments.as_ref(), CommentPosition::Interior);
            write_array(out, arr, options, depth, interior);
        }
        ValueKind::Object(obj) => {
            let interior = holder_get(node.metadata.comments.as_ref(), CommentPosition::Interior);
            write_object(out, obj, options, depth, interior);
        }
    });
}

/// Resolve the style to render a value's string content in, given the style recorded
/// at parse time (or `None` for a value built without one).
fn resolved_value_style(s: &str, style: StringStyle, options: &XjsOptions) -> StringStyle {
    match style {
        StringStyle::None => {
            let chosen = if options.omit_quotes { select_style(s) } else { fast_style(s) };
            if chosen == StringStyle::Implicit && !options.omit_quotes {
                StringStyle::Double
            } else {
                chosen
            }
        }
        StringStyle::Implicit if !options.omit_quotes || !scanner::is_round_trippable(s, Context::Value) => {
            StringStyle::Double
        }
        other => other,
    }
}

fn write_string(out: &mut String, s: &str, style: StringStyle, options: &XjsOptions, depth: usize) {
    match resolved_value_style(s, style, options) {
        StringStyle::Single => write_quoted(out, s, '\''),
        StringStyle::Multi => write_multi(out, s, options, depth),
        StringStyle::Implicit => out.push_str(&scanner::escape(s, Context::Value)),
        StringStyle::Double | StringStyle::None => write_quoted(out, s, '"'),
    }
}

fn write_quoted(out: &mut String, s: &str, quote: char) {
    out.push(quote);
    for ch in s.chars() {
        match ch {
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Render as a triple-quoted block, re-indented to `depth` the way
/// [`crate::reader::Reader::read_multi`] would dedent it back out on reparse.
fn write_multi(out: &mut String, s: &str, options: &XjsOptions, depth: usize) {
    let indent = options.indent.as_string().repeat(depth);
    out.push_str("\"\"\"");
    out.push_str(options.eol.as_str());
    for line in s.split('\n') {
        out.push_str(&indent);
        out.push_str(line);
        out.push_str(options.eol.as_str());
    }
    out.push_str(&indent);
    out.push_str("\"\"\"");
}

fn resolved_key_style(key: &str, options: &XjsOptions) -> StringStyle {
    if options.omit_quotes && scanner::is_round_trippable(key, Context::Key) {
        StringStyle::Implicit
    } else {
        StringStyle::Double
    }
}

fn write_key(out: &mut String, key: &str, options: &XjsOptions) {
    match resolved_key_style(key, options) {
        StringStyle::Implicit => out.push_str(&scanner::escape(key, Context::Key)),
        _ => write_quoted(out, key, '"'),
    }
}

/// Total newline count to emit before a container member: at least one (a member always
/// starts its own line in expanded output), more if `lines_above` recorded blank lines,
/// clamped to the configured floor/ceiling. `smart_spacing` adds one more around nested
/// containers.
fn spacing_newlines(lines_above: Option<u32>, is_container: bool, options: &XjsOptions) -> usize {
    let mut n = lines_above.unwrap_or(options.default_spacing).max(1);
    if is_container && options.smart_spacing {
        n += 1;
    }
    n.clamp(options.min_spacing.max(1), options.max_spacing.max(1)) as usize
}

fn is_void_string(r: &Reference) -> bool {
    r.visiting(|v| matches!(&v.kind, ValueKind::String(s, StringStyle::Implicit) if s.is_empty()))
}

fn all_condensed(lines_aboves: impl Iterator<Item = Option<u32>>, options: &XjsOptions) -> bool {
    options.allow_condense && lines_aboves.into_iter().all(|n| n == Some(0))
}

fn write_array(out: &mut String, arr: &Array, options: &XjsOptions, depth: usize, interior: Option<Comment>) {
    if arr.is_empty() {
        out.push('[');
        if options.output_comments {
            if let Some(c) = &interior {
                out.push(' ');
                write_comment(out, c);
                out.push(' ');
            }
        }
        out.push(']');
        return;
    }
    let condensed = all_condensed(arr.iter().map(|r| r.visiting(|v| v.metadata.lines_above)), options);
    out.push('[');
    if condensed {
        out.push(' ');
    }
    let indent = options.indent.as_string().repeat(depth + 1);
    let outer_indent = options.indent.as_string().repeat(depth);
    let len = arr.len();
    for (i, item) in arr.iter().enumerate() {
        let is_last = i + 1 == len;
        let (lines_above, is_container, header) = item.visiting(|v| {
            (
                v.metadata.lines_above,
                v.kind.is_container(),
                holder_get(v.metadata.comments.as_ref(), CommentPosition::Header),
            )
        });
        if condensed {
            if i > 0 {
                out.push_str(", ");
            }
        } else {
            for _ in 0..spacing_newlines(lines_above, is_container, options) {
                out.push_str(options.eol.as_str());
            }
            out.push_str(&indent);
        }
        if options.output_comments {
            if let Some(c) = &header {
                write_comment(out, c);
                out.push_str(options.eol.as_str());
                out.push_str(&indent);
            }
        }
        write_value(out, item, options, depth + 1);
        if options.output_comments {
            let eol = item.visiting(|v| holder_get(v.metadata.comments.as_ref(), CommentPosition::Eol));
            if let Some(c) = &eol {
                out.push(' ');
                write_comment(out, &contextual_eol_comment(c, true));
            }
        }
        if condensed {
            if is_last && is_void_string(item) {
                out.push(',');
            }
        } else {
            out.push(',');
        }
        if options.output_comments && is_last {
            let footer = item.visiting(|v| holder_get(v.metadata.comments.as_ref(), CommentPosition::Footer));
            if let Some(c) = &footer {
                for _ in 0..spacing_newlines(Some(1), false, options) {
                    out.push_str(options.eol.as_str());
                }
                out.push_str(&indent);
                write_comment(out, c);
            }
        }
    }
    if condensed {
        out.push(' ');
    } else {
        out.push_str(options.eol.as_str());
        out.push_str(&outer_indent);
    }
    out.push(']');
}

/// `suppress_first_newline` drops the newline that would otherwise precede the first
/// member: set for a root document with its braces omitted, where there is no opening
/// `{` line to break away from (§4.6 decision 1 — no forced newline above the first
/// top-level value). A member nested inside an actual `{` still needs to start its own
/// line, so callers writing from inside [`write_object`] pass `false`.
fn write_object_members(
    out: &mut String,
    obj: &Object,
    options: &XjsOptions,
    depth: usize,
    suppress_first_newline: bool,
) {
    let indent = options.indent.as_string().repeat(depth);
    let len = obj.len();
    for (i, (key, value)) in obj.iter().enumerate() {
        let is_last = i + 1 == len;
        let (lines_above, is_container, header, value_comment) = value.visiting(|v| {
            (
                v.metadata.lines_above,
                v.kind.is_container(),
                holder_get(v.metadata.comments.as_ref(), CommentPosition::Header),
                holder_get(v.metadata.comments.as_ref(), CommentPosition::Value),
            )
        });
        if i > 0 || !suppress_first_newline {
            for _ in 0..spacing_newlines(lines_above, is_container, options) {
                out.push_str(options.eol.as_str());
            }
        }
        out.push_str(&indent);
        if options.output_comments {
            if let Some(c) = &header {
                write_comment(out, c);
                out.push_str(options.eol.as_str());
                out.push_str(&indent);
            }
        }
        write_key(out, key, options);
        out.push(':');
        out.push_str(options.separator.as_str());
        if options.output_comments {
            if let Some(c) = &value_comment {
                write_comment(out, c);
                out.push(' ');
            }
        }
        let is_multi = value.visiting(|v| matches!(&v.kind, ValueKind::String(_, StringStyle::Multi)));
        let value_depth = if options.next_line_multi && is_multi {
            out.push_str(options.eol.as_str());
            out.push_str(&options.indent.as_string().repeat(depth + 1));
            depth + 1
        } else {
            depth
        };
        // A comma is only needed when the next member starts on the same line; a real
        // newline already separates members unambiguously, and the parser never records
        // whether a now-redundant comma was present in that case, so the canonical
        // rendering drops it.
        let needs_comma = !is_last
            && obj
                .entry_at(i + 1)
                .is_some_and(|(_, next)| next.visiting(|v| v.metadata.lines_above) == Some(0));
        write_value(out, value, options, value_depth);
        if options.output_comments {
            let eol = value.visiting(|v| holder_get(v.metadata.comments.as_ref(), CommentPosition::Eol));
            if let Some(c) = &eol {
                out.push(' ');
                write_comment(out, &contextual_eol_comment(c, needs_comma));
            }
        }
        if needs_comma {
            out.push(',');
        }
        if options.output_comments && is_last {
            let footer = value.visiting(|v| holder_get(v.metadata.comments.as_ref(), CommentPosition::Footer));
            if let Some(c) = &footer {
                for _ in 0..spacing_newlines(Some(1), false, options) {
                    out.push_str(options.eol.as_str());
                }
                out.push_str(&indent);
                write_comment(out, c);
            }
        }
    }
}

/// Condensed sibling of [`write_object_members`]: one line, `, `-separated, no Footer
/// (a footer comment implies the last member needs its own line, so it simply doesn't
/// apply once the container has collapsed onto one).
fn write_object_members_condensed(out: &mut String, obj: &Object, options: &XjsOptions, depth: usize) {
    out.push(' ');
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let (header, value_comment, eol) = value.visiting(|v| {
            (
                holder_get(v.metadata.comments.as_ref(), CommentPosition::Header),
                holder_get(v.metadata.comments.as_ref(), CommentPosition::Value),
                holder_get(v.metadata.comments.as_ref(), CommentPosition::Eol),
            )
        });
        if options.output_comments {
            if let Some(c) = &header {
                write_comment(out, c);
                out.push(' ');
            }
        }
        write_key(out, key, options);
        out.push(':');
        out.push_str(options.separator.as_str());
        if options.output_comments {
            if let Some(c) = &value_comment {
                write_comment(out, c);
                out.push(' ');
            }
        }
        write_value(out, value, options, depth + 1);
        if options.output_comments {
            if let Some(c) = &eol {
                out.push(' ');
                write_comment(out, &contextual_eol_comment(c, true));
            }
        }
    }
    out.push(' ');
}

fn write_object(out: &mut String, obj: &Object, options: &XjsOptions, depth: usize, interior: Option<Comment>) {
    if obj.is_empty() {
        out.push('{');
        if options.output_comments {
            if let Some(c) = &interior {
                out.push(' ');
                write_comment(out, c);
                out.push(' ');
            }
        }
        out.push('}');
        return;
    }
    let condensed = all_condensed(obj.iter().map(|(_, v)| v.visiting(|m| m.metadata.lines_above)), options);
    out.push('{');
    if condensed {
        write_object_members_condensed(out, obj, options, depth + 1);
    } else {
        write_object_members(out, obj, options, depth + 1, false);
        out.push_str(options.eol.as_str());
        out.push_str(&options.indent.as_string().repeat(depth));
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xjs::parse_xjs;

    #[test]
    fn round_trips_object_with_comment() {
        let root = parse_xjs("{\n  // note\n  a: 1\n}").unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert_eq!(rendered, "{\n  // note\n  a: 1\n}");
    }

    #[test]
    fn root_brace_omission_is_honored_when_requested() {
        let root = parse_xjs("{\n  a: 1\n  b: 2\n}").unwrap();
        let options = XjsOptions {
            omit_root_braces: true,
            ..XjsOptions::default()
        };
        let rendered = to_xjs_string(&root, &options);
        assert_eq!(rendered, "a: 1\nb: 2");
    }

    #[test]
    fn root_brace_omission_is_preserved_by_default() {
        let input = "a: 1\nb: 2";
        let root = parse_xjs(input).unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert_eq!(rendered, input);
    }

    #[test]
    fn implicit_values_stay_unquoted_by_default() {
        let root = parse_xjs("name: hello world\n").unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert!(rendered.contains("name: hello world"));
    }

    #[test]
    fn omit_quotes_false_forces_quoted_output() {
        let root = parse_xjs("name: hello\n").unwrap();
        let options = XjsOptions {
            omit_quotes: false,
            ..XjsOptions::default()
        };
        let rendered = to_xjs_string(&root, &options);
        assert!(rendered.contains(": \"hello\""));
    }

    #[test]
    fn condensed_array_keeps_single_line() {
        let root = parse_xjs("[1, 2, 3]").unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert_eq!(rendered, "[ 1, 2, 3 ]");
    }

    #[test]
    fn void_trailing_element_gets_extra_comma() {
        let root = parse_xjs("[1, 2, ,]").unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert_eq!(rendered, "[ 1, 2, , ]");
    }

    #[test]
    fn condensed_object_keeps_single_line() {
        let root = parse_xjs("{ a: 1, b: 2 }").unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert_eq!(rendered, "{ a: 1, b: 2 }");
    }

    #[test]
    fn nested_object_value_indents_one_level_deeper_than_its_key() {
        let input = "{\n  a: 1\n  b: {\n    c: 2\n  }\n}";
        let root = parse_xjs(input).unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert_eq!(rendered, input);
    }

    #[test]
    fn nested_container_breaks_out_of_condensed_parent() {
        let root = parse_xjs("{ a: 1\n  b: [2, 3] }").unwrap();
        let rendered = to_xjs_string(&root, &XjsOptions::default());
        assert!(!rendered.starts_with("{ a"));
    }
}
