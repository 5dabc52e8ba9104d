//! Strict JSON serialization.
//!
//! Compact by default; `JsonOptions::format` switches to indented output with
//! condensation of containers whose children all have `lines_above == 0`.

use core::fmt::Write as _;

use crate::options::JsonOptions;
use crate::value::{Array, Object, Reference, ValueKind, format_decimal};

pub fn to_json_string(value: &Reference, options: &JsonOptions) -> String {
    let mut out = String::new();
    write_value(&mut out, value, options, 0);
    out
}

fn write_value(out: &mut String, value: &Reference, options: &JsonOptions, depth: usize) {
    value.visiting(|node| match &node.kind {
        ValueKind::Null => out.push_str("null"),
        ValueKind::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        ValueKind::Integer(n) => {
            let _ = write!(out, "{n}");
        }
        ValueKind::Decimal(n) => out.push_str(&format_decimal(*n)),
        ValueKind::String(s, _) => write_json_string(out, s),
        ValueKind::Array(arr) => write_array(out, arr, options, depth),
        ValueKind::Object(obj) => write_object(out, obj, options, depth),
    });
}

/// `None` (metadata never tracked, as for strict-JSON parses) does not count as
/// "explicitly zero": only a parse that actually recorded `lines_above == 0` (JSONC,
/// XJS, or a builder that set it) earns single-line condensation.
fn lines_above_is_zero(r: &Reference) -> bool {
    r.visiting(|v| v.metadata.lines_above) == Some(0)
}

fn write_array(out: &mut String, arr: &Array, options: &JsonOptions, depth: usize) {
    if arr.is_empty() {
        out.push_str("[]");
        return;
    }
    let condensed = !options.format || arr.iter().all(lines_above_is_zero);
    write_container(out, '[', ']', arr.len(), options, depth, condensed, |out, i| {
        write_value(out, arr.get(i).expect("index in range"), options, depth + 1);
    });
}

fn write_object(out: &mut String, obj: &Object, options: &JsonOptions, depth: usize) {
    if obj.is_empty() {
        out.push_str("{}");
        return;
    }
    let condensed = !options.format || obj.iter().all(|(_, r)| lines_above_is_zero(r));
    let sep = member_separator(options);
    write_container(out, '{', '}', obj.len(), options, depth, condensed, |out, i| {
        let (key, value) = obj.entry_at(i).expect("index in range");
        write_json_string(out, key);
        out.push(':');
        out.push_str(sep);
        write_value(out, value, options, depth + 1);
    });
}

fn member_separator(options: &JsonOptions) -> &'static str {
    if options.format { " " } else { "" }
}

/// Shared rendering for `[...]`/`{...}`: compact single-line output when `!format` or
/// when every child was declared `condensed`, otherwise one member per line at `depth +
/// 1`.
fn write_container(
    out: &mut String,
    open: char,
    close: char,
    len: usize,
    options: &JsonOptions,
    depth: usize,
    condensed: bool,
    mut write_item: impl FnMut(&mut String, usize),
) {
    out.push(open);
    if !options.format {
        for i in 0..len {
            if i > 0 {
                out.push(',');
            }
            write_item(out, i);
        }
    } else if condensed {
        out.push(' ');
        for i in 0..len {
            if i > 0 {
                out.push_str(", ");
            }
            write_item(out, i);
        }
        out.push(' ');
    } else {
        let indent = options.indent.as_string().repeat(depth + 1);
        let outer_indent = options.indent.as_string().repeat(depth);
        for i in 0..len {
            out.push_str(options.eol.as_str());
            out.push_str(&indent);
            write_item(out, i);
            if i + 1 < len {
                out.push(',');
            }
        }
        out.push_str(options.eol.as_str());
        out.push_str(&outer_indent);
    }
    out.push(close);
}

fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::json::parse_json;

    #[test]
    fn compact_round_trip() {
        let value = parse_json(r#"{"a":1,"b":[2,3]}"#).unwrap();
        let options = JsonOptions::default();
        assert_eq!(to_json_string(&value, &options), r#"{"a":1,"b":[2,3]}"#);
    }

    #[test]
    fn formatted_output_breaks_nested_containers() {
        let value = parse_json(r#"{"a":1,"b":[2,3]}"#).unwrap();
        let options = JsonOptions {
            format: true,
            ..JsonOptions::default()
        };
        assert_eq!(
            to_json_string(&value, &options),
            "{\n  \"a\": 1,\n  \"b\": [\n    2,\n    3\n  ]\n}"
        );
    }

    #[test]
    fn empty_containers_stay_on_one_line() {
        let value = parse_json("{}").unwrap();
        let options = JsonOptions {
            format: true,
            ..JsonOptions::default()
        };
        assert_eq!(to_json_string(&value, &options), "{}");
    }

    #[test]
    fn escapes_control_characters() {
        let value = parse_json(r#""hello\nworld""#).unwrap();
        assert_eq!(to_json_string(&value, &JsonOptions::default()), r#""hello\nworld""#);
    }

    #[test]
    fn decimal_keeps_trailing_point() {
        let value = parse_json("0.0").unwrap();
        assert_eq!(to_json_string(&value, &JsonOptions::default()), "0.0");
        let value = parse_json("0").unwrap();
        assert_eq!(to_json_string(&value, &JsonOptions::default()), "0");
    }
}
