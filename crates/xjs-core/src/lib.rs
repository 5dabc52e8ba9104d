pub mod coerce;
pub mod error;
pub mod options;
pub mod parser;
pub mod reader;
pub mod scanner;
pub mod serializer;
pub mod token;
pub mod value;

pub use error::{CoreError, Result};
pub use options::{JsonOptions, RawXjsOptions, XjsOptions};
pub use value::{
    Array, Comment, CommentPosition, CommentStyle, Object, Reference, StringStyle, ValueKind, ValueNode,
};

/// The three document syntaxes this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonFormat {
    /// Strict JSON: no comments, no trailing commas, no formatting metadata retained.
    Json,
    /// JSON with `//` and `/* */` comments, otherwise as strict as `Json`.
    Jsonc,
    /// The relaxed, format-preserving syntax: implicit strings, five comment positions,
    /// optional root braces, always-allowed trailing commas.
    Xjs,
}

/// Parse `content` under `format`'s grammar.
///
/// # Errors
///
/// Returns [`CoreError::Syntax`] on malformed input.
#[tracing::instrument(skip_all, fields(format = ?format, len = content.len()))]
pub fn parse_str(content: &str, format: JsonFormat) -> Result<Reference> {
    match format {
        JsonFormat::Json => parser::json::parse_json(content),
        JsonFormat::Jsonc => parser::json::parse_jsonc(content),
        JsonFormat::Xjs => parser::xjs::parse_xjs(content),
    }
}

/// Serialize `value` as strict (or `options.format`-pretty) JSON.
#[tracing::instrument(skip_all)]
pub fn serialize_json(value: &Reference, options: &JsonOptions) -> String {
    serializer::json::to_json_string(value, options)
}

/// Serialize `value` in the relaxed, format-preserving syntax.
#[tracing::instrument(skip_all)]
pub fn serialize_xjs(value: &Reference, options: &XjsOptions) -> String {
    serializer::xjs::to_xjs_string(value, options)
}

/// Map a file extension (without the leading dot) to the format that reads/writes it.
pub fn detect_format(ext: &str) -> Option<JsonFormat> {
    match ext {
        "json" => Some(JsonFormat::Json),
        "jsonc" => Some(JsonFormat::Jsonc),
        "xjs" => Some(JsonFormat::Xjs),
        _ => None,
    }
}

/// Walk `value`'s tree and collect the dotted/indexed paths of every reference whose
/// `accessed` flag is still unset.
///
/// Intended to run after a caller's own read pass (e.g. a config consumer pulling out the
/// keys it understands) so the remaining paths are the keys nobody looked at.
#[must_use]
pub fn unused_keys(value: &Reference) -> Vec<String> {
    let mut out = Vec::new();
    walk_unused(value, String::new(), &mut out);
    out
}

fn walk_unused(value: &Reference, path: String, out: &mut Vec<String>) {
    if !value.accessed() {
        out.push(path.clone());
    }
    value.visiting(|node| match &node.kind {
        ValueKind::Object(obj) => {
            for (key, child) in obj.iter() {
                let child_path = if path.is_empty() {
                    key.to_string()
                } else {
                    format!("{path}.{key}")
                };
                walk_unused(child, child_path, out);
            }
        }
        ValueKind::Array(arr) => {
            for (index, child) in arr.iter().enumerate() {
                walk_unused(child, format!("{path}[{index}]"), out);
            }
        }
        _ => {}
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_format_matches_extensions() {
        assert_eq!(detect_format("json"), Some(JsonFormat::Json));
        assert_eq!(detect_format("jsonc"), Some(JsonFormat::Jsonc));
        assert_eq!(detect_format("xjs"), Some(JsonFormat::Xjs));
        assert_eq!(detect_format("yaml"), None);
    }

    #[test]
    fn parse_str_dispatches_by_format() {
        let value = parse_str(r#"{"a": 1}"#, JsonFormat::Json).unwrap();
        assert_eq!(serialize_json(&value, &JsonOptions::default()), r#"{"a":1}"#);

        let value = parse_str("a: 1", JsonFormat::Xjs).unwrap();
        let rendered = serialize_xjs(&value, &XjsOptions::default());
        assert!(rendered.contains("a: 1"));
    }

    #[test]
    fn unused_keys_reports_untouched_paths() {
        let value = parse_str(r#"{"a": 1, "b": {"c": 2}}"#, JsonFormat::Json).unwrap();
        value.accessing(|node| {
            if let ValueKind::Object(obj) = &node.kind {
                obj.get("a").unwrap().accessing(|_| ());
            }
        });
        let mut unused = unused_keys(&value);
        unused.sort();
        assert_eq!(unused, vec!["b".to_string(), "b.c".to_string()]);
    }
}
