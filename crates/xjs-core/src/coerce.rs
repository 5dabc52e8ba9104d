//! Explicit coercions between value variants.
//!
//! These are never consulted by a parser or serializer; they exist only for callers
//! that ask for them directly (`into_number`, `into_string`, `into_object`,
//! `into_array`).

use crate::value::{Array, Object, Reference, StringStyle, ValueKind, ValueNode};

/// Coerce a value to a number for compatibility purposes: strings yield their length,
/// booleans yield 1/0, containers yield their size or the sum of their elements'
/// coercions.
pub fn into_number(node: &ValueNode) -> f64 {
    match &node.kind {
        ValueKind::Null => 0.0,
        ValueKind::Bool(b) => f64::from(u8::from(*b)),
        ValueKind::Integer(n) => *n as f64,
        ValueKind::Decimal(n) => *n,
        ValueKind::String(s, _) => s.chars().count() as f64,
        ValueKind::Array(arr) => arr.iter().map(|r| r.visiting(into_number)).sum(),
        ValueKind::Object(obj) => obj.iter().map(|(_, r)| r.visiting(into_number)).sum(),
    }
}

/// Coerce a value to its canonical textual form.
pub fn into_string(node: &ValueNode) -> String {
    match &node.kind {
        ValueKind::Null => "null".to_string(),
        ValueKind::Bool(b) => b.to_string(),
        ValueKind::Integer(n) => n.to_string(),
        ValueKind::Decimal(n) => crate::value::format_decimal(*n),
        ValueKind::String(s, _) => s.clone(),
        ValueKind::Array(arr) => {
            let parts: Vec<String> = arr.iter().map(|r| r.visiting(into_string)).collect();
            parts.join(",")
        }
        ValueKind::Object(obj) => {
            let parts: Vec<String> = obj
                .iter()
                .map(|(k, r)| format!("{k}={}", r.visiting(into_string)))
                .collect();
            parts.join(",")
        }
    }
}

/// Wrap a non-container value in a single-element object under the key `"value"`.
/// Containers are returned unchanged.
pub fn into_object(node: ValueNode) -> ValueNode {
    if node.kind.is_container() {
        return node;
    }
    let mut obj = Object::new();
    obj.push("value", Reference::new(node));
    ValueNode::new(ValueKind::Object(obj))
}

/// Wrap a non-container value in a single-element array. Containers are returned
/// unchanged.
pub fn into_array(node: ValueNode) -> ValueNode {
    if node.kind.is_container() {
        return node;
    }
    let mut arr = Array::new();
    arr.push(Reference::new(node));
    ValueNode::new(ValueKind::Array(arr))
}

/// Choose a string style for a value built programmatically without a source quote
/// style to preserve.
///
/// `Fast`: Single unless the content contains `'` or a newline, in which case Double
/// (a newline forces Multi instead, since neither single- nor double-quoted strings may
/// contain a literal line break).
pub fn fast_style(text: &str) -> StringStyle {
    if text.contains('\n') {
        StringStyle::Multi
    } else if text.contains('\'') {
        StringStyle::Double
    } else {
        StringStyle::Single
    }
}

/// `Select`: comprehensive. Prefer `Implicit` if the text survives a re-parse in value
/// context unchanged; otherwise fall back to [`fast_style`].
pub fn select_style(text: &str) -> StringStyle {
    if crate::scanner::is_round_trippable(text, crate::scanner::Context::Value) {
        StringStyle::Implicit
    } else {
        fast_style(text)
    }
}
