//! The options surface callers use to control serialization.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options shared by both the strict JSON and XJS serializers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct JsonOptions {
    /// Pretty-print with `indent` and newlines instead of the most compact form.
    pub format: bool,
    /// Indent string used per nesting level when `format` is set.
    pub indent: IndentStyle,
    /// Newline sequence to emit.
    pub eol: Eol,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            format: false,
            indent: IndentStyle::Spaces(2),
            eol: Eol::Lf,
        }
    }
}

/// Options controlling the format-preserving XJS serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct XjsOptions {
    /// Indent string per nesting level.
    pub indent: IndentStyle,
    /// Newline sequence to emit.
    pub eol: Eol,
    /// String placed between a key and its value, and before an end-of-line comment.
    pub separator: SeparatorStyle,
    /// Collapse a container onto one line when every child has `lines_above == 0`.
    pub allow_condense: bool,
    /// Emit a container's `{`/`[` on the same line as its key instead of the next line.
    pub braces_same_line: bool,
    /// Omit the outermost `{}` of a root object.
    pub omit_root_braces: bool,
    /// Emit stored comments. When `false`, every comment slot is dropped on output.
    pub output_comments: bool,
    /// Prefer an unquoted (implicit) string over a quoted one wherever the content
    /// allows it.
    pub omit_quotes: bool,
    /// Floor on `lines_above` between container members.
    pub min_spacing: u32,
    /// Ceiling on `lines_above` between container members.
    pub max_spacing: u32,
    /// Value substituted for `lines_above` when a value does not specify one.
    pub default_spacing: u32,
    /// Add an extra blank line around nested containers inside objects.
    pub smart_spacing: bool,
    /// Start a triple-quoted string on a new line after `:` rather than inline.
    pub next_line_multi: bool,
}

impl Default for XjsOptions {
    fn default() -> Self {
        Self {
            indent: IndentStyle::Spaces(2),
            eol: Eol::Lf,
            separator: SeparatorStyle::Space,
            allow_condense: true,
            braces_same_line: true,
            omit_root_braces: false,
            output_comments: true,
            omit_quotes: true,
            min_spacing: 0,
            max_spacing: 2,
            default_spacing: 0,
            smart_spacing: false,
            next_line_multi: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndentStyle {
    Spaces(u8),
    Tabs,
}

impl IndentStyle {
    pub fn as_string(self) -> String {
        match self {
            Self::Spaces(n) => " ".repeat(n as usize),
            Self::Tabs => "\t".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Eol {
    #[default]
    Lf,
    Crlf,
    Cr,
}

impl Eol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SeparatorStyle {
    #[default]
    Space,
    None,
}

impl SeparatorStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Space => " ",
            Self::None => "",
        }
    }
}

/// A partial override of [`XjsOptions`], every field optional, for layering config-file
/// values on top of defaults without this crate doing any file I/O itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RawXjsOptions {
    pub indent: Option<IndentStyle>,
    pub eol: Option<Eol>,
    pub separator: Option<SeparatorStyle>,
    pub allow_condense: Option<bool>,
    pub braces_same_line: Option<bool>,
    pub omit_root_braces: Option<bool>,
    pub output_comments: Option<bool>,
    pub omit_quotes: Option<bool>,
    pub min_spacing: Option<u32>,
    pub max_spacing: Option<u32>,
    pub default_spacing: Option<u32>,
    pub smart_spacing: Option<bool>,
    pub next_line_multi: Option<bool>,
}

impl RawXjsOptions {
    /// Merge set fields onto `options`, leaving unset fields untouched.
    pub fn apply_to(&self, options: &mut XjsOptions) {
        macro_rules! apply {
            ($field:ident) => {
                if let Some(value) = self.$field {
                    options.$field = value;
                }
            };
        }
        apply!(indent);
        apply!(eol);
        apply!(separator);
        apply!(allow_condense);
        apply!(braces_same_line);
        apply!(omit_root_braces);
        apply!(output_comments);
        apply!(omit_quotes);
        apply!(min_spacing);
        apply!(max_spacing);
        apply!(default_spacing);
        apply!(smart_spacing);
        apply!(next_line_multi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_style_renders_spaces_and_tabs() {
        assert_eq!(IndentStyle::Spaces(2).as_string(), "  ");
        assert_eq!(IndentStyle::Tabs.as_string(), "\t");
    }

    #[test]
    fn raw_options_apply_only_set_fields() {
        let mut opts = XjsOptions::default();
        let raw = RawXjsOptions {
            max_spacing: Some(10),
            ..RawXjsOptions::default()
        };
        raw.apply_to(&mut opts);
        assert_eq!(opts.max_spacing, 10);
        assert_eq!(opts.min_spacing, 0);
        assert!(opts.allow_condense);
    }

    #[test]
    fn json_options_default_is_compact() {
        assert!(!JsonOptions::default().format);
    }
}
