use bpaf::{Bpaf, ShellComp};

/// Parse/serialize JSON, JSONC, and XJS documents.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
pub struct Cli {
    /// Treat input as this format instead of detecting it from the file extension
    #[bpaf(long("format"), argument("json|jsonc|xjs"))]
    pub format: Option<FormatArg>,

    /// Check whether the file is already in canonical form; exit nonzero and print a
    /// diff-free notice instead of writing if not
    #[bpaf(long("check"), switch)]
    pub check: bool,

    /// Rewrite files in place instead of printing to stdout
    #[bpaf(long("write"), switch)]
    pub write: bool,

    /// Omit the outer braces of an XJS root object in output
    #[bpaf(long("omit-root-braces"), switch)]
    pub omit_root_braces: bool,

    #[bpaf(positional("FILE"), complete_shell(ShellComp::File { mask: None }))]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Jsonc,
    Xjs,
}

impl core::str::FromStr for FormatArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "jsonc" => Ok(Self::Jsonc),
            "xjs" => Ok(Self::Xjs),
            _ => Err(format!("expected 'json', 'jsonc', or 'xjs', got '{s}'")),
        }
    }
}

impl From<FormatArg> for xjs_core::JsonFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Jsonc => Self::Jsonc,
            FormatArg::Xjs => Self::Xjs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> bpaf::OptionParser<Cli> {
        cli()
    }

    #[test]
    fn defaults() {
        let parsed = opts().run_inner(&["a.json"]).unwrap();
        assert!(parsed.format.is_none());
        assert!(!parsed.check);
        assert!(!parsed.write);
        assert!(!parsed.omit_root_braces);
        assert_eq!(parsed.files, vec!["a.json".to_string()]);
    }

    #[test]
    fn format_override_parses() {
        let parsed = opts().run_inner(&["--format", "xjs", "a.txt"]).unwrap();
        assert_eq!(parsed.format, Some(FormatArg::Xjs));
    }

    #[test]
    fn format_override_rejects_unknown() {
        assert!(opts().run_inner(&["--format", "yaml", "a.txt"]).is_err());
    }

    #[test]
    fn check_and_write_flags() {
        let parsed = opts().run_inner(&["--check", "--write", "a.json"]).unwrap();
        assert!(parsed.check);
        assert!(parsed.write);
    }

    #[test]
    fn multiple_positional_files() {
        let parsed = opts().run_inner(&["a.json", "b.jsonc"]).unwrap();
        assert_eq!(parsed.files, vec!["a.json".to_string(), "b.jsonc".to_string()]);
    }
}
