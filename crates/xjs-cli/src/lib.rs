#![doc = include_str!("../README.md")]

pub mod args;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use xjs_core::{JsonFormat, JsonOptions, XjsOptions};

use crate::args::Cli;

/// Outcome of running the CLI over one file.
pub enum FileOutcome {
    /// Already in canonical form; nothing written.
    Unchanged,
    /// Written in place (or would have been, outside `--check`).
    Rewritten,
    /// `--check` found the file was not canonical.
    CheckFailed,
}

/// Resolve the format for `path`, preferring an explicit `--format` override over the file
/// extension.
///
/// # Errors
///
/// Returns an error if no override was given and the extension is not one of
/// `json`/`jsonc`/`xjs`.
pub fn resolve_format(path: &Path, override_format: Option<args::FormatArg>) -> Result<JsonFormat> {
    if let Some(format) = override_format {
        return Ok(format.into());
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    xjs_core::detect_format(ext)
        .with_context(|| format!("cannot detect format for {} (use --format)", path.display()))
}

/// Process a single file's content: parse under `format`, re-serialize with default
/// options (or `omit_root_braces` for XJS), and decide what changed.
///
/// # Errors
///
/// Returns an error if `content` fails to parse under `format`'s grammar.
pub fn process_content(content: &str, format: JsonFormat, omit_root_braces: bool) -> Result<String> {
    let value = xjs_core::parse_str(content, format)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("parse failed")?;
    let rendered = match format {
        JsonFormat::Json | JsonFormat::Jsonc => xjs_core::serialize_json(&value, &JsonOptions::default()),
        JsonFormat::Xjs => {
            let options = XjsOptions {
                omit_root_braces,
                ..XjsOptions::default()
            };
            xjs_core::serialize_xjs(&value, &options)
        }
    };
    Ok(rendered)
}

/// Run the CLI end to end: read each file, reformat it, and either print, write, or check
/// it depending on `cli`'s flags.
///
/// # Errors
///
/// Returns an error if any file cannot be read, parsed, or (in `--write` mode) written
/// back.
#[tracing::instrument(skip_all, fields(files = cli.files.len()))]
pub fn run(cli: &Cli) -> Result<Vec<(String, FileOutcome)>> {
    if cli.files.is_empty() {
        bail!("no input files given");
    }

    let mut results = Vec::with_capacity(cli.files.len());
    for file in &cli.files {
        let path = Path::new(file);
        let format = resolve_format(path, cli.format)?;
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {file}"))?;

        let rendered = process_content(&content, format, cli.omit_root_braces)
            .with_context(|| format!("failed to process {file}"))?;

        let outcome = if rendered == content {
            FileOutcome::Unchanged
        } else if cli.check {
            FileOutcome::CheckFailed
        } else if cli.write {
            fs::write(path, &rendered).with_context(|| format!("failed to write {file}"))?;
            FileOutcome::Rewritten
        } else {
            print!("{rendered}");
            FileOutcome::Rewritten
        };
        results.push((file.clone(), outcome));
    }
    Ok(results)
}
