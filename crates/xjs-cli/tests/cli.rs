use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;
use xjs_cli::args::Cli;
use xjs_cli::{FileOutcome, run};

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn cli(args: &[&str]) -> Cli {
    xjs_cli::args::cli().run_inner(args).unwrap()
}

#[test]
fn unchanged_json_file_is_left_alone() {
    let file = write_temp(".json", r#"{"a":1}"#);
    let path = file.path().to_str().unwrap().to_string();
    let cli = cli(&[&path]);
    let results = run(&cli).unwrap();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].1, FileOutcome::Unchanged));
}

#[test]
fn write_mode_rewrites_file_in_place() {
    let file = write_temp(".json", "{ \"a\": 1, \"b\": [2, 3] }");
    let path = file.path().to_str().unwrap().to_string();
    let cli = cli(&["--write", &path]);
    let results = run(&cli).unwrap();
    assert!(matches!(results[0].1, FileOutcome::Rewritten));
}

#[test]
fn check_mode_flags_unformatted_json_without_writing() {
    let file = write_temp(".jsonc", "{ // note\n  \"a\": 1\n}");
    let path = file.path().to_str().unwrap().to_string();
    let original = fs::read_to_string(&path).unwrap();
    let cli = cli(&["--check", &path]);
    let results = run(&cli).unwrap();
    assert!(matches!(results[0].1, FileOutcome::CheckFailed));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn format_override_parses_content_regardless_of_extension() {
    let file = write_temp(".txt", "{ a: 1 }");
    let path = file.path().to_str().unwrap().to_string();
    let cli = cli(&["--format", "xjs", &path]);
    let results = run(&cli).unwrap();
    assert!(matches!(results[0].1, FileOutcome::Unchanged));
}

#[test]
fn unknown_extension_without_override_errors() {
    let file = write_temp(".txt", "a: 1\n");
    let path = file.path().to_str().unwrap().to_string();
    let cli = cli(&[&path]);
    assert!(run(&cli).is_err());
}
