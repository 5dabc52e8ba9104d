use std::process::ExitCode;

use tracing_subscriber::prelude::*;
use xjs_cli::FileOutcome;

fn main() -> ExitCode {
    if let Ok(filter) = tracing_subscriber::EnvFilter::try_from_env("XJS_LOG") {
        tracing_subscriber::registry()
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true)
                    .with_indent_lines(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    }

    let cli = xjs_cli::args::cli().run();

    match xjs_cli::run(&cli) {
        Ok(results) => {
            let mut check_failed = false;
            for (file, outcome) in &results {
                match outcome {
                    FileOutcome::Unchanged => {}
                    FileOutcome::Rewritten => {
                        if cli.write {
                            eprintln!("formatted {file}");
                        }
                    }
                    FileOutcome::CheckFailed => {
                        eprintln!("not formatted: {file}");
                        check_failed = true;
                    }
                }
            }
            if check_failed {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
