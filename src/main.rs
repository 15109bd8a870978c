//! depmatrix - update matrix builder for multi-package npm projects
//!
//! Scans the workspace root, `packages/*` and any extra directories, groups
//! outdated dependencies by scope and target version, and prints the matrix
//! as `{"include": [...]}`.

use clap::Parser;
use depmatrix::cli::CliArgs;
use depmatrix::config::Settings;
use depmatrix::orchestrator::Orchestrator;
use depmatrix::output::{create_formatter, write_github_output, Verbosity};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(Verbosity::from_flags(args.verbose, args.quiet));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `-v`/`-q`
fn init_tracing(verbosity: Verbosity) {
    let default_level = match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("depmatrix={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<()> {
    let settings = Settings::resolve(&args)?;
    tracing::debug!(?settings, "resolved settings");

    let orchestrator = Orchestrator::new(settings)?;
    let result = orchestrator.run().await?;
    let settings = orchestrator.settings();

    let output_config = settings.output.with_color(io::stdout().is_terminal());
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if let Some(path) = &settings.github_output {
        let json = result.matrix.to_json(false)?;
        write_github_output(path, &json)?;
        tracing::info!(path = %path.display(), groups = result.matrix.len(), "wrote matrix output");
    }

    Ok(())
}
