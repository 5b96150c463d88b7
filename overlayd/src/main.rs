//! # Overlay Host Daemon
//!
//! Main entry point for the overlay host.

use clap::Parser;
use overlay_types::aggregate_diagnostics;
use overlayd::{
    Cli, Commands, EffectiveConfig, OverlayRuntime, RuntimeError, SessionRunner, SessionScript,
};
use services_overlay_fs::ProviderErrorKind;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit code for content that breaks the rules
const EXIT_FINDINGS: i32 = 1;
/// Exit code for every other failure
const EXIT_FAILURE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    };
    process::exit(code);
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
    }
    .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> Result<i32, RuntimeError> {
    match command {
        Commands::Read { path } => {
            let runtime = OverlayRuntime::new();
            let report = runtime.read(&path)?;
            if !report.is_clean() {
                eprintln!("{}", aggregate_diagnostics(&report.diagnostics));
            }
            print!("{}", report.output);
            Ok(0)
        }
        Commands::Write { path, input } => {
            let content = match input {
                Some(input) => read_file(&input)?,
                None => read_stdin()?,
            };
            let runtime = OverlayRuntime::new();
            match runtime.write(&path, &content) {
                Ok(()) => {
                    tracing::info!(target: "overlayd", path = %path.display(), "committed");
                    Ok(0)
                }
                Err(RuntimeError::Provider(err)) if err.kind() == ProviderErrorKind::NoPermissions => {
                    let message = runtime.last_error().unwrap_or_else(|| err.to_string());
                    eprintln!("{}", message.trim_end());
                    Ok(EXIT_FINDINGS)
                }
                Err(err) => Err(err),
            }
        }
        Commands::Check { path } => {
            let runtime = OverlayRuntime::new();
            let report = runtime.check(&path)?;
            if report.is_clean() {
                return Ok(0);
            }
            print!("{}", aggregate_diagnostics(&report.diagnostics));
            Ok(EXIT_FINDINGS)
        }
        Commands::Config => {
            println!("{}", EffectiveConfig::current().to_json()?);
            Ok(0)
        }
        Commands::Session { script: script_path } => {
            let script = SessionScript::from_text(&read_file(&script_path)?)?;
            let base_dir = script_path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let report = SessionRunner::new(base_dir).run(&script)?;
            println!("{}", report);
            Ok(0)
        }
    }
}

fn read_file(path: &Path) -> Result<String, RuntimeError> {
    fs::read_to_string(path).map_err(|e| RuntimeError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn read_stdin() -> Result<String, RuntimeError> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .map_err(|e| RuntimeError::Io {
            path: "<stdin>".to_string(),
            reason: e.to_string(),
        })?;
    Ok(content)
}
