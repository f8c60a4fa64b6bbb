// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maestro - a multi-tool agent orchestrator.
//!
//! This is the binary entry point: it loads configuration, sets up logging
//! for the session, and hands the prompt to the orchestrator.

mod logging;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use maestro_agent::{new_session_id, OrchestrationReport, Orchestrator};
use maestro_anthropic::AnthropicProvider;
use maestro_config::{ConfigError, MaestroConfig};
use maestro_core::MaestroError;
use tracing::{error, info};

/// Maestro - route a request to editor, bash, diagram, and database tools.
#[derive(Parser, Debug)]
#[command(name = "maestro", version, about, long_about = None)]
struct Cli {
    /// The request to carry out.
    prompt: Option<String>,

    /// Configuration file to use instead of the standard locations.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Continue an existing session (appends to its log).
    #[arg(long)]
    session: Option<String>,

    /// Log shell commands instead of executing them.
    #[arg(long)]
    no_agi: bool,

    /// Abort the whole request after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn load_config(cli: &Cli) -> Result<MaestroConfig, Vec<ConfigError>> {
    let mut config = match &cli.config {
        Some(path) => maestro_config::load_and_validate_path(path)?,
        None => maestro_config::load_and_validate()?,
    };
    config.bash.no_agi |= cli.no_agi;
    Ok(config)
}

fn create_directories(config: &MaestroConfig) -> std::io::Result<()> {
    for dir in [
        &config.logging.log_dir,
        &config.editor.base_dir,
        &config.mermaid.output_dir,
    ] {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

async fn run(
    config: MaestroConfig,
    session_id: String,
    prompt: &str,
) -> Result<OrchestrationReport, MaestroError> {
    let provider = Arc::new(AnthropicProvider::new(&config.anthropic)?);
    let mut orchestrator = Orchestrator::new(&config, provider, session_id).await?;
    let report = orchestrator.process_request(prompt).await;
    orchestrator.shutdown().await?;
    report
}

fn print_report(report: &OrchestrationReport) {
    for step in &report.steps {
        let status = if step.result.is_error {
            "error"
        } else if step.result.complete {
            "complete"
        } else {
            "stopped"
        };
        println!("[{}] {status}", step.tool);
        if let Some(content) = &step.result.content {
            println!("{content}");
        }
    }
    println!(
        "Tokens: {} input, {} output",
        report.usage.input_tokens, report.usage.output_tokens
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            maestro_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    let Some(prompt) = cli.prompt.as_deref().filter(|p| !p.trim().is_empty()) else {
        eprintln!("Error: a prompt is required (see --help)");
        return ExitCode::FAILURE;
    };

    if let Err(e) = create_directories(&config) {
        eprintln!("Error: failed to create working directories: {e}");
        return ExitCode::FAILURE;
    }

    let session_id = cli.session.clone().unwrap_or_else(new_session_id);
    let log_dir = Path::new(&config.logging.log_dir);
    if let Err(e) = logging::init_tracing(&config.logging.level, log_dir, &session_id) {
        eprintln!("Error: failed to open session log: {e}");
        return ExitCode::FAILURE;
    }
    println!("Session ID: {session_id}");
    info!(session_id = %session_id, no_agi = config.bash.no_agi, "session started");

    let outcome = match cli.timeout_secs {
        Some(secs) => {
            let duration = Duration::from_secs(secs);
            tokio::time::timeout(duration, run(config, session_id, prompt))
                .await
                .unwrap_or(Err(MaestroError::Timeout { duration }))
        }
        None => run(config, session_id, prompt).await,
    };

    match outcome {
        Ok(report) => {
            print_report(&report);
            if report.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "request failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
