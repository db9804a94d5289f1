// crates/humanity-cli/src/main.rs
// ============================================================================
// Module: Humanity MCP CLI Entry Point
// Description: Serve entry point for the advisory action line protocol.
// Purpose: Load configuration, announce readiness, and serve stdio.
// Dependencies: clap, humanity-config, humanity-contract, humanity-mcp, serde_json,
//               thiserror, tokio
// ============================================================================

//! ## Overview
//! `humanity-mcp` loads `humanity-mcp.toml` (or the file named by `--config`
//! or `HUMANITY_MCP_CONFIG`), applies command-line overrides, prints the
//! startup banner on stderr, and serves line-delimited JSON on
//! stdin/stdout until end of input or SIGINT/SIGTERM. Both end states exit
//! with success; configuration and startup failures exit with failure.
//!
//! `--export-contracts PATH` writes the action contract table as JSON for
//! offline tooling instead of serving.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Parser;
use humanity_config::ServiceConfig;
use humanity_contract::ContractRegistry;
use humanity_mcp::McpServer;
use humanity_mcp::banner;
use humanity_mcp::server::VERSION;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definitions
// ============================================================================

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "humanity-mcp", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Configuration file path (overrides `HUMANITY_MCP_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory that registry schema paths resolve against.
    #[arg(long, value_name = "DIR")]
    schema_root: Option<PathBuf>,
    /// Maximum request line size in bytes.
    #[arg(long, value_name = "BYTES")]
    max_line_bytes: Option<usize>,
    /// Write the action contract table as JSON to PATH and exit.
    #[arg(long, value_name = "PATH")]
    export_contracts: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration and serves stdio.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        write_stdout_line(&format!("humanity-mcp {VERSION}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(path) = &cli.export_contracts {
        return export_contracts(path);
    }

    let config = ServiceConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let config = apply_overrides(config, &cli)?;
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;

    write_stderr_line(&banner(server.registry().len()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server
        .serve_stdio(shutdown_signal())
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes the contract table as pretty-printed JSON.
fn export_contracts(path: &Path) -> CliResult<ExitCode> {
    let registry = ContractRegistry::builtin()
        .map_err(|err| CliError::new(format!("contract registry invalid: {err}")))?;
    let mut rendered = serde_json::to_string_pretty(registry.all())
        .map_err(|err| CliError::new(format!("failed to encode contracts: {err}")))?;
    rendered.push('\n');
    fs::write(path, rendered)
        .map_err(|err| CliError::new(format!("failed to write {}: {err}", path.display())))?;
    write_stderr_line(&format!("Wrote {} contracts to {}", registry.len(), path.display()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Applies command-line overrides and revalidates the configuration.
fn apply_overrides(mut config: ServiceConfig, cli: &Cli) -> CliResult<ServiceConfig> {
    if let Some(root) = &cli.schema_root {
        config.schemas.root = Some(root.to_string_lossy().into_owned());
    }
    if let Some(max_line_bytes) = cli.max_line_bytes {
        config.server.max_line_bytes = max_line_bytes;
    }
    config.validate().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    Ok(config)
}

// ============================================================================
// SECTION: Shutdown
// ============================================================================

/// Resolves on SIGINT or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::SignalKind;
    use tokio::signal::unix::signal;

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                () = ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(_) => ctrl_c().await,
    }
}

/// Resolves on ctrl-c.
#[cfg(not(unix))]
async fn shutdown_signal() {
    ctrl_c().await;
}

/// Resolves on ctrl-c; never resolves when the handler cannot be installed.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
