use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use markdown_debug::commands::{self, CommandOutcome};
use markdown_debug::{ConsoleHost, SessionContext, SettingsArgs, SettingsOverrides};

#[derive(Debug, Parser)]
#[command(name = "markdown-debug")]
#[command(about = "Debug Markdown renderer plugins against a set of documents")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Launch the session through the driver and print the last HTML
    Start {
        /// Seconds to wait for the preview once the driver exited
        #[arg(long, default_value_t = 5)]
        wait: u64,
    },
    /// Render the configured documents in this process
    Run,
    /// Scan the workspace and write a default debug configuration
    Generate,
}

impl CliCommand {
    fn id(&self) -> &'static str {
        match self {
            CliCommand::Start { .. } => commands::COMMAND_START,
            CliCommand::Run => commands::COMMAND_START_WITHOUT_DEBUGGING,
            CliCommand::Generate => commands::COMMAND_GENERATE,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.settings.log_level.as_str()),
    )
    .init();

    let root = match &cli.settings.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };

    let context = SessionContext::new(SettingsOverrides::from_args(&cli.settings));
    let debugger = match context.settings(&root).await {
        Ok(settings) => settings.debugger.clone(),
        Err(e) => {
            log::error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let host = Arc::new(ConsoleHost::new(context.preview().clone(), debugger));

    let exit = run(&cli.command, &context, host, root).await;
    context.deactivate().await;
    Ok(exit)
}

async fn run(
    command: &CliCommand,
    context: &SessionContext,
    host: Arc<ConsoleHost>,
    root: PathBuf,
) -> ExitCode {
    // subscribed before launching so the watcher's update cannot be missed
    let mut changes = context.preview().subscribe();

    let executed =
        commands::execute(context, host.clone(), Some(root.as_path()), command.id()).await;
    let outcome = match executed {
        Ok(outcome) => outcome,
        Err(e) => {
            commands::report(host.as_ref(), &e).await;
            return ExitCode::FAILURE;
        }
    };

    match (command, outcome) {
        (CliCommand::Start { wait }, Some(CommandOutcome::Launched(report))) => {
            log::debug!("Session directory {}", report.temp_dir.display());

            let statuses = host.wait_for_launches().await;
            if let Some(status) = statuses.iter().find(|status| !status.success()) {
                log::error!("Debug session exited with {}", status);
                return ExitCode::FAILURE;
            }

            match tokio::time::timeout(Duration::from_secs(*wait), changes.recv()).await {
                Ok(Ok(_)) => log::info!("Preview updated"),
                Ok(Err(e)) => log::warn!("Preview unavailable: {}", e),
                Err(_) => log::info!("No preview after {}s", wait),
            }
            ExitCode::SUCCESS
        }
        (_, Some(CommandOutcome::Session(report))) if !report.plugin_errors.is_empty() => {
            log::warn!("{} plugins failed to load", report.plugin_errors.len());
            ExitCode::SUCCESS
        }
        _ => ExitCode::SUCCESS,
    }
}
