use anyhow::Result;
use clap::Parser;

use markdown_debug::lsp::server::serve;
use markdown_debug::{SettingsArgs, SettingsOverrides};

#[derive(Debug, Parser)]
#[command(name = "markdown-debug-ls")]
#[command(about = "Language server exposing the Markdown plugin debug commands")]
#[command(version)]
struct Args {
    #[command(flatten)]
    settings: SettingsArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // stdout carries the protocol, env_logger writes to stderr
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.settings.log_level.as_str()),
    )
    .init();

    serve(SettingsOverrides::from_args(&args.settings)).await
}
