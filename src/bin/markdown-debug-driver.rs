use std::process::ExitCode;

use clap::Parser;

use markdown_debug::driver::{self, DriverArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = DriverArgs::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.as_str()),
    )
    .init();

    match driver::run(&args).await {
        Ok(report) => {
            log::info!("Rendered {} documents", report.results.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("markdown-debug-driver: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
