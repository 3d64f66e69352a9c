//! Out-of-process session driver.
//!
//! The entry point the host's debugger starts. It rebuilds the renderer
//! from an explicit configuration, runs the session, and reports completion
//! by writing the two sentinel files the launcher watches for.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::configuration::{DebugConfiguration, parse_configuration};
use crate::host::NullHost;
use crate::preview::PreviewProvider;
use crate::renderer;
use crate::session::{self, SessionReport};

/// Command-line arguments of markdown-debug-driver
#[derive(Debug, Parser)]
#[command(name = "markdown-debug-driver")]
#[command(about = "Render a Markdown debug session and report the last HTML")]
#[command(version)]
pub struct DriverArgs {
    /// Debug configuration file (JSON, comments allowed)
    #[arg(long, required_unless_present = "configuration_json")]
    pub configuration: Option<PathBuf>,

    /// Debug configuration given inline
    #[arg(long, conflicts_with = "configuration")]
    pub configuration_json: Option<String>,

    /// Workspace root the configured paths are relative to
    #[arg(long)]
    pub root: PathBuf,

    /// Where to write the HTML of the last document
    #[arg(long)]
    pub html_output: PathBuf,

    /// Where to write the file name of the last document
    #[arg(long)]
    pub name_output: PathBuf,

    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

impl DriverArgs {
    async fn configuration(&self) -> Result<DebugConfiguration> {
        match (&self.configuration, &self.configuration_json) {
            (_, Some(json)) => Ok(parse_configuration(json, Path::new("<inline>"))?),
            (Some(path), None) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(parse_configuration(&text, path)?)
            }
            (None, None) => anyhow::bail!("no configuration given"),
        }
    }
}

/// Run one session and write the sentinels.
///
/// Sentinels are only written when the session has a last document and the
/// configuration asks for it to be shown.
pub async fn run(args: &DriverArgs) -> Result<SessionReport> {
    let configuration = args.configuration().await?;

    let handle =
        renderer::build(&configuration.markdown_options, &configuration.plugins, &args.root).await;
    for error in handle.errors() {
        eprintln!("{}", error);
    }

    let preview = PreviewProvider::new();
    let report = session::run(&handle, &configuration, &args.root, &preview, &NullHost)
        .await
        .context("Debug session failed")?;

    if configuration.session_options.show_last_html {
        if let (Some(html), Some(name)) = (report.last_html(), report.last_file_name()) {
            // name last: the watcher may fire as soon as both exist
            write_sentinel(&args.html_output, html).await?;
            write_sentinel(&args.name_output, &name).await?;
        }
    }

    Ok(report)
}

/// Write through a hidden temp file and rename, so readers never see a
/// partial file
async fn write_sentinel(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let staging = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    tokio::fs::write(&staging, content)
        .await
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    tokio::fs::rename(&staging, path)
        .await
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(root: &Path, configuration_json: &str) -> DriverArgs {
        DriverArgs {
            configuration: None,
            configuration_json: Some(configuration_json.to_string()),
            root: root.to_path_buf(),
            html_output: root.join("out.html"),
            name_output: root.join("out.txt"),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_arguments_require_a_configuration() {
        let err = DriverArgs::try_parse_from([
            "driver",
            "--root",
            "/w",
            "--html-output",
            "/t/a",
            "--name-output",
            "/t/b",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[tokio::test]
    async fn test_run_writes_sentinels() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.md"), "# A").unwrap();
        std::fs::write(root.path().join("b.md"), "*b*").unwrap();

        let args = args(
            root.path(),
            r#"{ "testDataSet": ["a.md", "b.md"], "sessionOptions": { "saveHtmlFiles": false } }"#,
        );
        let report = run(&args).await.unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(
            std::fs::read_to_string(&args.html_output).unwrap(),
            "<p><em>b</em></p>\n"
        );
        assert_eq!(std::fs::read_to_string(&args.name_output).unwrap(), "b.md");
        assert!(!root.path().join(".out.html.tmp").exists());
    }

    #[tokio::test]
    async fn test_empty_data_set_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let args = args(root.path(), "{}");

        run(&args).await.unwrap();
        assert!(!args.html_output.exists());
        assert!(!args.name_output.exists());
    }
}
