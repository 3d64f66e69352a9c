//! Session Runner
//!
//! One pass of the render loop over the configured sample documents.

use std::path::{Path, PathBuf};

use crate::configuration::DebugConfiguration;
use crate::error::{DebugError, PluginLoadError, Result};
use crate::host::EditorHost;
use crate::preview::{PreviewProvider, preview_uri};
use crate::renderer::RendererHandle;

/// Byte-order mark prefixed to saved HTML files
pub const UTF8_BOM: &str = "\u{feff}";

/// One rendered document
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub source_document: PathBuf,
    /// Sibling `.html` file, when saving is enabled
    pub output_path: Option<PathBuf>,
    pub html_content: String,
}

/// What a session produced
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub results: Vec<RenderResult>,
    /// Document whose HTML is the preview artifact
    pub last_document: Option<PathBuf>,
    pub plugin_errors: Vec<PluginLoadError>,
    pub error_log: Option<PathBuf>,
    pub preview_requested: bool,
}

impl SessionReport {
    /// HTML of the last rendered document
    pub fn last_html(&self) -> Option<&str> {
        self.results.last().map(|result| result.html_content.as_str())
    }

    /// File name of the last document, used for the preview title
    pub fn last_file_name(&self) -> Option<String> {
        self.last_document
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Title of the preview for a source file name
pub fn preview_title(file_name: &str) -> String {
    format!("Preview '{}'", file_name)
}

/// `<stem>.html` next to the source document
pub fn html_output_path(document: &Path) -> PathBuf {
    document.with_extension("html")
}

/// Render every document in the configured data set.
///
/// The preview artifact is reset first and then holds the HTML of the most
/// recently rendered document.
pub async fn run(
    handle: &RendererHandle,
    configuration: &DebugConfiguration,
    root: &Path,
    preview: &PreviewProvider,
    host: &dyn EditorHost,
) -> Result<SessionReport> {
    let options = &configuration.session_options;
    let mut report = SessionReport {
        plugin_errors: handle.errors().to_vec(),
        ..SessionReport::default()
    };

    preview.clear().await;

    for relative in &configuration.test_data_set {
        let document = root.join(relative);
        let text = tokio::fs::read_to_string(&document)
            .await
            .map_err(|e| DebugError::DocumentRead {
                path: document.clone(),
                source: e,
            })?;

        let html = handle
            .render(&text)
            .await
            .map_err(|message| DebugError::Render {
                document: document.clone(),
                message,
            })?;
        log::debug!("Rendered {} ({} bytes)", document.display(), html.len());

        let output_path = if options.save_html_files {
            let output = html_output_path(&document);
            tokio::fs::write(&output, format!("{}{}", UTF8_BOM, html))
                .await
                .map_err(|e| DebugError::write_failure(&output, e))?;
            log::info!("Wrote {}", output.display());
            report.last_document = Some(document.clone());
            Some(output)
        } else {
            None
        };

        preview.set(html.clone()).await;
        report.results.push(RenderResult {
            source_document: document,
            output_path,
            html_content: html,
        });
    }

    if report.last_document.is_none() {
        report.last_document = report
            .results
            .last()
            .map(|result| result.source_document.clone());
    }

    if options.create_error_log && !report.plugin_errors.is_empty() {
        let log_path = write_error_log(root, &options.error_log_file, &report.plugin_errors).await?;
        if options.show_error_log {
            host.open_document(&log_path).await;
        }
        report.error_log = Some(log_path);
    }

    if options.show_last_html {
        if let Some(name) = report.last_file_name() {
            let uri = preview_uri();
            preview.notify_changed(uri);
            host.show_preview(uri, &preview_title(&name)).await;
            report.preview_requested = true;
        }
    }

    Ok(report)
}

async fn write_error_log(root: &Path, file: &str, errors: &[PluginLoadError]) -> Result<PathBuf> {
    let path = root.join(file);
    let mut text = String::new();
    for error in errors {
        text.push_str(&error.to_string());
        text.push('\n');
    }
    tokio::fs::write(&path, text)
        .await
        .map_err(|e| DebugError::write_failure(&path, e))?;
    log::info!("Wrote {} plugin error(s) to {}", errors.len(), path.display());
    Ok(path)
}
