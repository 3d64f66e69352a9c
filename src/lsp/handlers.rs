use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::commands::{self, CommandOutcome};
use crate::config::PROJECT_SETTINGS_FILE;
use crate::host::EditorHost;
use crate::lsp::backend::Backend;
use crate::lsp::protocol::{PreviewChanged, PreviewChangedParams, PreviewContentParams};

/// Trait for handling `workspace/executeCommand`
#[tower_lsp::async_trait]
pub trait HandleExecuteCommand {
    async fn handle_execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> LspResult<Option<Value>>;
}

/// Trait for the preview content provider and its change notifications
#[tower_lsp::async_trait]
pub trait HandlePreview {
    async fn handle_preview_content(
        &self,
        params: PreviewContentParams,
    ) -> LspResult<Option<String>>;
    fn start_preview_forwarding(&self);
}

/// Trait for reacting to settings changes
#[tower_lsp::async_trait]
pub trait HandleSettingsChange {
    async fn handle_watched_files(&self, params: DidChangeWatchedFilesParams);
}

/// JSON answer of an executed command
fn outcome_value(outcome: &CommandOutcome) -> Value {
    match outcome {
        CommandOutcome::Generated(path) | CommandOutcome::ConfigurationCreated(path) => {
            json!({ "configuration": path })
        }
        CommandOutcome::Session(report) => json!({
            "documents": report.results.len(),
            "pluginErrors": report
                .plugin_errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            "lastDocument": report.last_document,
        }),
        CommandOutcome::Launched(report) => json!({
            "launch": report.descriptor,
            "tempDir": report.temp_dir,
        }),
    }
}

#[tower_lsp::async_trait]
impl HandleExecuteCommand for Backend {
    async fn handle_execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> LspResult<Option<Value>> {
        let root = self.root.read().await.clone();
        let host: Arc<dyn EditorHost> = self.host.clone();

        match commands::execute(&self.context, host, root.as_deref(), &params.command).await {
            Ok(outcome) => Ok(outcome.as_ref().map(outcome_value)),
            Err(e) => {
                // reported to the user, not a protocol error
                commands::report(self.host.as_ref(), &e).await;
                Ok(None)
            }
        }
    }
}

#[tower_lsp::async_trait]
impl HandlePreview for Backend {
    async fn handle_preview_content(
        &self,
        params: PreviewContentParams,
    ) -> LspResult<Option<String>> {
        Ok(self.context.preview().provide_content(&params.uri).await)
    }

    fn start_preview_forwarding(&self) {
        let mut changes = self.context.preview().subscribe();
        let client = self.client.clone();

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(uri) => {
                        client
                            .send_notification::<PreviewChanged>(PreviewChangedParams { uri })
                            .await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("Skipped {} preview change notifications", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

#[tower_lsp::async_trait]
impl HandleSettingsChange for Backend {
    async fn handle_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let touches_settings = params.changes.iter().any(|change| {
            change
                .uri
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .is_some_and(|name| name == PROJECT_SETTINGS_FILE)
        });

        if touches_settings {
            log::info!("{} changed, reloading settings", PROJECT_SETTINGS_FILE);
            self.context.invalidate_settings().await;
        }
    }
}
