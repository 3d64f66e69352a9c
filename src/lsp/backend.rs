use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::commands::ALL_COMMANDS;
use crate::config::SettingsOverrides;
use crate::context::SessionContext;
use crate::lsp::handlers::{HandleExecuteCommand, HandlePreview, HandleSettingsChange};
use crate::lsp::host::LspHost;
use crate::lsp::protocol::PreviewContentParams;

/// The LSP backend: routes editor requests to the debug workflow
pub struct Backend {
    pub client: Client,
    pub host: Arc<LspHost>,
    pub context: Arc<SessionContext>,
    /// Workspace root announced by the client
    pub root: Arc<RwLock<Option<PathBuf>>>,
}

impl Backend {
    pub fn new(client: Client, overrides: SettingsOverrides) -> Self {
        Self {
            host: Arc::new(LspHost::new(client.clone())),
            client,
            context: Arc::new(SessionContext::new(overrides)),
            root: Arc::new(RwLock::new(None)),
        }
    }

    /// `markdownDebug/previewContent`
    pub async fn preview_content(&self, params: PreviewContentParams) -> LspResult<Option<String>> {
        self.handle_preview_content(params).await
    }
}

/// First workspace folder, or the legacy root URI
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    let from_folders = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .and_then(|folder| folder.uri.to_file_path().ok());

    #[allow(deprecated)]
    let from_root_uri = params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok());

    from_folders.or(from_root_uri)
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        let root = workspace_root(&params);
        match &root {
            Some(root) => log::info!("Workspace root: {}", root.display()),
            None => log::info!("No workspace folder open"),
        }
        *self.root.write().await = root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: ALL_COMMANDS.iter().map(|c| c.to_string()).collect(),
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "markdown-debug-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.start_preview_forwarding();
        self.client
            .log_message(MessageType::INFO, "markdown-debug-ls initialized")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        self.context.deactivate().await;
        Ok(())
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> LspResult<Option<Value>> {
        self.handle_execute_command(params).await
    }

    async fn did_change_configuration(&self, _: DidChangeConfigurationParams) {
        self.context.invalidate_settings().await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        self.handle_watched_files(params).await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        let added = params
            .event
            .added
            .first()
            .and_then(|folder| folder.uri.to_file_path().ok());

        let mut root = self.root.write().await;
        let removed_current = params.event.removed.iter().any(|folder| {
            folder.uri.to_file_path().ok().as_deref() == root.as_deref()
        });
        if added.is_some() || removed_current {
            *root = added;
            drop(root);
            self.context.invalidate_settings().await;
        }
    }
}
