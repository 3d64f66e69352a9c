use std::path::Path;

use tower_lsp::Client;
use tower_lsp::lsp_types::{MessageType, ShowDocumentParams, Url};

use crate::error::DebugError;
use crate::host::{EditorHost, MessageLevel};
use crate::launcher::LaunchDescriptor;
use crate::lsp::protocol::{LaunchDebugger, ShowPreview, ShowPreviewParams};

/// [`EditorHost`] backed by the connected LSP client
#[derive(Debug, Clone)]
pub struct LspHost {
    client: Client,
}

impl LspHost {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn message_type(level: MessageLevel) -> MessageType {
    match level {
        MessageLevel::Info => MessageType::INFO,
        MessageLevel::Warning => MessageType::WARNING,
        MessageLevel::Error => MessageType::ERROR,
    }
}

#[tower_lsp::async_trait]
impl EditorHost for LspHost {
    async fn show_message(&self, level: MessageLevel, message: String) {
        self.client.show_message(message_type(level), message).await;
    }

    async fn open_document(&self, path: &Path) {
        let Ok(uri) = Url::from_file_path(path) else {
            log::warn!("Cannot open {}: not an absolute path", path.display());
            return;
        };

        let params = ShowDocumentParams {
            uri,
            external: Some(false),
            take_focus: Some(true),
            selection: None,
        };
        match self.client.show_document(params).await {
            Ok(true) => {}
            Ok(false) => log::warn!("Client did not open {}", path.display()),
            Err(e) => log::warn!("Failed to open {}: {}", path.display(), e),
        }
    }

    async fn show_preview(&self, uri: &Url, title: &str) {
        self.client
            .send_notification::<ShowPreview>(ShowPreviewParams {
                uri: uri.clone(),
                title: title.to_string(),
            })
            .await;
    }

    async fn launch_debugger(&self, descriptor: &LaunchDescriptor) -> Result<(), DebugError> {
        match self.client.send_request::<LaunchDebugger>(descriptor.clone()).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DebugError::Launch(
                "the editor declined to start a debug session".to_string(),
            )),
            Err(e) => Err(DebugError::Launch(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_levels() {
        assert_eq!(message_type(MessageLevel::Info), MessageType::INFO);
        assert_eq!(message_type(MessageLevel::Warning), MessageType::WARNING);
        assert_eq!(message_type(MessageLevel::Error), MessageType::ERROR);
    }
}
