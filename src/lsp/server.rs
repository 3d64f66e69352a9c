use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::config::SettingsOverrides;
use crate::lsp::backend::Backend;
use crate::lsp::protocol::PREVIEW_CONTENT_METHOD;

/// Start the LSP server on stdio
pub async fn serve(overrides: SettingsOverrides) -> Result<()> {
    let (service, socket) = LspService::build(move |client| Backend::new(client, overrides))
        .custom_method(PREVIEW_CONTENT_METHOD, Backend::preview_content)
        .finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
