//! Preview Provider
//!
//! Holds the most recently rendered HTML and tells subscribers (the host's
//! viewer) when it changes. Only one preview target exists, so content is
//! not tracked per URI.

use std::sync::{Arc, LazyLock};

use tokio::sync::{RwLock, broadcast};
use tower_lsp::lsp_types::Url;

/// URI scheme (and authority) of the virtual preview document
pub const PREVIEW_SCHEME: &str = "markdown-debug-preview";

static PREVIEW_URI: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(&format!("{0}://authority/{0}", PREVIEW_SCHEME)).expect("preview URI is valid")
});

/// The single preview document URI
pub fn preview_uri() -> &'static Url {
    &PREVIEW_URI
}

/// Shared handle to the preview artifact; clones see the same content
#[derive(Debug, Clone)]
pub struct PreviewProvider {
    artifact: Arc<RwLock<Option<String>>>,
    changes: broadcast::Sender<Url>,
}

impl Default for PreviewProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewProvider {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            artifact: Arc::new(RwLock::new(None)),
            changes,
        }
    }

    /// Current preview HTML, or `None` when nothing has been rendered
    pub async fn provide_content(&self, uri: &Url) -> Option<String> {
        if uri.scheme() != PREVIEW_SCHEME {
            return None;
        }
        self.artifact.read().await.clone()
    }

    /// Tell subscribers to re-request the content of `uri`
    pub fn notify_changed(&self, uri: &Url) {
        // No subscribers is fine: nobody is looking at the preview
        let _ = self.changes.send(uri.clone());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Url> {
        self.changes.subscribe()
    }

    pub async fn set(&self, html: String) {
        *self.artifact.write().await = Some(html);
    }

    pub async fn clear(&self) {
        *self.artifact.write().await = None;
    }
}
