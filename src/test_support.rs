//! Helpers for exercising the debug workflow without an editor.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tower_lsp::lsp_types::Url;

use crate::error::DebugError;
use crate::host::{EditorHost, MessageLevel};
use crate::launcher::LaunchDescriptor;

/// Host that records every interaction
#[derive(Debug, Default)]
pub struct RecordingHost {
    messages: Mutex<Vec<(MessageLevel, String)>>,
    opened: Mutex<Vec<PathBuf>>,
    previews: Mutex<Vec<(Url, String)>>,
    launches: Mutex<Vec<LaunchDescriptor>>,
}

impl RecordingHost {
    pub async fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages.lock().await.clone()
    }

    pub async fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().await.clone()
    }

    /// Preview URIs and titles, in the order they were shown
    pub async fn previews(&self) -> Vec<(Url, String)> {
        self.previews.lock().await.clone()
    }

    pub async fn launches(&self) -> Vec<LaunchDescriptor> {
        self.launches.lock().await.clone()
    }
}

#[tower_lsp::async_trait]
impl EditorHost for RecordingHost {
    async fn show_message(&self, level: MessageLevel, message: String) {
        self.messages.lock().await.push((level, message));
    }

    async fn open_document(&self, path: &Path) {
        self.opened.lock().await.push(path.to_path_buf());
    }

    async fn show_preview(&self, uri: &Url, title: &str) {
        self.previews.lock().await.push((uri.clone(), title.to_string()));
    }

    async fn launch_debugger(&self, descriptor: &LaunchDescriptor) -> Result<(), DebugError> {
        self.launches.lock().await.push(descriptor.clone());
        Ok(())
    }
}

/// Create a plugin directory whose executable is a shell script.
///
/// `stages` is written to the manifest's `markdownDebug.stages`.
#[cfg(unix)]
pub fn write_script_plugin(root: &Path, relative: &str, script: &str, stages: &[&str]) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let dir = root.join(relative);
    std::fs::create_dir_all(&dir).expect("create plugin directory");
    let manifest = serde_json::json!({
        "name": relative,
        "bin": "plugin.sh",
        "markdownDebug": { "stages": stages },
    });
    std::fs::write(dir.join("package.json"), manifest.to_string()).expect("write manifest");

    let executable = dir.join("plugin.sh");
    std::fs::write(&executable, format!("#!/bin/sh\n{}\n", script)).expect("write plugin script");
    let mut permissions = std::fs::metadata(&executable)
        .expect("plugin script metadata")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&executable, permissions).expect("make plugin executable");
    dir
}
