//! Editor host integration.
//!
//! Everything the debug workflow needs from the editor goes through
//! [`EditorHost`]: user-facing messages, opening files, showing the preview
//! and starting a debugger. The language server implements it on top of the
//! LSP client; the CLI uses [`ConsoleHost`].

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tower_lsp::lsp_types::Url;

use crate::error::DebugError;
use crate::launcher::LaunchDescriptor;
use crate::preview::PreviewProvider;

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[tower_lsp::async_trait]
pub trait EditorHost: Send + Sync {
    async fn show_message(&self, level: MessageLevel, message: String);

    /// Open a file for editing
    async fn open_document(&self, path: &Path);

    /// Open (or refresh) the read-only preview of `uri`
    async fn show_preview(&self, uri: &Url, title: &str);

    /// Hand a launch descriptor to the host's debugger
    async fn launch_debugger(&self, descriptor: &LaunchDescriptor) -> Result<(), DebugError>;
}

/// Host for the command-line tool: messages go to the log, the preview to
/// stdout, and launches spawn the driver (optionally under a debugger).
pub struct ConsoleHost {
    preview: PreviewProvider,
    debugger: Vec<String>,
    children: Mutex<Vec<Child>>,
}

impl ConsoleHost {
    pub fn new(preview: PreviewProvider, debugger: Vec<String>) -> Self {
        Self {
            preview,
            debugger,
            children: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every launched process to exit
    pub async fn wait_for_launches(&self) -> Vec<ExitStatus> {
        let mut children = std::mem::take(&mut *self.children.lock().await);
        let mut statuses = Vec::with_capacity(children.len());
        for child in &mut children {
            match child.wait().await {
                Ok(status) => statuses.push(status),
                Err(e) => log::error!("Failed to wait for debug process: {}", e),
            }
        }
        statuses
    }

    fn command_for(&self, descriptor: &LaunchDescriptor) -> Command {
        let mut command = match self.debugger.split_first() {
            Some((debugger, debugger_args)) => {
                let mut command = Command::new(debugger);
                command.args(debugger_args).arg(&descriptor.program);
                command
            }
            None => Command::new(&descriptor.program),
        };
        command
            .args(&descriptor.args)
            .current_dir(&descriptor.cwd)
            .stdin(Stdio::inherit());
        command
    }
}

#[tower_lsp::async_trait]
impl EditorHost for ConsoleHost {
    async fn show_message(&self, level: MessageLevel, message: String) {
        match level {
            MessageLevel::Info => log::info!("{}", message),
            MessageLevel::Warning => log::warn!("{}", message),
            MessageLevel::Error => log::error!("{}", message),
        }
    }

    async fn open_document(&self, path: &Path) {
        log::info!("Edit {}", path.display());
    }

    async fn show_preview(&self, uri: &Url, title: &str) {
        match self.preview.provide_content(uri).await {
            Some(content) => {
                log::info!("{}", title);
                println!("{}", content.trim_start_matches('\u{feff}'));
            }
            None => log::info!("{}: nothing to preview", title),
        }
    }

    async fn launch_debugger(&self, descriptor: &LaunchDescriptor) -> Result<(), DebugError> {
        let child = self.command_for(descriptor).spawn().map_err(|e| {
            DebugError::Launch(format!("{}: {}", descriptor.program.display(), e))
        })?;
        log::info!(
            "Launched '{}' (pid {})",
            descriptor.name,
            child.id().unwrap_or_default()
        );
        self.children.lock().await.push(child);
        Ok(())
    }
}

/// Host with no user interface, used by the out-of-process driver
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

#[tower_lsp::async_trait]
impl EditorHost for NullHost {
    async fn show_message(&self, level: MessageLevel, message: String) {
        log::debug!("{:?}: {}", level, message);
    }

    async fn open_document(&self, _path: &Path) {}

    async fn show_preview(&self, _uri: &Url, _title: &str) {}

    async fn launch_debugger(&self, descriptor: &LaunchDescriptor) -> Result<(), DebugError> {
        Err(DebugError::Launch(format!(
            "no debugger available for '{}'",
            descriptor.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn descriptor(program: &str, args: &[&str]) -> LaunchDescriptor {
        LaunchDescriptor::new(
            PathBuf::from(program),
            args.iter().map(|s| s.to_string()).collect(),
            std::env::temp_dir(),
        )
    }

    #[test]
    fn test_debugger_prefix_wraps_program() {
        let host = ConsoleHost::new(
            PreviewProvider::new(),
            vec!["gdb".to_string(), "--args".to_string()],
        );
        let command = host.command_for(&descriptor("driver", &["--root", "/w"]));
        let std_command = command.as_std();

        assert_eq!(std_command.get_program(), "gdb");
        let args: Vec<_> = std_command.get_args().collect();
        assert_eq!(args, ["--args", "driver", "--root", "/w"]);
    }

    #[test]
    fn test_without_debugger_runs_program_directly() {
        let host = ConsoleHost::new(PreviewProvider::new(), Vec::new());
        let command = host.command_for(&descriptor("driver", &["--root", "/w"]));
        assert_eq!(command.as_std().get_program(), "driver");
    }

    #[tokio::test]
    async fn test_null_host_refuses_launch() {
        let err = NullHost
            .launch_debugger(&descriptor("driver", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DebugError::Launch(_)));
    }
}
