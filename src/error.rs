//! Error taxonomy for debug sessions.
//!
//! Plugin attachment failures are not part of [`DebugError`]:
//! they are collected per plugin as [`PluginLoadError`] values and never
//! abort a session.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by configuration, session and launch operations
#[derive(Debug, Error)]
pub enum DebugError {
    #[error("Markdown debugging requires an open folder and workspace")]
    NoWorkspaceOpen,

    #[error("debug configuration not found: {}", path.display())]
    ConfigurationMissing { path: PathBuf },

    #[error("debug configuration {} is malformed: {message}", path.display())]
    ConfigurationMalformed { path: PathBuf, message: String },

    #[error("renderer driver '{name}' not found")]
    RendererNotFound { name: String },

    #[error("failed to write {}: {source}", path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("rendering {} failed: {message}", document.display())]
    Render { document: PathBuf, message: String },

    #[error("debugger launch failed: {0}")]
    Launch(String),

    #[error("invalid settings file {}: {message}", path.display())]
    Settings { path: PathBuf, message: String },

    #[error("workspace scan failed: {0}")]
    WorkspaceScan(String),
}

impl DebugError {
    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OutputWriteFailure {
            path: path.into(),
            source,
        }
    }
}

/// A plugin that could not be attached to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("plugin '{path}': {message}")]
pub struct PluginLoadError {
    /// Plugin path as written in the configuration
    pub path: String,
    pub message: String,
}

pub type Result<T, E = DebugError> = std::result::Result<T, E>;
