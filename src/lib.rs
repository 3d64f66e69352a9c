//! Markdown Plugin Debugging
//!
//! Tooling for developing Markdown renderer plugins: render a configured set
//! of Markdown documents through a plugin-extended renderer, in process or
//! under a debugger, and preview the HTML of the last document.
//!
//! This library provides:
//! - the per-workspace debug configuration (generate, read, write)
//! - a comrak renderer extended with process plugins
//! - the session runner and the out-of-process driver
//! - the debug launcher and its sentinel-file watcher
//! - the preview provider and the LSP front end

pub mod commands;
pub mod config;
pub mod configuration;
pub mod context;
pub mod driver;
pub mod error;
pub mod host;
pub mod launcher;
pub mod lsp;
pub mod preview;
pub mod renderer;
pub mod session;
pub mod test_support;
pub mod workspace;

pub use config::{Settings, SettingsArgs, SettingsOverrides};
pub use configuration::{ConfigurationStore, DebugConfiguration};
pub use context::SessionContext;
pub use error::{DebugError, PluginLoadError};
pub use host::{ConsoleHost, EditorHost, MessageLevel};
pub use preview::PreviewProvider;
pub use renderer::RendererHandle;
pub use session::{RenderResult, SessionReport};
