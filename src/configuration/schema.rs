//! Debug Configuration Schema
//!
//! Serde types for the JSON configuration file describing one debug session.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Straight quotes: typographer output keeps ASCII quote characters
pub const DEFAULT_SMART_QUOTES: &str = "\"\"''";

/// Root configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugConfiguration {
    #[serde(default, alias = "markdownItOptions")]
    pub markdown_options: MarkdownOptions,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    #[serde(default)]
    pub test_data_set: Vec<String>,
    #[serde(default, alias = "debugSessionOptions")]
    pub session_options: SessionOptions,
}

/// Renderer flags as the plugin author writes them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkdownOptions {
    pub html: bool,
    pub linkify: bool,
    pub breaks: bool,
    pub typographer: bool,
    pub quotes: String,
    /// Accepted for compatibility; the renderer always emits XHTML
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xhtml_out: Option<bool>,
    /// Flags this tool does not interpret, preserved on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            html: true,
            linkify: false,
            breaks: false,
            typographer: true,
            quotes: DEFAULT_SMART_QUOTES.to_string(),
            xhtml_out: None,
            extra: Map::new(),
        }
    }
}

/// One renderer plugin, identified by its directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Directory relative to the workspace root
    pub path: String,
    /// Passed through to the plugin untouched
    #[serde(default)]
    pub options: Map<String, Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl PluginEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            enabled: true,
            path: path.into(),
            options: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    pub save_html_files: bool,
    #[serde(rename = "showLastHTML")]
    pub show_last_html: bool,
    pub create_error_log: bool,
    pub error_log_file: String,
    pub show_error_log: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            save_html_files: true,
            show_last_html: true,
            create_error_log: true,
            error_log_file: "errors.log".to_string(),
            show_error_log: true,
        }
    }
}

impl Default for DebugConfiguration {
    fn default() -> Self {
        Self {
            markdown_options: MarkdownOptions::default(),
            plugins: Vec::new(),
            test_data_set: Vec::new(),
            session_options: SessionOptions::default(),
        }
    }
}

impl DebugConfiguration {
    /// Default configuration seeded with scanned documents and plugins
    pub fn seeded(test_data_set: Vec<String>, plugins: Vec<PluginEntry>) -> Self {
        Self {
            plugins,
            test_data_set,
            ..Self::default()
        }
    }

    /// Plugins that take part in a session, in configured order
    pub fn enabled_plugins(&self) -> impl Iterator<Item = &PluginEntry> {
        self.plugins.iter().filter(|plugin| plugin.enabled)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            let normalized = plugin.path.trim_end_matches(['/', '\\']);
            if !seen.insert(normalized) {
                return Err(format!("duplicate plugin path '{}'", plugin.path));
            }
        }
        Ok(())
    }
}
