//! Configuration file location, generation and parsing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::jsonc::strip_comments;
use super::schema::DebugConfiguration;
use crate::error::{DebugError, Result};
use crate::workspace::WorkspaceScan;

/// Hidden project-settings directory holding the configuration file
pub const SETTINGS_DIR: &str = ".vscode";

const UTF8_BOM: char = '\u{feff}';

/// Result of generating a default configuration
#[derive(Debug, Clone)]
pub struct Generated {
    pub path: PathBuf,
    pub configuration: DebugConfiguration,
}

impl Generated {
    /// User-facing warning when the scan found nothing to debug
    pub fn warning(&self) -> Option<String> {
        let mut missing = Vec::new();
        if self.configuration.plugins.is_empty() {
            missing.push("plugins (directories with package.json)");
        }
        if self.configuration.test_data_set.is_empty() {
            missing.push("Markdown documents");
        }
        if missing.is_empty() {
            None
        } else {
            Some(format!(
                "No {} found in the workspace; edit {} by hand",
                missing.join(" or "),
                self.path.display()
            ))
        }
    }
}

/// Reads and writes `<root>/.vscode/<file name>`
#[derive(Debug, Clone)]
pub struct ConfigurationStore {
    file_name: String,
}

impl ConfigurationStore {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Configuration path without touching the file system
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(SETTINGS_DIR).join(&self.file_name)
    }

    /// Configuration path, creating the settings directory when absent
    pub async fn locate(&self, root: &Path) -> Result<PathBuf> {
        let dir = root.join(SETTINGS_DIR);
        match tokio::fs::create_dir(&dir).await {
            Ok(()) => log::debug!("Created settings directory {}", dir.display()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(DebugError::write_failure(dir, e)),
        }
        Ok(dir.join(&self.file_name))
    }

    /// Write a default configuration seeded from a workspace scan
    pub async fn generate(&self, root: &Path, scan: &WorkspaceScan) -> Result<Generated> {
        if root.as_os_str().is_empty() {
            return Err(DebugError::NoWorkspaceOpen);
        }

        let configuration =
            DebugConfiguration::seeded(scan.documents.clone(), scan.plugins.clone());
        let path = self.write(root, &configuration).await?;

        log::info!(
            "Generated debug configuration {} ({} documents, {} plugins)",
            path.display(),
            configuration.test_data_set.len(),
            configuration.plugins.len()
        );

        Ok(Generated {
            path,
            configuration,
        })
    }

    /// Serialize a configuration and write it to its located path
    pub async fn write(&self, root: &Path, configuration: &DebugConfiguration) -> Result<PathBuf> {
        let path = self.locate(root).await?;
        let text = to_pretty_json(configuration).map_err(|e| DebugError::ConfigurationMalformed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| DebugError::write_failure(&path, e))?;
        Ok(path)
    }

    /// Read and parse the configuration for a workspace
    pub async fn read(&self, root: &Path) -> Result<DebugConfiguration> {
        if root.as_os_str().is_empty() {
            return Err(DebugError::NoWorkspaceOpen);
        }

        let path = self.path(root);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DebugError::ConfigurationMissing { path });
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(DebugError::ConfigurationMalformed {
                    path,
                    message: "file is not valid UTF-8".to_string(),
                });
            }
            Err(e) => return Err(DebugError::DocumentRead { path, source: e }),
        };

        parse_configuration(&text, &path)
    }
}

/// Parse configuration text, tolerating comments and a leading byte-order mark
pub fn parse_configuration(text: &str, path: &Path) -> Result<DebugConfiguration> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let malformed = |message: String| DebugError::ConfigurationMalformed {
        path: path.to_path_buf(),
        message,
    };

    let configuration: DebugConfiguration =
        serde_json::from_str(&strip_comments(text)).map_err(|e| malformed(e.to_string()))?;
    configuration.validate().map_err(malformed)?;
    Ok(configuration)
}

/// Comment-free JSON with four-space indentation
pub fn to_pretty_json(configuration: &DebugConfiguration) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    configuration.serialize(&mut serializer)?;
    buffer.push(b'\n');
    String::from_utf8(buffer).map_err(serde::ser::Error::custom)
}
