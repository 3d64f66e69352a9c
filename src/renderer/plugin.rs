//! Renderer plugins.
//!
//! A plugin lives in its own directory next to a `package.json` manifest.
//! The manifest names an executable (`bin`, falling back to `main`) that
//! acts as a text filter: the stage input arrives on stdin, the transformed
//! text is read back from stdout. Plugin options and the stage name are
//! passed through the environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::configuration::PluginEntry;
use crate::workspace::PLUGIN_MANIFEST;

/// Environment variable carrying the plugin options as JSON
pub const OPTIONS_ENV: &str = "MARKDOWN_DEBUG_OPTIONS";
/// Environment variable carrying the stage name
pub const STAGE_ENV: &str = "MARKDOWN_DEBUG_STAGE";

/// Point in the pipeline where a plugin sees the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Markdown source, before rendering
    Markdown,
    /// Rendered HTML
    Html,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Markdown => "markdown",
            Stage::Html => "html",
        }
    }
}

/// A plugin attached to a renderer
#[tower_lsp::async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn handles(&self, stage: Stage) -> bool;

    /// Transform the stage input; the error string is shown to the user
    async fn apply(&self, stage: Stage, input: &str) -> Result<String, String>;
}

#[derive(Debug, Deserialize)]
struct PluginManifest {
    name: Option<String>,
    main: Option<String>,
    bin: Option<ManifestBin>,
    #[serde(rename = "markdownDebug")]
    markdown_debug: Option<ManifestExtension>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestBin {
    Single(String),
    Named(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct ManifestExtension {
    stages: Option<Vec<Stage>>,
}

impl PluginManifest {
    fn executable(&self) -> Option<&str> {
        match &self.bin {
            Some(ManifestBin::Single(bin)) => Some(bin.as_str()),
            Some(ManifestBin::Named(bins)) => bins.values().next().map(String::as_str),
            None => self.main.as_deref(),
        }
    }

    fn stages(&self) -> Vec<Stage> {
        self.markdown_debug
            .as_ref()
            .and_then(|ext| ext.stages.clone())
            .unwrap_or_else(|| vec![Stage::Markdown])
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

/// A plugin executed as a child process per stage invocation
#[derive(Debug, Clone)]
pub struct ProcessPlugin {
    name: String,
    directory: PathBuf,
    executable: PathBuf,
    stages: Vec<Stage>,
    options_json: String,
}

impl ProcessPlugin {
    /// Resolve and validate a configured plugin directory under `root`
    pub async fn load(root: &Path, entry: &PluginEntry) -> Result<Self, String> {
        let directory = root.join(&entry.path);
        if !is_dir(&directory).await {
            return Err(format!("directory {} not found", directory.display()));
        }

        let manifest_path = directory.join(PLUGIN_MANIFEST);
        let text = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|e| format!("cannot read {}: {}", manifest_path.display(), e))?;
        let manifest: PluginManifest = serde_json::from_str(&text)
            .map_err(|e| format!("invalid manifest {}: {}", manifest_path.display(), e))?;

        let executable = manifest
            .executable()
            .ok_or_else(|| "manifest names no executable ('bin' or 'main')".to_string())?;
        let executable = directory.join(executable);
        if !is_file(&executable).await {
            return Err(format!("executable {} not found", executable.display()));
        }

        let stages = manifest.stages();
        if stages.is_empty() {
            return Err("manifest declares no stages".to_string());
        }

        let options_json = serde_json::to_string(&entry.options)
            .map_err(|e| format!("options cannot be serialized: {}", e))?;

        let name = manifest.name.clone().unwrap_or_else(|| entry.path.clone());
        Ok(Self {
            name,
            directory,
            executable,
            stages,
            options_json,
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[tower_lsp::async_trait]
impl Plugin for ProcessPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    async fn apply(&self, stage: Stage, input: &str) -> Result<String, String> {
        let mut child = Command::new(&self.executable)
            .current_dir(&self.directory)
            .env(OPTIONS_ENV, &self.options_json)
            .env(STAGE_ENV, stage.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", self.executable.display(), e))?;

        // stdin is fed while stdout is drained
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_owned();
            let name = self.name.clone();
            tokio::spawn(async move {
                // a plugin may exit without reading all of its input
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    log::debug!("Plugin '{}' did not take its whole input: {}", name, e);
                }
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.executable.display(), e))?;
        if let Some(writer) = writer {
            let _ = writer.await;
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} stage exited with {}: {}",
                stage.as_str(),
                output.status,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| format!("{} stage produced invalid UTF-8", stage.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_executable_preference() {
        let manifest: PluginManifest =
            serde_json::from_str(r#"{ "main": "index.js", "bin": "run.sh" }"#).unwrap();
        assert_eq!(manifest.executable(), Some("run.sh"));

        let manifest: PluginManifest =
            serde_json::from_str(r#"{ "bin": { "tool": "bin/tool" } }"#).unwrap();
        assert_eq!(manifest.executable(), Some("bin/tool"));

        let manifest: PluginManifest = serde_json::from_str(r#"{ "main": "index" }"#).unwrap();
        assert_eq!(manifest.executable(), Some("index"));
        assert_eq!(manifest.stages(), vec![Stage::Markdown]);
    }

    #[test]
    fn test_manifest_stages() {
        let manifest: PluginManifest =
            serde_json::from_str(r#"{ "main": "x", "markdownDebug": { "stages": ["html"] } }"#)
                .unwrap();
        assert_eq!(manifest.stages(), vec![Stage::Html]);
    }

    #[tokio::test]
    async fn test_load_reports_missing_pieces() {
        let root = tempfile::tempdir().unwrap();

        let err = ProcessPlugin::load(root.path(), &PluginEntry::new("absent"))
            .await
            .unwrap_err();
        assert!(err.contains("not found"));

        std::fs::create_dir(root.path().join("no-manifest")).unwrap();
        let err = ProcessPlugin::load(root.path(), &PluginEntry::new("no-manifest"))
            .await
            .unwrap_err();
        assert!(err.contains("cannot read"));

        std::fs::create_dir(root.path().join("no-exec")).unwrap();
        std::fs::write(root.path().join("no-exec/package.json"), r#"{ "name": "x" }"#).unwrap();
        let err = ProcessPlugin::load(root.path(), &PluginEntry::new("no-exec"))
            .await
            .unwrap_err();
        assert!(err.contains("no executable"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_plugin_ignoring_its_input_still_succeeds() {
        let root = tempfile::tempdir().unwrap();
        crate::test_support::write_script_plugin(
            root.path(),
            "quiet",
            "printf 'replaced'",
            &["markdown"],
        );
        let plugin = ProcessPlugin::load(root.path(), &PluginEntry::new("quiet"))
            .await
            .unwrap();

        // larger than a pipe buffer, so the write outlives the plugin
        let input = "x".repeat(1 << 20);
        let output = plugin.apply(Stage::Markdown, &input).await.unwrap();
        assert_eq!(output, "replaced");
    }
}
