//! Debug Launcher
//!
//! Runs a session out of process under the host's debugger. The driver
//! binary receives everything through explicit arguments; its completion is
//! observed through sentinel files in a per-process temp directory.

pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::configuration::{DebugConfiguration, to_pretty_json};
use crate::context::SessionContext;
use crate::error::{DebugError, Result};
use crate::host::EditorHost;

pub use watch::{HTML_SENTINEL, NAME_SENTINEL, SentinelPaths, SentinelWatcher};

/// Executable name of the out-of-process driver
pub const DRIVER_NAME: &str = "markdown-debug-driver";
/// Debug configuration as handed to the driver
pub const CONFIGURATION_FILE: &str = "configuration.json";
/// Launch descriptor as handed to the host
pub const LAUNCH_FILE: &str = "launch.json";

/// What the host's debugger is asked to start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub request: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub stop_on_entry: bool,
    pub protocol: String,
}

impl LaunchDescriptor {
    pub fn new(program: PathBuf, args: Vec<String>, cwd: PathBuf) -> Self {
        Self {
            kind: "markdown-debug".to_string(),
            name: "Markdown plugin debug session".to_string(),
            request: "launch".to_string(),
            program,
            args,
            cwd,
            stop_on_entry: false,
            protocol: "auto".to_string(),
        }
    }
}

/// Outcome of a launch request
#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub descriptor: LaunchDescriptor,
    pub temp_dir: PathBuf,
    /// True when this launch installed the directory watcher
    pub started_watch: bool,
}

/// Find the driver: explicit setting, next to this executable, then `PATH`
pub fn resolve_driver(settings: &Settings) -> Result<PathBuf> {
    if let Some(driver) = &settings.driver {
        return if driver.is_file() {
            Ok(driver.clone())
        } else {
            Err(DebugError::RendererNotFound {
                name: driver.display().to_string(),
            })
        };
    }

    let file_name = format!("{}{}", DRIVER_NAME, std::env::consts::EXE_SUFFIX);

    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)));
    let on_path = std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(&file_name))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    sibling
        .into_iter()
        .chain(on_path)
        .find(|candidate| candidate.is_file())
        .ok_or(DebugError::RendererNotFound { name: file_name })
}

/// Driver arguments for one launch
pub fn driver_args(configuration: &Path, root: &Path, sentinels: &SentinelPaths) -> Vec<String> {
    vec![
        "--configuration".to_string(),
        configuration.display().to_string(),
        "--root".to_string(),
        root.display().to_string(),
        "--html-output".to_string(),
        sentinels.html.display().to_string(),
        "--name-output".to_string(),
        sentinels.name.display().to_string(),
    ]
}

/// Hand a session to the host's debugger.
///
/// The temp directory is created on the first launch and the watcher on the
/// first launch that gets as far as installing it. Both are reused afterwards;
/// each launch clears the previous sentinels first.
pub async fn launch(
    context: &SessionContext,
    host: Arc<dyn EditorHost>,
    root: &Path,
    driver: PathBuf,
    configuration: &DebugConfiguration,
) -> Result<LaunchReport> {
    let temp_dir = context.temp_workspace().await?;
    let sentinels = SentinelPaths::in_dir(&temp_dir);

    sentinels
        .remove_stale()
        .await
        .map_err(|e| DebugError::write_failure(&temp_dir, e))?;
    context.reset_watcher().await;

    let configuration_path = temp_dir.join(CONFIGURATION_FILE);
    let text = to_pretty_json(configuration).map_err(|e| DebugError::ConfigurationMalformed {
        path: configuration_path.clone(),
        message: e.to_string(),
    })?;
    tokio::fs::write(&configuration_path, text)
        .await
        .map_err(|e| DebugError::write_failure(&configuration_path, e))?;

    let descriptor = LaunchDescriptor::new(
        driver,
        driver_args(&configuration_path, root, &sentinels),
        root.to_path_buf(),
    );
    let launch_path = temp_dir.join(LAUNCH_FILE);
    let launch_json = serde_json::to_string_pretty(&descriptor)
        .map_err(|e| DebugError::Launch(e.to_string()))?;
    tokio::fs::write(&launch_path, launch_json)
        .await
        .map_err(|e| DebugError::write_failure(&launch_path, e))?;

    // The watcher has to exist before the driver can possibly finish
    let started_watch = !context.is_watching().await;
    if started_watch {
        let watcher = SentinelWatcher::start(
            &temp_dir,
            sentinels.clone(),
            context.preview().clone(),
            host.clone(),
        )
        .map_err(|e| DebugError::Launch(format!("cannot watch {}: {}", temp_dir.display(), e)))?;
        context.attach_watcher(watcher).await;
    }

    host.launch_debugger(&descriptor).await?;
    log::info!("Debug session launched from {}", launch_path.display());

    Ok(LaunchReport {
        descriptor,
        temp_dir,
        started_watch,
    })
}
