//! Session Context
//!
//! Process-wide state of the debug workflow, passed explicitly to every
//! component:
//! - the preview artifact (through [`PreviewProvider`])
//! - tool settings, cached until invalidated
//! - the session temp directory and its sentinel watcher, created on first
//!   launch and torn down on deactivate

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::config::{Settings, SettingsOverrides};
use crate::error::{DebugError, Result};
use crate::launcher::SentinelWatcher;
use crate::preview::PreviewProvider;

#[derive(Debug)]
struct CachedSettings {
    root: PathBuf,
    settings: Arc<Settings>,
}

struct TempWorkspace {
    // dropped before the directory is removed
    watcher: Option<SentinelWatcher>,
    dir: TempDir,
}

pub struct SessionContext {
    overrides: SettingsOverrides,
    preview: PreviewProvider,
    settings: Mutex<Option<CachedSettings>>,
    temp: Mutex<Option<TempWorkspace>>,
}

impl SessionContext {
    pub fn new(overrides: SettingsOverrides) -> Self {
        Self {
            overrides,
            preview: PreviewProvider::new(),
            settings: Mutex::new(None),
            temp: Mutex::new(None),
        }
    }

    pub fn preview(&self) -> &PreviewProvider {
        &self.preview
    }

    /// Settings for `root`, loaded on first use and cached
    pub async fn settings(&self, root: &Path) -> Result<Arc<Settings>> {
        let mut cached = self.settings.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.root == root {
                return Ok(entry.settings.clone());
            }
        }

        let settings = Arc::new(Settings::load(root, &self.overrides).await?);
        *cached = Some(CachedSettings {
            root: root.to_path_buf(),
            settings: settings.clone(),
        });
        Ok(settings)
    }

    /// Force the next [`settings`](Self::settings) call to reload
    pub async fn invalidate_settings(&self) {
        if self.settings.lock().await.take().is_some() {
            log::debug!("Settings cache invalidated");
        }
    }

    /// The session temp directory, created on first use
    pub async fn temp_workspace(&self) -> Result<PathBuf> {
        let mut temp = self.temp.lock().await;
        if let Some(workspace) = temp.as_ref() {
            return Ok(workspace.dir.path().to_path_buf());
        }

        let dir = tempfile::Builder::new()
            .prefix("markdown-debug-")
            .tempdir()
            .map_err(|e| DebugError::write_failure(std::env::temp_dir(), e))?;
        let path = dir.path().to_path_buf();
        log::debug!("Created session directory {}", path.display());
        *temp = Some(TempWorkspace { watcher: None, dir });
        Ok(path)
    }

    /// Keep the watcher alive for as long as the temp directory exists
    pub async fn attach_watcher(&self, watcher: SentinelWatcher) {
        match self.temp.lock().await.as_mut() {
            Some(workspace) => workspace.watcher = Some(watcher),
            None => log::warn!("Discarding watcher: no session directory"),
        }
    }

    pub async fn reset_watcher(&self) {
        if let Some(watcher) = self.temp.lock().await.as_ref().and_then(|w| w.watcher.as_ref()) {
            watcher.reset().await;
        }
    }

    pub async fn is_watching(&self) -> bool {
        self.temp
            .lock()
            .await
            .as_ref()
            .is_some_and(|workspace| workspace.watcher.is_some())
    }

    /// Completed sentinel pairs seen by the watcher
    pub async fn completed_sessions(&self) -> usize {
        match self.temp.lock().await.as_ref().and_then(|w| w.watcher.as_ref()) {
            Some(watcher) => watcher.completed().await,
            None => 0,
        }
    }

    /// Drop all process-wide state
    pub async fn deactivate(&self) {
        self.preview.clear().await;
        self.settings.lock().await.take();
        if let Some(workspace) = self.temp.lock().await.take() {
            log::debug!("Removing session directory {}", workspace.dir.path().display());
        }
    }
}
