//! Sentinel file watching for out-of-process sessions.
//!
//! The driver signals completion by writing two files into the session
//! temp directory. They can appear in either order; once both exist the
//! preview is updated and the watch state resets for the next launch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::host::EditorHost;
use crate::preview::{PreviewProvider, preview_uri};
use crate::session::preview_title;

/// Rendered HTML of the last document
pub const HTML_SENTINEL: &str = "preview.html";
/// File name of the last source document
pub const NAME_SENTINEL: &str = "last-file-name.txt";

/// Locations of the two sentinel files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelPaths {
    pub html: PathBuf,
    pub name: PathBuf,
}

impl SentinelPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            html: dir.join(HTML_SENTINEL),
            name: dir.join(NAME_SENTINEL),
        }
    }

    /// Delete leftovers from an earlier launch
    pub async fn remove_stale(&self) -> std::io::Result<()> {
        for path in [&self.html, &self.name] {
            match tokio::fs::remove_file(path).await {
                Ok(()) => log::debug!("Removed stale sentinel {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    SentinelTouched(Vec<PathBuf>),
    WatcherError(notify::Error),
}

#[derive(Debug, Default)]
struct SentinelState {
    html_seen: bool,
    name_seen: bool,
    completed: usize,
}

impl SentinelState {
    fn clear(&mut self) {
        self.html_seen = false;
        self.name_seen = false;
    }
}

/// Watches a session temp directory for completed sentinel pairs
pub struct SentinelWatcher {
    state: Arc<Mutex<SentinelState>>,
    task: JoinHandle<()>,
    _watcher: RecommendedWatcher,
}

impl SentinelWatcher {
    /// Start watching `dir`; must be called from within a tokio runtime
    pub fn start(
        dir: &Path,
        sentinels: SentinelPaths,
        preview: PreviewProvider,
        host: Arc<dyn EditorHost>,
    ) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                        let _ = tx.send(WatcherEvent::SentinelTouched(event.paths));
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            Config::default(),
        )?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        log::debug!("Watching {} for session output", dir.display());

        let state = Arc::new(Mutex::new(SentinelState::default()));
        let task = tokio::spawn(watch_loop(rx, sentinels, state.clone(), preview, host));

        Ok(Self {
            state,
            task,
            _watcher: watcher,
        })
    }

    /// Forget sentinels seen so far
    pub async fn reset(&self) {
        self.state.lock().await.clear();
    }

    /// Number of sentinel pairs turned into previews
    pub async fn completed(&self) -> usize {
        self.state.lock().await.completed
    }
}

impl Drop for SentinelWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_loop(
    mut rx: mpsc::UnboundedReceiver<WatcherEvent>,
    sentinels: SentinelPaths,
    state: Arc<Mutex<SentinelState>>,
    preview: PreviewProvider,
    host: Arc<dyn EditorHost>,
) {
    while let Some(event) = rx.recv().await {
        match event {
            WatcherEvent::SentinelTouched(paths) => {
                let ready = {
                    let mut state = state.lock().await;
                    for path in &paths {
                        if !path.exists() {
                            continue;
                        }
                        if same_base_name(path, &sentinels.html) {
                            state.html_seen = true;
                        } else if same_base_name(path, &sentinels.name) {
                            state.name_seen = true;
                        }
                    }
                    state.html_seen && state.name_seen
                };

                if ready {
                    publish(&sentinels, &state, &preview, host.as_ref()).await;
                }
            }
            WatcherEvent::WatcherError(e) => {
                log::error!("Session output watcher error: {}", e);
            }
        }
    }
}

async fn publish(
    sentinels: &SentinelPaths,
    state: &Mutex<SentinelState>,
    preview: &PreviewProvider,
    host: &dyn EditorHost,
) {
    let html = tokio::fs::read_to_string(&sentinels.html).await;
    let name = tokio::fs::read_to_string(&sentinels.name).await;

    let (html, name) = match (html, name) {
        (Ok(html), Ok(name)) => (html, name),
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("Session output disappeared before it could be read: {}", e);
            state.lock().await.clear();
            return;
        }
    };

    {
        let mut state = state.lock().await;
        state.clear();
        state.completed += 1;
    }

    let uri = preview_uri();
    preview.set(html).await;
    preview.notify_changed(uri);
    host.show_preview(uri, &preview_title(name.trim())).await;
}

fn same_base_name(path: &Path, sentinel: &Path) -> bool {
    match (path.file_name(), sentinel.file_name()) {
        (Some(a), Some(b)) => {
            a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
        }
        _ => false,
    }
}
