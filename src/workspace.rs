//! Workspace Scanner
//!
//! Finds sample Markdown documents and plugin directories under a project
//! root to seed a default debug configuration.

use std::path::{Component, Path};

use walkdir::{DirEntry, WalkDir};

use crate::configuration::PluginEntry;
use crate::error::{DebugError, Result};

/// File whose presence marks a plugin directory
pub const PLUGIN_MANIFEST: &str = "package.json";

/// Directories the host never reports to file searches
const EXCLUDED_DIRS: &[&str] = &[".git", ".svn", ".hg", "CVS"];

/// Documents and plugins discovered under a root, paths relative to it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceScan {
    pub documents: Vec<String>,
    pub plugins: Vec<PluginEntry>,
}

/// Walk `root` and collect `*.md` files and plugin directories.
///
/// Entries are visited sorted by file name so the result is stable.
pub fn scan(root: &Path) -> WorkspaceScan {
    let mut result = WorkspaceScan::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable workspace entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("md") {
            if let Some(relative) = relative_to(root, path) {
                result.documents.push(relative);
            }
        } else if entry.file_name() == PLUGIN_MANIFEST {
            if let Some(relative) = path.parent().and_then(|dir| relative_to(root, dir)) {
                result.plugins.push(PluginEntry::new(relative));
            }
        }
    }

    log::debug!(
        "Scanned {}: {} documents, {} plugins",
        root.display(),
        result.documents.len(),
        result.plugins.len()
    );

    result
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

/// Relative path with `/` separators, independent of the host platform
fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Run [`scan`] on the blocking pool, off the async runtime's workers
pub async fn scan_in_background(root: &Path) -> Result<WorkspaceScan> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || scan(&root))
        .await
        .map_err(|e| DebugError::WorkspaceScan(e.to_string()))
}
