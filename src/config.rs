//! Tool settings for markdown-debug.
//!
//! Handles:
//! - Command-line argument parsing
//! - User-global and project TOML settings files
//! - Merging them into effective [`Settings`]

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;

use crate::error::DebugError;

/// Default name of the debug configuration file under `.vscode/`
pub const DEFAULT_CONFIGURATION_NAME: &str = "markdown-debug.settings.json";

/// Project settings file at the workspace root
pub const PROJECT_SETTINGS_FILE: &str = ".markdown-debug.toml";

/// Settings shared by every markdown-debug front end
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// File name of the debug configuration inside `.vscode/`
    #[arg(long, global = true)]
    pub configuration_name: Option<String>,

    /// Path to the markdown-debug-driver executable
    #[arg(long, global = true)]
    pub driver: Option<PathBuf>,

    /// Debugger command wrapping the driver, e.g. "gdb --args"
    #[arg(long, global = true)]
    pub debugger: Option<String>,

    /// Log level
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Values that take priority over every settings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub configuration_name: Option<String>,
    pub driver: Option<PathBuf>,
    pub debugger: Option<Vec<String>>,
    /// User-global settings file; `None` skips it
    pub user_settings: Option<PathBuf>,
}

impl SettingsOverrides {
    /// Overrides from command-line arguments, with the user settings file
    pub fn from_args(args: &SettingsArgs) -> Self {
        Self {
            configuration_name: args.configuration_name.clone(),
            driver: args.driver.clone(),
            debugger: args
                .debugger
                .as_deref()
                .map(|command| command.split_whitespace().map(str::to_string).collect()),
            user_settings: user_settings_path(),
        }
    }
}

/// `<config dir>/markdown-debug/config.toml`
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("markdown-debug").join("config.toml"))
}

/// Effective tool settings for one workspace
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub configuration_file_name: String,
    pub driver: Option<PathBuf>,
    /// Command prefix placed before the driver; empty runs it directly
    pub debugger: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            configuration_file_name: DEFAULT_CONFIGURATION_NAME.to_string(),
            driver: None,
            debugger: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct SettingsFile {
    configuration_file_name: Option<String>,
    driver: Option<PathBuf>,
    debugger: Option<Vec<String>>,
}

impl Settings {
    /// Defaults < user settings < project settings < overrides
    pub async fn load(root: &Path, overrides: &SettingsOverrides) -> Result<Self, DebugError> {
        let mut settings = Settings::default();

        if let Some(user) = &overrides.user_settings {
            if let Some(file) = read_settings_file(user).await? {
                settings.merge(file, None);
            }
        }

        let project = root.join(PROJECT_SETTINGS_FILE);
        if let Some(file) = read_settings_file(&project).await? {
            settings.merge(file, Some(root));
        }

        if let Some(name) = &overrides.configuration_name {
            settings.configuration_file_name = name.clone();
        }
        if let Some(driver) = &overrides.driver {
            settings.driver = Some(driver.clone());
        }
        if let Some(debugger) = &overrides.debugger {
            settings.debugger = debugger.clone();
        }

        Ok(settings)
    }

    /// Project-relative driver paths resolve against `base`
    fn merge(&mut self, file: SettingsFile, base: Option<&Path>) {
        if let Some(name) = file.configuration_file_name {
            self.configuration_file_name = name;
        }
        if let Some(driver) = file.driver {
            self.driver = Some(match base {
                Some(base) if driver.is_relative() => base.join(driver),
                _ => driver,
            });
        }
        if let Some(debugger) = file.debugger {
            self.debugger = debugger;
        }
    }
}

async fn read_settings_file(path: &Path) -> Result<Option<SettingsFile>, DebugError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DebugError::Settings {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    log::debug!("Loading settings from {}", path.display());
    toml::from_str(&text)
        .map(Some)
        .map_err(|e| DebugError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
