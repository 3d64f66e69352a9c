//! Host commands.
//!
//! The three user-facing operations, shared by the language server and the
//! command-line tool. User-facing failures are turned into host messages by
//! [`report`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::configuration::{ConfigurationStore, DebugConfiguration};
use crate::context::SessionContext;
use crate::error::{DebugError, Result};
use crate::host::{EditorHost, MessageLevel};
use crate::launcher::{self, LaunchReport};
use crate::renderer;
use crate::session::{self, SessionReport};
use crate::workspace;

pub const COMMAND_START: &str = "markdown.pluginDevelopment.start";
pub const COMMAND_START_WITHOUT_DEBUGGING: &str =
    "markdown.pluginDevelopment.startWithoutDebugging";
pub const COMMAND_GENERATE: &str = "markdown.pluginDevelopment.generateDebugConfiguration";

pub const ALL_COMMANDS: [&str; 3] = [
    COMMAND_START,
    COMMAND_START_WITHOUT_DEBUGGING,
    COMMAND_GENERATE,
];

const EDIT_CONFIGURATION_HINT: &str =
    "Edit debug configuration file and start debugger again. File names are relative to workspace.";

/// Outcome of a successfully executed command
#[derive(Debug)]
pub enum CommandOutcome {
    Generated(PathBuf),
    /// The configuration was missing and a default one was generated instead
    ConfigurationCreated(PathBuf),
    Session(SessionReport),
    Launched(LaunchReport),
}

fn require_root(root: Option<&Path>) -> Result<&Path> {
    match root {
        Some(root) if !root.as_os_str().is_empty() => Ok(root),
        _ => Err(DebugError::NoWorkspaceOpen),
    }
}

async fn store_for(context: &SessionContext, root: &Path) -> Result<ConfigurationStore> {
    let settings = context.settings(root).await?;
    Ok(ConfigurationStore::new(settings.configuration_file_name.clone()))
}

/// Scan the workspace, write a default configuration and open it
pub async fn generate_configuration(
    context: &SessionContext,
    host: &dyn EditorHost,
    root: Option<&Path>,
) -> Result<PathBuf> {
    let root = require_root(root)?;
    let store = store_for(context, root).await?;

    let scan = workspace::scan_in_background(root).await?;
    let generated = store.generate(root, &scan).await?;
    if let Some(warning) = generated.warning() {
        host.show_message(MessageLevel::Warning, warning).await;
    }
    host.open_document(&generated.path).await;
    Ok(generated.path)
}

enum Loaded {
    Configuration(DebugConfiguration),
    Generated(PathBuf),
}

/// Read the configuration; a missing file is generated for the user to edit
async fn load_configuration(
    context: &SessionContext,
    host: &dyn EditorHost,
    root: &Path,
) -> Result<Loaded> {
    let store = store_for(context, root).await?;
    match store.read(root).await {
        Ok(configuration) => Ok(Loaded::Configuration(configuration)),
        Err(DebugError::ConfigurationMissing { path }) => {
            log::info!("No debug configuration at {}", path.display());
            host.show_message(MessageLevel::Info, EDIT_CONFIGURATION_HINT.to_string())
                .await;
            let generated = generate_configuration(context, host, Some(root)).await?;
            Ok(Loaded::Generated(generated))
        }
        Err(e) => Err(e),
    }
}

/// Render the configured documents in this process
pub async fn start_without_debugging(
    context: &SessionContext,
    host: &dyn EditorHost,
    root: Option<&Path>,
) -> Result<CommandOutcome> {
    let root = require_root(root)?;
    let configuration = match load_configuration(context, host, root).await? {
        Loaded::Configuration(configuration) => configuration,
        Loaded::Generated(path) => return Ok(CommandOutcome::ConfigurationCreated(path)),
    };

    let handle =
        renderer::build(&configuration.markdown_options, &configuration.plugins, root).await;
    let report = session::run(&handle, &configuration, root, context.preview(), host).await?;
    log::info!(
        "Session finished: {} documents, {} plugin errors",
        report.results.len(),
        report.plugin_errors.len()
    );
    Ok(CommandOutcome::Session(report))
}

/// Launch the configured session under the host's debugger
pub async fn start_debugging(
    context: &SessionContext,
    host: Arc<dyn EditorHost>,
    root: Option<&Path>,
) -> Result<CommandOutcome> {
    let root = require_root(root)?;
    let settings = context.settings(root).await?;
    let driver = launcher::resolve_driver(&settings)?;

    let configuration = match load_configuration(context, host.as_ref(), root).await? {
        Loaded::Configuration(configuration) => configuration,
        Loaded::Generated(path) => return Ok(CommandOutcome::ConfigurationCreated(path)),
    };

    let report = launcher::launch(context, host, root, driver, &configuration).await?;
    Ok(CommandOutcome::Launched(report))
}

/// Run a command by its host id
pub async fn execute(
    context: &SessionContext,
    host: Arc<dyn EditorHost>,
    root: Option<&Path>,
    command: &str,
) -> Result<Option<CommandOutcome>> {
    log::debug!("Executing command {}", command);
    match command {
        COMMAND_START => start_debugging(context, host, root).await.map(Some),
        COMMAND_START_WITHOUT_DEBUGGING => start_without_debugging(context, host.as_ref(), root)
            .await
            .map(Some),
        COMMAND_GENERATE => generate_configuration(context, host.as_ref(), root)
            .await
            .map(|path| Some(CommandOutcome::Generated(path))),
        other => {
            log::warn!("Unknown command '{}'", other);
            Ok(None)
        }
    }
}

/// Surface a command failure to the user
pub async fn report(host: &dyn EditorHost, error: &DebugError) {
    let level = match error {
        DebugError::RendererNotFound { .. } => {
            // no renderer installed: the command is a silent no-op
            log::warn!("{}", error);
            return;
        }
        DebugError::NoWorkspaceOpen | DebugError::ConfigurationMissing { .. } => {
            MessageLevel::Warning
        }
        _ => MessageLevel::Error,
    };
    host.show_message(level, error.to_string()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CONFIGURATION_NAME, SettingsOverrides};
    use crate::test_support::RecordingHost;

    #[tokio::test]
    async fn test_commands_need_a_workspace() {
        let context = SessionContext::new(SettingsOverrides::default());
        let host = Arc::new(RecordingHost::default());

        let err = execute(&context, host.clone(), None, COMMAND_GENERATE)
            .await
            .unwrap_err();
        assert!(matches!(err, DebugError::NoWorkspaceOpen));

        report(host.as_ref(), &err).await;
        let messages = host.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, MessageLevel::Warning);
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let root = tempfile::tempdir().unwrap();
        let context = SessionContext::new(SettingsOverrides::default());
        let host = Arc::new(RecordingHost::default());

        let outcome = execute(&context, host, Some(root.path()), "other.command")
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_missing_renderer_is_silent() {
        let host = RecordingHost::default();
        report(&host, &DebugError::RendererNotFound { name: "driver".into() }).await;
        assert!(host.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_without_configuration_generates_one() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.md"), "# A").unwrap();
        let context = SessionContext::new(SettingsOverrides::default());
        let host = Arc::new(RecordingHost::default());

        let outcome = start_without_debugging(&context, host.as_ref(), Some(root.path()))
            .await
            .unwrap();
        let path = match outcome {
            CommandOutcome::ConfigurationCreated(path) => path,
            other => panic!("unexpected outcome {:?}", other),
        };

        assert!(path.is_file());
        assert!(!root.path().join("a.html").exists());
        assert_eq!(host.opened().await, vec![path]);
        let messages = host.messages().await;
        assert_eq!(messages[0], (MessageLevel::Info, EDIT_CONFIGURATION_HINT.to_string()));
    }

    #[tokio::test]
    async fn test_start_with_malformed_configuration_renders_nothing() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.md"), "# A").unwrap();
        let path = ConfigurationStore::new(DEFAULT_CONFIGURATION_NAME)
            .locate(root.path())
            .await
            .unwrap();
        std::fs::write(&path, "{ \"testDataSet\": [ \"a.md\" ").unwrap();
        let context = SessionContext::new(SettingsOverrides::default());
        let host = Arc::new(RecordingHost::default());

        let err = start_without_debugging(&context, host.as_ref(), Some(root.path()))
            .await
            .unwrap_err();

        assert!(matches!(err, DebugError::ConfigurationMalformed { .. }), "{:?}", err);
        assert!(!root.path().join("a.html").exists());
        assert!(host.opened().await.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ \"testDataSet\": [ \"a.md\" ");

        report(host.as_ref(), &err).await;
        let messages = host.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, MessageLevel::Error);
    }
}
