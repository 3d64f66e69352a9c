//! Renderer Adapter
//!
//! Builds a comrak-backed Markdown renderer from a debug configuration and
//! attaches plugins. A plugin that cannot be attached is recorded and
//! skipped; the renderer keeps every plugin that did attach.

pub mod options;
pub mod plugin;
mod quotes;

use std::fmt;
use std::path::Path;

use crate::configuration::{MarkdownOptions, PluginEntry};
use crate::error::PluginLoadError;

pub use options::RenderOptions;
pub use plugin::{Plugin, ProcessPlugin, Stage};

/// A configured renderer plus the plugins attached to it
pub struct RendererHandle {
    options: RenderOptions,
    comrak: comrak::Options<'static>,
    plugins: Vec<Box<dyn Plugin>>,
    errors: Vec<PluginLoadError>,
}

impl fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererHandle")
            .field("options", &self.options)
            .field("plugins", &self.plugin_names())
            .field("errors", &self.errors)
            .finish()
    }
}

/// Build a renderer from configured options and plugins.
///
/// Every enabled plugin is resolved under `root` and attached in order.
/// Failures are collected on the handle and never abort construction.
pub async fn build(
    options: &MarkdownOptions,
    plugins: &[PluginEntry],
    root: &Path,
) -> RendererHandle {
    let mut handle = RendererHandle::new(RenderOptions::from_configuration(options));

    for entry in plugins.iter().filter(|entry| entry.enabled) {
        match ProcessPlugin::load(root, entry).await {
            Ok(plugin) => {
                log::debug!(
                    "Attached plugin '{}' ({})",
                    plugin.name(),
                    plugin.executable().display()
                );
                handle.attach(Box::new(plugin));
            }
            Err(message) => {
                let error = PluginLoadError {
                    path: entry.path.clone(),
                    message,
                };
                log::warn!("{}", error);
                handle.errors.push(error);
            }
        }
    }

    handle
}

impl RendererHandle {
    /// A renderer with no plugins attached
    pub fn new(options: RenderOptions) -> Self {
        let comrak = options.to_comrak();
        Self {
            options,
            comrak,
            plugins: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn attach(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Per-plugin attachment failures, in configured order
    pub fn errors(&self) -> &[PluginLoadError] {
        &self.errors
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    /// Render Markdown to HTML through the attached plugins.
    ///
    /// A plugin failing at this point fails the document, like an exception
    /// thrown from inside the renderer would.
    pub async fn render(&self, text: &str) -> Result<String, String> {
        let source = self.run_stage(Stage::Markdown, text.to_string()).await?;
        let html = match self.options.custom_quotes() {
            Some(quotes) => quotes::render_with_quotes(&source, &self.comrak, &quotes)?,
            None => comrak::markdown_to_html(&source, &self.comrak),
        };
        self.run_stage(Stage::Html, html).await
    }

    async fn run_stage(&self, stage: Stage, mut content: String) -> Result<String, String> {
        for plugin in self.plugins.iter().filter(|plugin| plugin.handles(stage)) {
            content = plugin
                .apply(stage, &content)
                .await
                .map_err(|e| format!("plugin '{}': {}", plugin.name(), e))?;
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shout;

    #[tower_lsp::async_trait]
    impl Plugin for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn handles(&self, stage: Stage) -> bool {
            stage == Stage::Markdown
        }

        async fn apply(&self, _stage: Stage, input: &str) -> Result<String, String> {
            Ok(input.to_uppercase())
        }
    }

    struct Broken;

    #[tower_lsp::async_trait]
    impl Plugin for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn handles(&self, _stage: Stage) -> bool {
            true
        }

        async fn apply(&self, _stage: Stage, _input: &str) -> Result<String, String> {
            Err("boom".to_string())
        }
    }

    #[tokio::test]
    async fn test_render_produces_xhtml() {
        let handle = build(&MarkdownOptions::default(), &[], Path::new(".")).await;
        assert!(handle.options().xhtml_out);

        let html = handle.render("line\n\n---\n").await.unwrap();
        assert!(html.contains("<p>line</p>"));
        assert!(html.contains("<hr />"));
    }

    #[tokio::test]
    async fn test_in_process_plugin_runs_before_rendering() {
        let mut handle = RendererHandle::new(RenderOptions::from_configuration(
            &MarkdownOptions::default(),
        ));
        handle.attach(Box::new(Shout));

        assert_eq!(handle.render("hello").await.unwrap(), "<p>HELLO</p>\n");
    }

    #[tokio::test]
    async fn test_failing_plugin_fails_the_render() {
        let mut handle = RendererHandle::new(RenderOptions::from_configuration(
            &MarkdownOptions::default(),
        ));
        handle.attach(Box::new(Broken));

        let err = handle.render("hello").await.unwrap_err();
        assert!(err.contains("broken"));
        assert!(err.contains("boom"));
    }

    #[tokio::test]
    async fn test_disabled_and_missing_plugins() {
        let root = tempfile::tempdir().unwrap();
        let mut disabled = PluginEntry::new("disabled");
        disabled.enabled = false;

        let handle = build(
            &MarkdownOptions::default(),
            &[disabled, PluginEntry::new("missing")],
            root.path(),
        )
        .await;

        assert!(handle.plugin_names().is_empty());
        assert_eq!(handle.errors().len(), 1);
        assert_eq!(handle.errors()[0].path, "missing");
    }

    #[tokio::test]
    async fn test_raw_html_escaped_when_disabled() {
        let options = MarkdownOptions {
            html: false,
            ..MarkdownOptions::default()
        };
        let handle = build(&options, &[], Path::new(".")).await;
        let html = handle.render("<b>bold</b>").await.unwrap();
        assert!(html.contains("&lt;b&gt;"));
    }

    #[tokio::test]
    async fn test_literal_curly_quotes_survive_default_quotes() {
        let handle = build(&MarkdownOptions::default(), &[], Path::new(".")).await;
        let html = handle
            .render("`let s = “x”;`\n\nLiteral ‘a’ and \"smart\"")
            .await
            .unwrap();

        assert!(html.contains("<code>let s = \u{201c}x\u{201d};</code>"), "{}", html);
        assert!(html.contains("Literal \u{2018}a\u{2019}"), "{}", html);
        assert!(html.contains("&quot;smart&quot;"), "{}", html);
    }
}
