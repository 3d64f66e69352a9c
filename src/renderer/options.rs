//! Mapping from configured renderer flags to comrak options.

use comrak::options::Options;

use crate::configuration::MarkdownOptions;

use super::quotes::CURLY_QUOTES;

/// Effective renderer options for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub html: bool,
    pub linkify: bool,
    pub breaks: bool,
    pub typographer: bool,
    pub quotes: String,
    /// Always true: downstream HTML consumers require XHTML output
    pub xhtml_out: bool,
}

impl RenderOptions {
    /// Merge configured flags, then force `xhtml_out`
    pub fn from_configuration(options: &MarkdownOptions) -> Self {
        if options.xhtml_out == Some(false) {
            log::debug!("Ignoring configured xhtmlOut=false; XHTML output is always enabled");
        }
        for key in options.extra.keys() {
            log::debug!("Renderer option '{}' is not supported and was ignored", key);
        }

        Self {
            html: options.html,
            linkify: options.linkify,
            breaks: options.breaks,
            typographer: options.typographer,
            quotes: options.quotes.clone(),
            // applied after the merge, never overridable
            xhtml_out: true,
        }
    }

    pub(crate) fn to_comrak(&self) -> Options<'static> {
        let mut options = Options::default();

        options.extension.autolink = self.linkify;
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.parse.smart = self.typographer;

        let render = &mut options.render;
        render.hardbreaks = self.breaks;
        render.r#unsafe = self.html;
        render.escape = !self.html;

        options
    }

    /// Quote characters to put in place of comrak's curly quotes, if any
    pub(crate) fn custom_quotes(&self) -> Option<[char; 4]> {
        if !self.typographer {
            return None;
        }
        let quotes: [char; 4] = self.quotes.chars().collect::<Vec<_>>().try_into().ok()?;
        (quotes != CURLY_QUOTES).then_some(quotes)
    }
}
