//! Configured typographer quotes.
//!
//! comrak's smart punctuation only knows curly quotes. Curly quotes already
//! written in the source are parked on private-use characters before parsing,
//! so every curly quote left in a text node afterwards came from the
//! typographer and can take the configured character.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, format_html, parse_document};

/// Curly quotes comrak emits for smart punctuation
pub(crate) const CURLY_QUOTES: [char; 4] = ['\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

/// Private-use characters standing in for the source's own curly quotes
struct Parking {
    slots: [char; 4],
}

impl Parking {
    /// Pick four private-use characters the source does not contain
    fn for_source(source: &str) -> Option<Self> {
        let mut free = ('\u{e000}'..='\u{f8ff}').filter(|c| !source.contains(*c));
        Some(Self {
            slots: [free.next()?, free.next()?, free.next()?, free.next()?],
        })
    }

    fn park(&self, source: &str) -> String {
        swap(source, &CURLY_QUOTES, &self.slots)
    }

    fn restore(&self, text: &str) -> String {
        swap(text, &self.slots, &CURLY_QUOTES)
    }

    /// Typographer quotes become `quotes`, parked ones go back to curly
    fn requote(&self, text: &str, quotes: &[char; 4]) -> String {
        text.chars()
            .map(|c| {
                if let Some(index) = CURLY_QUOTES.iter().position(|&q| q == c) {
                    quotes[index]
                } else if let Some(index) = self.slots.iter().position(|&s| s == c) {
                    CURLY_QUOTES[index]
                } else {
                    c
                }
            })
            .collect()
    }

    fn rewrite<'a>(&self, root: &'a AstNode<'a>, quotes: &[char; 4]) {
        for node in root.descendants() {
            let mut data = node.data_mut();
            match &mut data.value {
                NodeValue::Text(text) => {
                    let requoted = self.requote(text, quotes);
                    *text = requoted.into();
                }
                NodeValue::Code(code) => code.literal = self.restore(&code.literal),
                NodeValue::CodeBlock(block) => {
                    block.info = self.restore(&block.info);
                    block.literal = self.restore(&block.literal);
                }
                NodeValue::HtmlBlock(block) => block.literal = self.restore(&block.literal),
                NodeValue::HtmlInline(literal)
                | NodeValue::Raw(literal)
                | NodeValue::FrontMatter(literal) => *literal = self.restore(literal),
                NodeValue::Link(link) | NodeValue::Image(link) => {
                    link.url = self.restore(&link.url);
                    link.title = self.restore(&link.title);
                }
                _ => {}
            }
        }
    }
}

fn swap(text: &str, from: &[char; 4], to: &[char; 4]) -> String {
    text.chars()
        .map(|c| match from.iter().position(|&f| f == c) {
            Some(index) => to[index],
            None => c,
        })
        .collect()
}

/// Render `source`, giving typographer quotes the characters in `quotes`
pub(crate) fn render_with_quotes(
    source: &str,
    options: &Options<'_>,
    quotes: &[char; 4],
) -> Result<String, String> {
    let Some(parking) = Parking::for_source(source) else {
        log::debug!("No free private-use characters, keeping comrak's quotes");
        return Ok(comrak::markdown_to_html(source, options));
    };

    let parked = parking.park(source);
    let arena = Arena::new();
    let root = parse_document(&arena, &parked, options);
    parking.rewrite(root, quotes);

    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|e| format!("HTML output failed: {}", e))?;
    Ok(html)
}
