//! Comment stripping for JSON configuration files.
//!
//! `//` line comments and `/* */` block comments are blanked out with spaces
//! so that parse errors still point at the right line and column. Comment
//! markers inside string literals are left alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"(?:[^"\\]|\\.)*"|//[^\n]*|/\*.*?\*/"#).expect("comment pattern is valid")
});

/// Remove comments from JSON text, preserving string contents and layout
pub fn strip_comments(input: &str) -> String {
    TOKEN_RE
        .replace_all(input, |caps: &Captures| {
            let token = &caps[0];
            if token.starts_with('"') {
                token.to_string()
            } else {
                blank_out(token)
            }
        })
        .into_owned()
}

fn blank_out(comment: &str) -> String {
    comment
        .chars()
        .map(|c| if c == '\n' || c == '\r' { c } else { ' ' })
        .collect()
}
