//! Custom `markdownDebug/*` protocol extensions.
//!
//! The preview viewer and the debugger live in the editor, so both are
//! reached through messages the editor-side client understands.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Url;
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::request::Request;

use crate::launcher::LaunchDescriptor;

/// Client → server: current preview content (`null` when there is none)
pub const PREVIEW_CONTENT_METHOD: &str = "markdownDebug/previewContent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewContentParams {
    pub uri: Url,
}

/// Server → client: open the read-only preview
#[derive(Debug)]
pub enum ShowPreview {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowPreviewParams {
    pub uri: Url,
    pub title: String,
}

impl Notification for ShowPreview {
    type Params = ShowPreviewParams;
    const METHOD: &'static str = "markdownDebug/showPreview";
}

/// Server → client: the preview content changed, request it again
#[derive(Debug)]
pub enum PreviewChanged {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewChangedParams {
    pub uri: Url,
}

impl Notification for PreviewChanged {
    type Params = PreviewChangedParams;
    const METHOD: &'static str = "markdownDebug/previewChanged";
}

/// Server → client: start the debugger with a launch descriptor.
/// The client answers whether a session was started.
#[derive(Debug)]
pub enum LaunchDebugger {}

impl Request for LaunchDebugger {
    type Params = LaunchDescriptor;
    type Result = bool;
    const METHOD: &'static str = "markdownDebug/launch";
}
