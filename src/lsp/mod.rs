//! LSP Protocol Implementation
//!
//! Exposes the debug commands over `workspace/executeCommand` and the
//! preview through the `markdownDebug/*` extensions.

pub mod backend;
pub mod handlers;
pub mod host;
pub mod protocol;
pub mod server;

pub use backend::Backend;
pub use host::LspHost;
