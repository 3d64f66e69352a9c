//! Configuration Store
//!
//! Locating, generating, reading and writing the debug configuration file.

pub mod jsonc;
pub mod schema;
pub mod store;

pub use schema::{DebugConfiguration, MarkdownOptions, PluginEntry, SessionOptions};
pub use store::{ConfigurationStore, Generated, SETTINGS_DIR, parse_configuration, to_pretty_json};
