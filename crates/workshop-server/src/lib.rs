//! Development server with live reload for workshop sites.
//!
//! Builds the site, serves the output directory, rebuilds when sources
//! change and tells connected browsers to reload over a WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, SourceChange, SourceKind, SourceRoots};
pub use websocket::{reload_client_script, ReloadHub, ReloadMessage};
