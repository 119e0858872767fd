//! Client-side core of the workshop viewer.
//!
//! Route parsing, menu and page rendering, and the navigation state machine
//! are plain Rust and run anywhere. The `web` module binds them to a browser
//! page when compiled for `wasm32`.

pub mod manifest;
pub mod menu;
pub mod page;
pub mod route;
pub mod shell;
pub mod templates;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use manifest::{page_file_name, Manifest, ManifestError, MANIFEST_FILE};
pub use menu::{Control, MenuItem, MenuView, Placement};
pub use page::{PageContent, ScrollTarget};
pub use route::{Route, RouteState, INVALID_INDEX, START_HASH};
pub use shell::{Effect, Event, FetchError, PageTicket, Viewer};
pub use templates::TemplateEngine;
