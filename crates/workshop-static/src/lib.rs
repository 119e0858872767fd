//! Static builder for workshop sites.
//!
//! Renders Markdown pages into numbered HTML fragments, writes the titles
//! manifest and the shell page that loads the viewer.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
