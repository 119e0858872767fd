//! Page document parser for workshop sources.
//!
//! Reads Markdown pages with optional YAML frontmatter, resolves the menu
//! title and renders the body with stable heading anchors.

pub mod frontmatter;
pub mod parser;

pub use frontmatter::Frontmatter;
pub use parser::{parse_document, slugify, ParseError, ParsedDoc, TocEntry};
