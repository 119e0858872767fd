//! The titles manifest shared by the build pipeline and the viewer.

use serde::{Deserialize, Serialize};

/// File name of the manifest, relative to the shell page.
pub const MANIFEST_FILE: &str = "pages.json";

/// File name of the fragment for a page index.
pub fn page_file_name(index: usize) -> String {
    format!("{}.html", index)
}

/// Ordered page titles. The position of a title is the page's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    titles: Vec<String>,
}

impl Manifest {
    /// Create a manifest from titles in page order.
    pub fn new(titles: Vec<String>) -> Self {
        Self { titles }
    }

    /// Parse the JSON array served as `pages.json`.
    pub fn from_json(source: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(source).map_err(|e| ManifestError::InvalidJson(e.to_string()))
    }

    /// Serialize as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(|e| ManifestError::InvalidJson(e.to_string()))
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Title of the page at `index`, if it exists.
    pub fn title(&self, index: usize) -> Option<&str> {
        self.titles.get(index).map(String::as_str)
    }

    /// Whether `index` addresses an existing page.
    pub fn contains(&self, index: i64) -> bool {
        usize::try_from(index).is_ok_and(|i| i < self.titles.len())
    }

    /// Whether `index` is the final page.
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.titles.len()
    }
}

/// Errors that can occur reading or writing the manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Invalid pages JSON: {0}")]
    InvalidJson(String),
}
