//! Route state derived from the URL fragment.
//!
//! The fragment is the single source of truth for the viewer position:
//! `#/{index}` selects a page, `#/{index}/{anchor}` also names an element to
//! scroll to. Anything that does not parse as an integer index becomes
//! [`INVALID_INDEX`] and is healed to page 0 once the manifest is known.

use percent_encoding::percent_decode_str;

use crate::manifest::Manifest;

/// Sentinel index for a missing or malformed index segment.
pub const INVALID_INDEX: i64 = -1;

/// Fragment every bad or empty route is redirected to.
pub const START_HASH: &str = "#/0";

/// Parsed URL fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `#/` or no fragment at all
    Root,
    /// `#/{index}` with an optional `/{anchor}`
    Page(RouteState),
}

/// Current page index and optional in-page anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteState {
    /// Page index, [`INVALID_INDEX`] when the segment is not an integer
    pub index: i64,
    /// Element id inside the page
    pub anchor: Option<String>,
}

impl RouteState {
    pub fn new(index: i64, anchor: Option<String>) -> Self {
        Self { index, anchor }
    }

    /// The index as a page position, if it lies inside the manifest.
    pub fn page(&self, manifest: &Manifest) -> Option<usize> {
        if manifest.contains(self.index) {
            usize::try_from(self.index).ok()
        } else {
            None
        }
    }

    /// Whether this route must be rewritten to [`START_HASH`].
    ///
    /// An empty manifest means it has not arrived yet, so nothing is
    /// redirected until there is something to validate against.
    pub fn needs_redirect(&self, manifest: &Manifest) -> bool {
        !manifest.is_empty() && !manifest.contains(self.index)
    }
}

impl Default for RouteState {
    fn default() -> Self {
        Self::new(INVALID_INDEX, None)
    }
}

impl Route {
    /// Parse a location hash such as `#/3/setup`.
    pub fn parse(hash: &str) -> Self {
        let path = hash.strip_prefix('#').unwrap_or(hash);
        let path = path.strip_prefix('/').unwrap_or(path);

        if path.is_empty() {
            return Self::Root;
        }

        let (index, anchor) = match path.split_once('/') {
            Some((index, anchor)) => (index, Some(anchor)),
            None => (path, None),
        };

        let index = index.parse::<i64>().unwrap_or(INVALID_INDEX);
        // Browsers report the hash percent-encoded; heading ids are not.
        let anchor = anchor
            .filter(|a| !a.is_empty())
            .map(|a| percent_decode_str(a).decode_utf8_lossy().into_owned());

        Self::Page(RouteState::new(index, anchor))
    }
}

/// Fragment for a page, as rendered into links.
pub fn page_href(index: usize) -> String {
    format!("#/{}", index)
}

/// Fragment for an anchor inside a page.
pub fn anchor_href(index: usize, anchor: &str) -> String {
    format!("#/{}/{}", index, anchor)
}
