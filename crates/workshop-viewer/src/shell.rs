//! Viewer state machine.
//!
//! [`Viewer`] owns the route, the manifest and the page request bookkeeping.
//! The host feeds it [`Event`]s (mount, fragment changes, fetch completions)
//! and applies the [`Effect`]s it returns, in order. The viewer never touches
//! the URL itself; [`Effect::Navigate`] is the only way it moves.

use crate::manifest::{page_file_name, Manifest, MANIFEST_FILE};
use crate::menu::MenuView;
use crate::page::{PageContent, ScrollTarget};
use crate::route::{Route, RouteState, START_HASH};
use crate::templates::TemplateEngine;

/// A page request. Only the most recently issued ticket may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    /// Page index being fetched
    pub index: usize,
    /// Issue order, strictly increasing per viewer
    pub seq: u64,
}

impl PageTicket {
    /// Fragment path relative to the shell page.
    pub fn url(&self) -> String {
        page_file_name(self.index)
    }
}

/// Errors reported by the host for a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("{0}")]
    Network(String),
}

/// Inputs to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The shell page finished loading with this location hash
    Mounted { hash: String },

    /// The location hash changed (link click, back/forward, redirect)
    HashChanged { hash: String },

    /// The manifest request completed
    ManifestFetched(Result<String, FetchError>),

    /// A page request completed
    PageFetched {
        ticket: PageTicket,
        result: Result<String, FetchError>,
    },
}

/// Work for the host, applied in the order returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Request [`MANIFEST_FILE`] and report back with [`Event::ManifestFetched`]
    FetchManifest,

    /// Request the ticket's fragment and report back with [`Event::PageFetched`]
    FetchPage(PageTicket),

    /// Replace the location hash
    Navigate(String),

    /// Show a blocking message
    Alert(String),

    /// Replace the menu pane markup
    RenderMenu(String),

    /// Clear the page pane, insert the content, then highlight its code blocks
    RenderPage(PageContent),

    /// Scroll the page pane
    Scroll(ScrollTarget),
}

/// Navigation core of the viewer.
pub struct Viewer {
    title: String,
    route: RouteState,
    manifest: Option<Manifest>,
    latest: Option<PageTicket>,
    next_seq: u64,
    templates: TemplateEngine,
}

impl Viewer {
    /// Create a viewer for a workshop titled `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            route: RouteState::default(),
            manifest: None,
            latest: None,
            next_seq: 0,
            templates: TemplateEngine::new(),
        }
    }

    pub fn route(&self) -> &RouteState {
        &self.route
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Ticket of the page request allowed to render next.
    pub fn pending(&self) -> Option<PageTicket> {
        self.latest
    }

    /// Process one event.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            Event::Mounted { hash } => {
                tracing::debug!("Mounted at {:?}, fetching {}", hash, MANIFEST_FILE);
                effects.push(Effect::FetchManifest);
                self.apply_hash(&hash, true, &mut effects);
            }
            Event::HashChanged { hash } => {
                self.apply_hash(&hash, false, &mut effects);
            }
            Event::ManifestFetched(result) => {
                self.apply_manifest(result, &mut effects);
            }
            Event::PageFetched { ticket, result } => {
                self.apply_page(ticket, result, &mut effects);
            }
        }

        effects
    }

    fn apply_hash(&mut self, hash: &str, initial: bool, effects: &mut Vec<Effect>) {
        let state = match Route::parse(hash) {
            Route::Root => {
                effects.push(Effect::Navigate(START_HASH.to_string()));
                return;
            }
            Route::Page(state) => state,
        };

        let index_changed = initial || state.index != self.route.index;
        let anchor_changed = state.anchor != self.route.anchor;
        self.route = state;

        if index_changed {
            effects.extend(self.menu());
            self.sync_page(effects);
        } else if anchor_changed {
            effects.push(Effect::Scroll(ScrollTarget::for_anchor(
                self.route.anchor.as_deref(),
            )));
        }
    }

    fn apply_manifest(&mut self, result: Result<String, FetchError>, effects: &mut Vec<Effect>) {
        if self.manifest.is_some() {
            tracing::warn!("Ignoring repeated manifest delivery");
            return;
        }

        let manifest = match result {
            Ok(source) => Manifest::from_json(&source).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match manifest {
            Ok(manifest) => {
                tracing::debug!("Loaded manifest with {} pages", manifest.len());
                self.manifest = Some(manifest);
                effects.extend(self.menu());
                self.sync_page(effects);
            }
            Err(reason) => {
                tracing::error!("Could not get {}: {}", MANIFEST_FILE, reason);
                effects.push(Effect::Alert(format!(
                    "Could not get pages JSON: {}",
                    reason
                )));
            }
        }
    }

    fn apply_page(
        &mut self,
        ticket: PageTicket,
        result: Result<String, FetchError>,
        effects: &mut Vec<Effect>,
    ) {
        if self.latest != Some(ticket) {
            tracing::debug!(
                "Discarding stale response for page {} (seq {})",
                ticket.index,
                ticket.seq
            );
            return;
        }

        let source = match result {
            Ok(source) => source,
            Err(e) => {
                tracing::error!("Could not get page {}: {}", ticket.index, e);
                effects.push(Effect::Alert(format!(
                    "Could not get page {} : {}",
                    ticket.index, e
                )));
                return;
            }
        };

        let Some(manifest) = &self.manifest else {
            return;
        };

        match PageContent::build(&source, ticket.index, manifest, &self.templates) {
            Ok(content) => {
                effects.push(Effect::RenderPage(content));
                effects.push(Effect::Scroll(ScrollTarget::for_anchor(
                    self.route.anchor.as_deref(),
                )));
            }
            Err(e) => {
                tracing::error!("Failed to render page {}: {}", ticket.index, e);
                effects.push(Effect::Alert(format!(
                    "Could not get page {} : {}",
                    ticket.index, e
                )));
            }
        }
    }

    /// Redirect or request the page once both route and manifest are known.
    fn sync_page(&mut self, effects: &mut Vec<Effect>) {
        let Some(manifest) = &self.manifest else {
            return;
        };

        if self.route.needs_redirect(manifest) {
            tracing::debug!("Index {} out of range, redirecting", self.route.index);
            effects.push(Effect::Navigate(START_HASH.to_string()));
            return;
        }

        if let Some(index) = self.route.page(manifest) {
            let ticket = PageTicket {
                index,
                seq: self.next_seq,
            };
            self.next_seq += 1;
            self.latest = Some(ticket);
            effects.push(Effect::FetchPage(ticket));
        }
    }

    fn menu(&self) -> Option<Effect> {
        let titles = self.manifest.as_ref().map(Manifest::titles).unwrap_or(&[]);
        let view = MenuView::new(&self.title, self.route.index, titles);

        match self.templates.render_menu(&view) {
            Ok(html) => Some(Effect::RenderMenu(html)),
            Err(e) => {
                tracing::error!("Failed to render menu: {}", e);
                None
            }
        }
    }
}
