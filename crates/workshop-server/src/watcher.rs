//! Source watching for the dev server.
//!
//! Notify events are classified against the two source roots of a workshop
//! (the pages directory and the resources directory) and coalesced into one
//! [`SourceChange`] per burst, so an editor save triggers a single rebuild.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period that ends a burst of file events.
const SETTLE: Duration = Duration::from_millis(100);

/// Roots the dev server rebuilds from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoots {
    /// Markdown pages, one level deep
    pub pages: PathBuf,
    /// Images and other files copied to `res/`
    pub resources: Option<PathBuf>,
}

/// What a changed path is to the workshop build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A page; the manifest may change
    Page,
    /// A copied resource
    Resource,
}

/// Changes seen during one burst.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceChange {
    pub pages: Vec<PathBuf>,
    pub resources: Vec<PathBuf>,
}

impl SourceChange {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.resources.is_empty()
    }

    fn record(&mut self, kind: SourceKind, path: PathBuf) {
        let list = match kind {
            SourceKind::Page => &mut self.pages,
            SourceKind::Resource => &mut self.resources,
        };
        if !list.contains(&path) {
            list.push(path);
        }
    }
}

/// File watcher over the workshop sources.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `roots`, returning the watcher and a channel of coalesced changes.
    pub fn new(
        roots: SourceRoots,
    ) -> Result<(Self, async_mpsc::Receiver<SourceChange>), std::io::Error> {
        // Event paths are absolute.
        let roots = SourceRoots {
            pages: absolute(roots.pages),
            resources: roots.resources.map(absolute),
        };

        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(16);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in std::iter::once(&roots.pages).chain(roots.resources.iter()) {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            } else {
                tracing::warn!("Not watching missing path {}", path.display());
            }
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                let mut change = SourceChange::default();
                let mut next = Some(first);

                while let Some(event) = next.take() {
                    for path in event.paths {
                        if let Some(kind) = classify(&roots, &path, &event.kind) {
                            change.record(kind, path);
                        }
                    }
                    match sync_rx.recv_timeout(SETTLE) {
                        Ok(event) => next = Some(event),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }

                if !change.is_empty() && async_tx.blocking_send(change).is_err() {
                    return;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}

/// Classify one changed path, or `None` when the build does not read it.
fn classify(roots: &SourceRoots, path: &Path, kind: &EventKind) -> Option<SourceKind> {
    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    let name = path.file_name()?.to_str()?;
    // Swap and backup files written next to the real one.
    if name.starts_with('.') || name.ends_with('~') {
        return None;
    }

    if let Some(resources) = &roots.resources {
        if path.starts_with(resources) {
            return Some(SourceKind::Resource);
        }
    }

    // Only direct children of the pages directory become pages.
    let is_page = path.parent() == Some(roots.pages.as_path())
        && matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("md") | Some("mdx")
        );
    is_page.then_some(SourceKind::Page)
}
