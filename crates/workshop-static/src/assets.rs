//! Asset pipeline for the stylesheet and copied resources.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Copy every file under `from` into `to`, keeping relative paths.
    ///
    /// Returns the number of files copied.
    pub fn copy_dir(from: &Path, to: &Path) -> io::Result<usize> {
        let mut count = 0;

        for entry in WalkDir::new(from).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            let path = entry.path();
            let relative = path.strip_prefix(from).unwrap_or(path);
            let target = to.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &target)?;
                count += 1;
            }
        }

        Ok(count)
    }
}

// Two-pane layout: menu on the left, page on the right, each scrolling on its own.
const DEFAULT_CSS: &str = r#"/* Workshop viewer theme */

:root {
  --menu-width: 20em;
  --accent: #005580;
  --accent-hover: #078d71;
  --current: #00326b;
  --heading: #703f1c;
  --muted: gray;
  --content-max-width: 970px;
}

* {
  margin: 0;
  padding: 0;
}

html,
body {
  height: 100%;
}

body {
  font-family: 'Open Sans', sans-serif;
}

h1 {
  font-family: 'Varela Round', sans-serif;
}

a {
  text-decoration: none;
}

.workshop {
  display: flex;
  flex-direction: row;
  height: 100%;
}

/* Menu */
.menu {
  background-color: white;
  box-shadow: 0 0 6px 1px var(--muted);
  z-index: 1;
  width: var(--menu-width);
  display: flex;
  flex-direction: column;
}

.menu h1 {
  margin: 1em 0.5em;
  color: var(--heading);
  text-align: center;
}

.menu ul {
  flex-grow: 1;
  overflow: auto;
  font-family: 'Varela Round', sans-serif;
  list-style-type: none;
}

.menu ul a {
  padding: 0.5em;
  display: flex;
  align-items: center;
}

.menu ul a span.index {
  display: inline-flex;
  align-items: center;
  justify-content: center;
  color: white;
  background-color: rgba(0, 0, 0, 0.8);
  border-radius: 50%;
  width: 1.67em;
  height: 1.67em;
  font-weight: bold;
  margin-right: 0.5em;
  flex-shrink: 0;
}

.menu ul a span.title {
  display: inline-block;
}

.menu ul a.past span.index {
  background-color: var(--muted);
}

.menu ul a.past span.title {
  color: var(--muted);
}

.menu ul a.current {
  font-weight: bold;
  background-color: var(--current);
}

.menu ul a.current span.index {
  color: var(--current);
  background-color: white;
}

.menu ul a.current span.title {
  color: white;
}

.menu ul a.future span.index {
  background-color: var(--accent);
}

.menu ul a.future span.title {
  color: var(--accent);
}

.menu ul a.current:hover {
  cursor: default;
}

.menu ul a.link:hover {
  cursor: pointer;
}

.menu ul a.link:hover span.index {
  background-color: var(--accent-hover);
}

.menu ul a.link:hover span.title {
  color: var(--accent-hover);
}

/* Back / Next */
.menu .footer {
  display: flex;
  flex-direction: row;
  justify-content: space-around;
  font-weight: bold;
  margin: 2em 1em;
}

.menu .footer a {
  border-radius: 2px;
  box-shadow: 0 0 6px 1px var(--muted);
  padding: 0.4em 1.5em;
  cursor: pointer;
}

.menu .footer a.back {
  color: var(--accent);
}

.menu .footer a.back:hover {
  color: var(--accent-hover);
}

.menu .footer a.next {
  color: white;
  background-color: var(--accent);
}

.menu .footer a.next:hover {
  background-color: var(--accent-hover);
}

.menu .footer a.start,
.menu .footer a.end {
  cursor: default;
  opacity: 0.2;
}

.menu .footer a.back.start:hover {
  color: var(--accent);
}

.menu .footer a.next.end:hover {
  background-color: var(--accent);
}

/* Page */
.page {
  flex: 1;
  height: 100%;
  overflow: auto;
}

.article {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 2em 1em;
  line-height: 1.6;
}

.article h1,
.article h2,
.article h3 {
  margin: 1.5em 0 0.75em;
  position: relative;
}

.article p,
.article ul,
.article ol,
.article pre,
.article table {
  margin-bottom: 1em;
}

.article ul,
.article ol {
  padding-left: 1.5em;
}

.article a {
  color: var(--accent);
}

.article a.anchor {
  position: absolute;
  left: -1em;
  width: 1em;
  visibility: hidden;
}

.article a.anchor::before {
  content: "\00A7";
}

.article h1:hover a.anchor,
.article h2:hover a.anchor,
.article h3:hover a.anchor {
  visibility: visible;
}

.article pre {
  background: #f7f7f8;
  border-radius: 4px;
  padding: 1em;
  overflow-x: auto;
  font-size: 0.875rem;
}

.article img {
  max-width: 100%;
}

/* Next page affordance */
.workshop-next {
  max-width: var(--content-max-width);
  margin: auto;
  display: flex;
  flex-direction: row;
  justify-content: flex-end;
}

.workshop-next a {
  max-width: 21em;
  background-color: var(--accent);
  color: white;
  box-shadow: 0 0 6px 1px var(--muted);
  border-radius: 2px;
  padding: 0.5em 1em;
  display: flex;
  flex-direction: row;
  align-items: center;
  margin: 0 1em 2em 0;
  font-family: 'Varela Round', sans-serif;
  font-weight: bold;
}

.workshop-next a span {
  display: inline-flex;
  align-items: center;
  justify-content: center;
  color: var(--accent);
  background-color: white;
  border-radius: 50%;
  width: 1.67em;
  height: 1.67em;
  font-weight: bold;
  margin-right: 0.5em;
  flex-shrink: 0;
}

.workshop-next a:hover {
  background-color: var(--accent-hover);
}

.workshop-next a:hover span {
  color: var(--accent-hover);
}
"#;
