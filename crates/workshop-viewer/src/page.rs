//! Page fragment transform.
//!
//! A fetched fragment is a standalone HTML document. Only its body is shown,
//! with in-page links routed through the viewer's own fragment scheme and
//! every other link opened in a new browsing context.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::manifest::Manifest;
use crate::route::anchor_href;
use crate::templates::TemplateEngine;

static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").expect("Invalid body regex")
});

static DOCUMENT_CHROME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!doctype[^>]*>|<head\b.*?</head\s*>|</?html\b[^>]*>")
        .expect("Invalid document chrome regex")
});

// Attribute values may contain `>` or text like `href=`, so both patterns
// consume quoted values whole.
static ANCHOR_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<a(?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*\s*/?>"#,
    )
    .expect("Invalid anchor tag regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("Invalid attribute regex")
});

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<pre\b[^>]*>\s*<code\b").expect("Invalid code regex"));

/// Transformed page, ready to replace the page pane wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Page index the content was loaded for
    pub index: usize,
    /// Body markup with rewritten links and the optional next affordance
    pub html: String,
    /// Number of `pre code` blocks handed to the highlighter after rendering
    pub code_blocks: usize,
}

impl PageContent {
    /// Build the content for page `index` from its fetched fragment.
    pub fn build(
        source: &str,
        index: usize,
        manifest: &Manifest,
        templates: &TemplateEngine,
    ) -> Result<Self, minijinja::Error> {
        let mut html = rewrite_links(&extract_body(source), index);
        let code_blocks = CODE_BLOCK.find_iter(&html).count();

        if !manifest.is_last(index) {
            if let Some(title) = manifest.title(index + 1) {
                html.push('\n');
                html.push_str(&templates.render_next(index + 1, title)?);
            }
        }

        Ok(Self {
            index,
            html,
            code_blocks,
        })
    }
}

/// Where the page pane should be scrolled after a load or an anchor change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Bring the element with this id into view
    Anchor(String),
    /// Reset the pane to the top
    Top,
}

impl ScrollTarget {
    pub fn for_anchor(anchor: Option<&str>) -> Self {
        match anchor {
            Some(id) => Self::Anchor(id.to_string()),
            None => Self::Top,
        }
    }
}

/// Inner markup of the fragment's `<body>`.
///
/// Fragments without a body element are treated as body content once the
/// doctype, `<head>` and `<html>` wrappers are removed.
pub fn extract_body(source: &str) -> Cow<'_, str> {
    match BODY.captures(source).and_then(|c| c.get(1)) {
        Some(body) => Cow::Borrowed(body.as_str().trim()),
        None => Cow::Owned(DOCUMENT_CHROME.replace_all(source, "").trim().to_string()),
    }
}

/// Rewrite every `<a>` tag for display at page `index`.
pub fn rewrite_links(body: &str, index: usize) -> String {
    ANCHOR_TAG
        .replace_all(body, |caps: &Captures| rewrite_anchor(&caps[0], index))
        .into_owned()
}

fn rewrite_anchor(tag: &str, index: usize) -> String {
    // Skip the `<a` so attribute matching starts at the first separator.
    let attrs = &tag[2..];
    let href = ATTRIBUTE
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case("href"))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)));
    let Some(value) = href else {
        return tag.to_string();
    };

    match value.as_str().strip_prefix('#') {
        Some(anchor) => format!(
            "<a{}{}{}",
            &attrs[..value.start()],
            anchor_href(index, anchor),
            &attrs[value.end()..]
        ),
        None => {
            let mut out = String::from("<a");
            let mut last = 0;
            for caps in ATTRIBUTE.captures_iter(attrs) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                out.push_str(&attrs[last..whole.start()]);
                if !name.as_str().eq_ignore_ascii_case("target") {
                    out.push_str(whole.as_str());
                }
                last = whole.end();
            }

            let rest = &attrs[last..];
            let close = if rest.trim_start().starts_with("/>") { "/>" } else { ">" };
            out.push_str(" target=\"_blank\"");
            out.push_str(close);
            out
        }
    }
}
