//! Page document parser and renderer.

use std::collections::HashMap;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed page document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without frontmatter)
    pub content: String,

    /// Table of contents entries, in document order
    pub toc: Vec<TocEntry>,

    /// Rendered body markup
    pub html: String,
}

impl ParsedDoc {
    /// Menu title: frontmatter title, else the first top-level heading,
    /// else the first heading of any level.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.title.as_deref())
            .or_else(|| {
                self.toc
                    .iter()
                    .find(|e| e.level == 1)
                    .map(|e| e.title.as_str())
            })
            .or_else(|| self.toc.first().map(|e| e.title.as_str()))
    }

    pub fn description(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.description.as_deref())
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID, unique within the page
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Errors that can occur when parsing a page.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parse a page document.
///
/// Extracts frontmatter and the table of contents, then renders the body
/// with an id and a section anchor link on every heading.
pub fn parse_document(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let toc = collect_toc(content);
    let html = render_html(content, &toc);

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        toc,
        html,
    })
}

fn collect_toc(content: &str) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    // (level, explicit id, text)
    let mut current_heading: Option<(u8, Option<String>, String)> = None;

    for event in Parser::new_ext(content, options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current_heading = Some((level as u8, id.map(|i| i.to_string()), String::new()));
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, ref mut heading_text)) = current_heading {
                    heading_text.push_str(&text);
                }
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit, title)) = current_heading.take() {
                    let base = explicit.unwrap_or_else(|| slugify(&title));
                    let id = unique_id(base, &mut seen);
                    toc.push(TocEntry { title, id, level });
                }
            }

            _ => {}
        }
    }

    toc
}

fn render_html(content: &str, toc: &[TocEntry]) -> String {
    let mut headings = toc.iter();

    let events = Parser::new_ext(content, options()).flat_map(|event| match event {
        Event::Start(Tag::Heading {
            level,
            id: _,
            classes,
            attrs,
        }) => {
            let id = headings
                .next()
                .map(|e| e.id.clone())
                .unwrap_or_else(|| "section".to_string());
            let anchor = format!(r##"<a class="anchor" href="#{}"></a>"##, id);

            vec![
                Event::Start(Tag::Heading {
                    level,
                    id: Some(CowStr::from(id)),
                    classes,
                    attrs,
                }),
                Event::InlineHtml(CowStr::from(anchor)),
            ]
        }
        other => vec![other],
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, events);

    html_output
}

/// Pick an id not emitted yet. `seen` maps every emitted id to the last
/// suffix tried for it.
fn unique_id(base: String, seen: &mut HashMap<String, usize>) -> String {
    let mut suffix = seen.get(&base).copied().unwrap_or(0);
    let mut id = base.clone();
    while seen.contains_key(&id) {
        suffix += 1;
        id = format!("{}-{}", base, suffix);
    }

    seen.insert(base, suffix);
    seen.entry(id.clone()).or_insert(0);
    id
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    let slug = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_complete_page() {
        let source = r#"---
title: Getting set up
description: Tooling
---

# Setup

Install the `kotlinc` compiler.

## Gradle

```kotlin
plugins { kotlin("multiplatform") }
```
"#;

        let doc = parse_document(source).unwrap();

        assert_eq!(doc.title(), Some("Getting set up"));
        assert_eq!(doc.description(), Some("Tooling"));

        assert_eq!(doc.toc.len(), 2);
        assert_eq!(doc.toc[0].title, "Setup");
        assert_eq!(doc.toc[0].level, 1);
        assert_eq!(doc.toc[0].id, "setup");
        assert_eq!(doc.toc[1].id, "gradle");
        assert_eq!(doc.toc[1].level, 2);

        assert!(doc.html.contains("<pre><code class=\"language-kotlin\">"));
    }

    #[test]
    fn headings_carry_ids_and_anchor_links() {
        let doc = parse_document("# Intro\n\n## First steps\n").unwrap();

        assert!(doc
            .html
            .contains(r##"<h1 id="intro"><a class="anchor" href="#intro"></a>Intro</h1>"##));
        assert!(doc.html.contains(
            r##"<h2 id="first-steps"><a class="anchor" href="#first-steps"></a>First steps</h2>"##
        ));
    }

    #[test]
    fn duplicate_headings_get_unique_ids() {
        let doc = parse_document("## Example\n\n## Example\n\n## Example\n").unwrap();

        let ids: Vec<_> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["example", "example-1", "example-2"]);
        assert!(doc.html.contains(r#"id="example-2""#));
    }

    #[test]
    fn suffixed_ids_do_not_collide_with_real_slugs() {
        let doc = parse_document("## Step\n\n## Step\n\n## Step 1\n").unwrap();

        let ids: Vec<_> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["step", "step-1", "step-1-1"]);

        let doc = parse_document("## Step 1\n\n## Step\n\n## Step\n").unwrap();

        let ids: Vec<_> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["step-1", "step", "step-2"]);
    }

    #[test]
    fn explicit_heading_id_wins() {
        let doc = parse_document("## Configure it {#configure}\n").unwrap();

        assert_eq!(doc.toc[0].id, "configure");
        assert!(doc.html.contains(r##"href="#configure""##));
    }

    #[test]
    fn title_falls_back_to_headings() {
        let doc = parse_document("Some text.\n\n## Detail\n\n# Main\n").unwrap();
        assert_eq!(doc.title(), Some("Main"));

        let doc = parse_document("## Only detail\n").unwrap();
        assert_eq!(doc.title(), Some("Only detail"));

        let doc = parse_document("No headings at all.").unwrap();
        assert_eq!(doc.title(), None);
    }

    #[test]
    fn code_spans_count_as_heading_text() {
        let doc = parse_document("# The `expect` keyword\n").unwrap();

        assert_eq!(doc.toc[0].title, "The expect keyword");
        assert_eq!(doc.toc[0].id, "the-expect-keyword");
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("???"), "section");
    }
}
