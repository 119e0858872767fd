//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Optional YAML block at the top of a page.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Menu title, overrides the first heading
    #[serde(default)]
    pub title: Option<String>,

    /// Page description for the fragment's meta tags
    #[serde(default)]
    pub description: Option<String>,
}

/// Extract frontmatter from a page.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    // An empty block is allowed and means "no overrides".
    let frontmatter = if yaml_content.is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_description() {
        let source = r#"---
title: Setting up
description: Installing the toolchain
---

# Setup
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title.as_deref(), Some("Setting up"));
        assert_eq!(fm.description.as_deref(), Some("Installing the toolchain"));
        assert!(content.starts_with("# Setup"));
    }

    #[test]
    fn title_is_optional() {
        let source = "---\ndescription: Only a description\n---\n# Heading";

        let (fm, _) = extract_frontmatter(source).unwrap();

        assert_eq!(fm.unwrap().title, None);
    }

    #[test]
    fn accepts_empty_block() {
        let (fm, content) = extract_frontmatter("---\n---\n# Body").unwrap();

        assert_eq!(fm, Some(Frontmatter::default()));
        assert_eq!(content, "# Body");
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }
}
