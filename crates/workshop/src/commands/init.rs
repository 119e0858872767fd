//! Scaffold a workshop in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing workshop...");

    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if scaffold(root, config_path, yes)? {
        tracing::info!("Initialization complete!");
        tracing::info!("Run 'workshop dev' to start the development server.");
    }

    Ok(())
}

/// Write the config and sample pages. Returns false when nothing was done.
fn scaffold(root: &Path, config_path: &Path, yes: bool) -> Result<bool> {
    let docs_dir = root.join("docs");

    if docs_dir.exists() {
        if !yes {
            tracing::warn!("docs/ directory already exists. Use --yes to overwrite.");
            return Ok(false);
        }
    } else {
        fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;
    }

    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    for (name, content) in [
        ("01-introduction.md", DEFAULT_INTRODUCTION),
        ("02-first-steps.md", DEFAULT_FIRST_STEPS),
    ] {
        let path = docs_dir.join(name);
        if !path.exists() || yes {
            fs::write(&path, content).with_context(|| format!("Failed to write {}", name))?;
            tracing::info!("Created docs/{}", name);
        }
    }

    let res_dir = root.join("res");
    if !res_dir.exists() {
        fs::create_dir_all(&res_dir).context("Failed to create res directory")?;
    }

    Ok(true)
}

const DEFAULT_CONFIG: &str = r#"# Workshop configuration

[workshop]
# Shown in the menu header and the browser tab
title = "My Workshop"

# Pages, ordered by file name
docs = "docs"

# Output directory for the built site
output = "dist"

# Images referenced from pages as res/...
resources = "res"

[build]
minify = true

[highlight]
# Optional highlight.js build, copied to highlight/
# script = "vendor/highlight.min.js"
# stylesheet = "vendor/idea.min.css"

[viewer]
# wasm-pack build crates/workshop-viewer --target web
dir = "crates/workshop-viewer/pkg"
"#;

const DEFAULT_INTRODUCTION: &str = r#"---
title: Introduction
---

# Introduction

Welcome to the workshop. Pages are listed in the menu on the left and
numbered in file-name order.

## How it works

Each page is a Markdown file in `docs/`. Link to a section of the current
page with a plain fragment, like [the last section](#next).

## Next

Use the **Next** button below the menu, or the link at the end of this page.
"#;

const DEFAULT_FIRST_STEPS: &str = r#"---
title: First Steps
---

# First Steps

Code blocks are highlighted when a highlighter is configured:

```kotlin
fun main() {
    println("Hello, workshop!")
}
```

External links such as [the Rust book](https://doc.rust-lang.org/book/)
open in a new tab.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scaffolds_config_and_pages() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("workshop.toml");

        assert!(scaffold(temp.path(), &config, false).unwrap());

        assert!(config.exists());
        assert!(temp.path().join("docs/01-introduction.md").exists());
        assert!(temp.path().join("docs/02-first-steps.md").exists());
        assert!(temp.path().join("res").is_dir());
    }

    #[test]
    fn scaffolded_config_parses() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("workshop.toml");
        scaffold(temp.path(), &config, false).unwrap();

        let loaded = crate::config::load(&config).unwrap();

        assert_eq!(loaded.workshop.title, "My Workshop");
        assert_eq!(loaded.workshop.resources.as_deref(), Some("res"));
    }

    #[test]
    fn keeps_existing_docs_without_yes() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("01-introduction.md"), "# Mine").unwrap();

        let config = temp.path().join("workshop.toml");
        assert!(!scaffold(temp.path(), &config, false).unwrap());

        assert!(!config.exists());
        assert_eq!(
            fs::read_to_string(docs.join("01-introduction.md")).unwrap(),
            "# Mine"
        );
    }

    #[test]
    fn overwrites_with_yes() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("01-introduction.md"), "# Mine").unwrap();

        let config = temp.path().join("workshop.toml");
        assert!(scaffold(temp.path(), &config, true).unwrap());

        assert!(fs::read_to_string(docs.join("01-introduction.md"))
            .unwrap()
            .contains("Welcome to the workshop"));
    }
}
