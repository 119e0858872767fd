//! `workshop.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use workshop_static::BuildConfig;

/// Configuration file structure (workshop.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub workshop: WorkshopSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub highlight: HighlightSection,
    #[serde(default)]
    pub viewer: ViewerSection,
}

#[derive(Debug, Deserialize)]
pub struct WorkshopSection {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_docs_dir")]
    pub docs: String,
    #[serde(default = "default_output")]
    pub output: String,
    /// Images referenced by pages as `res/...`
    pub resources: Option<String>,
}

impl Default for WorkshopSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            docs: default_docs_dir(),
            output: default_output(),
            resources: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct HighlightSection {
    pub script: Option<String>,
    pub stylesheet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerSection {
    #[serde(default = "default_viewer_dir")]
    pub dir: String,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            dir: default_viewer_dir(),
        }
    }
}

fn default_title() -> String {
    "Workshop".to_string()
}
fn default_docs_dir() -> String {
    "docs".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_minify() -> bool {
    true
}
fn default_viewer_dir() -> String {
    "crates/workshop-viewer/pkg".to_string()
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

impl ConfigFile {
    /// Build settings described by this file.
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            docs_dir: PathBuf::from(&self.workshop.docs),
            output_dir: PathBuf::from(&self.workshop.output),
            resources_dir: self.workshop.resources.as_ref().map(PathBuf::from),
            viewer_dir: Some(PathBuf::from(&self.viewer.dir)),
            highlight_script: self.highlight.script.as_ref().map(PathBuf::from),
            highlight_stylesheet: self.highlight.stylesheet.as_ref().map(PathBuf::from),
            minify: self.build.minify,
            title: self.workshop.title.clone(),
            reload_script: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = load(&temp.path().join("workshop.toml")).unwrap();
        let build = config.build_config();

        assert_eq!(build.title, "Workshop");
        assert_eq!(build.docs_dir, PathBuf::from("docs"));
        assert_eq!(build.output_dir, PathBuf::from("dist"));
        assert!(build.minify);
        assert_eq!(build.resources_dir, None);
    }

    #[test]
    fn reads_all_sections() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("workshop.toml");
        fs::write(
            &path,
            r#"
[workshop]
title = "Kotlin Workshop"
docs = "pages"
resources = "res"

[build]
minify = false

[highlight]
script = "vendor/highlight.min.js"
stylesheet = "vendor/idea.min.css"

[viewer]
dir = "viewer/pkg"
"#,
        )
        .unwrap();

        let build = load(&path).unwrap().build_config();

        assert_eq!(build.title, "Kotlin Workshop");
        assert_eq!(build.docs_dir, PathBuf::from("pages"));
        assert_eq!(build.output_dir, PathBuf::from("dist"));
        assert_eq!(build.resources_dir, Some(PathBuf::from("res")));
        assert!(!build.minify);
        assert_eq!(
            build.highlight_script,
            Some(PathBuf::from("vendor/highlight.min.js"))
        );
        assert_eq!(build.viewer_dir, Some(PathBuf::from("viewer/pkg")));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("workshop.toml");
        fs::write(&path, "[workshop\ntitle = ").unwrap();

        let err = load(&path).unwrap_err();

        assert!(err.to_string().contains("Failed to parse"));
    }
}
