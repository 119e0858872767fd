//! Workshop builder.
//!
//! Turns a directory of Markdown pages into the assets the viewer reads:
//! `{index}.html` fragments in file-name order, the `pages.json` manifest of
//! their titles, and the `index.html` shell with its stylesheet.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use workshop_docs::{parse_document, ParsedDoc};
use workshop_viewer::{page_file_name, Manifest, MANIFEST_FILE};

use crate::assets::AssetPipeline;
use crate::templates::{PageContext, ShellContext, TemplateEngine};

/// Output directory for copied resources, referenced by pages as `res/...`.
const RESOURCES_OUT: &str = "res";
const HIGHLIGHT_OUT: &str = "highlight";
const VIEWER_OUT: &str = "viewer";

/// Configuration for building a workshop.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source docs directory
    pub docs_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Images and other files copied verbatim to `res/`
    pub resources_dir: Option<PathBuf>,

    /// Compiled viewer package (wasm-pack `--target web` output)
    pub viewer_dir: Option<PathBuf>,

    /// Highlighter script copied to `highlight/`
    pub highlight_script: Option<PathBuf>,

    /// Highlighter theme copied to `highlight/`
    pub highlight_stylesheet: Option<PathBuf>,

    /// Minify CSS output
    pub minify: bool,

    /// Workshop title
    pub title: String,

    /// Live reload client injected into the shell (dev server only)
    pub reload_script: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            resources_dir: None,
            viewer_dir: None,
            highlight_script: None,
            highlight_stylesheet: None,
            minify: true,
            title: "Workshop".to_string(),
            reload_script: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read docs directory: {0}")]
    ReadError(String),

    #[error("Failed to parse page: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A page to be built.
#[derive(Debug)]
struct PageInfo {
    /// Source file path
    source_path: PathBuf,

    /// Menu title
    title: String,

    /// Parsed document
    doc: ParsedDoc,
}

/// Workshop builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the workshop.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let pages = self.discover_pages()?;

        let manifest = Manifest::new(pages.iter().map(|p| p.title.clone()).collect());
        self.write_manifest(&manifest)?;

        pages
            .par_iter()
            .enumerate()
            .map(|(index, page)| self.build_page(index, page))
            .collect::<Result<Vec<()>, BuildError>>()?;

        self.build_shell()?;
        self.generate_assets()?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: pages.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Discover pages in the docs directory, ordered by file name.
    fn discover_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        if !self.config.docs_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Docs directory not found: {}",
                self.config.docs_dir.display()
            )));
        }

        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.config.docs_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "md" && ext != "mdx" {
                continue;
            }

            let content = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let doc = parse_document(&content).map_err(|e| BuildError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

            let title = match doc.title() {
                Some(title) => title.to_string(),
                None => {
                    tracing::warn!("No title in {}, using file name", path.display());
                    file_stem(path)
                }
            };

            tracing::debug!("Page {}: {} ({})", pages.len(), title, path.display());

            pages.push(PageInfo {
                source_path: path.to_path_buf(),
                title,
                doc,
            });
        }

        Ok(pages)
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), BuildError> {
        let json = manifest
            .to_json()
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join(MANIFEST_FILE), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Render one page to `{index}.html`.
    fn build_page(&self, index: usize, page: &PageInfo) -> Result<(), BuildError> {
        let context = PageContext {
            title: page.title.clone(),
            site_title: self.config.title.clone(),
            description: page.doc.description().map(str::to_string),
            content: page.doc.html.clone(),
        };

        let html = self.templates.render_page(&context).map_err(|e| {
            BuildError::TemplateError(format!("{}: {}", page.source_path.display(), e))
        })?;

        fs::write(self.config.output_dir.join(page_file_name(index)), html)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Render the shell page hosting the viewer.
    fn build_shell(&self) -> Result<(), BuildError> {
        let context = ShellContext {
            title: self.config.title.clone(),
            highlight_script: self
                .config
                .highlight_script
                .as_deref()
                .map(|p| format!("{}/{}", HIGHLIGHT_OUT, file_name(p))),
            highlight_stylesheet: self
                .config
                .highlight_stylesheet
                .as_deref()
                .map(|p| format!("{}/{}", HIGHLIGHT_OUT, file_name(p))),
            reload_script: self.config.reload_script.clone(),
        };

        let html = self
            .templates
            .render_shell(&context)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        fs::write(self.config.output_dir.join("index.html"), html)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Generate the stylesheet and copy resources, highlighter and viewer.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let out = &self.config.output_dir;
        let assets_dir = out.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or(css)
        } else {
            css
        };
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        if let Some(resources) = &self.config.resources_dir {
            if resources.exists() {
                let count = AssetPipeline::copy_dir(resources, &out.join(RESOURCES_OUT))
                    .map_err(|e| BuildError::WriteError(e.to_string()))?;
                tracing::info!("Copied {} resources from {}", count, resources.display());
            } else {
                tracing::warn!("Resources directory not found: {}", resources.display());
            }
        }

        for file in [&self.config.highlight_script, &self.config.highlight_stylesheet]
            .into_iter()
            .flatten()
        {
            self.copy_highlight_file(file)?;
        }

        match &self.config.viewer_dir {
            Some(viewer) if viewer.exists() => {
                AssetPipeline::copy_dir(viewer, &out.join(VIEWER_OUT))
                    .map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            Some(viewer) => {
                tracing::warn!(
                    "Viewer package not found: {}. Build it with `wasm-pack build crates/workshop-viewer --target web`.",
                    viewer.display()
                );
            }
            None => {
                tracing::warn!("No viewer package configured, the shell will not load pages");
            }
        }

        Ok(())
    }

    fn copy_highlight_file(&self, source: &Path) -> Result<(), BuildError> {
        if !source.exists() {
            tracing::warn!("Highlighter file not found: {}", source.display());
            return Ok(());
        }

        let dir = self.config.output_dir.join(HIGHLIGHT_OUT);
        fs::create_dir_all(&dir).map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::copy(source, dir.join(file_name(source)))
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("highlight")
        .to_string()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_docs(docs: &Path) {
        fs::create_dir_all(docs).unwrap();
        fs::write(docs.join("02-build.md"), "# Build\n\nRun `gradle build`.").unwrap();
        fs::write(
            docs.join("00-intro.md"),
            "---\ntitle: Intro\n---\n# Welcome\n\nSee [setup](#next-steps).\n\n## Next steps\n",
        )
        .unwrap();
        fs::write(docs.join("01-setup.md"), "# Setup\n").unwrap();
        fs::write(docs.join("notes.txt"), "ignored").unwrap();
    }

    #[tokio::test]
    async fn builds_numbered_pages_in_name_order() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        let out = temp.path().join("dist");
        write_docs(&docs);

        let builder = StaticBuilder::new(BuildConfig {
            docs_dir: docs,
            output_dir: out.clone(),
            ..Default::default()
        });
        let result = builder.build().await.unwrap();

        assert_eq!(result.pages, 3);
        assert!(out.join("0.html").exists());
        assert!(out.join("1.html").exists());
        assert!(out.join("2.html").exists());
        assert!(!out.join("3.html").exists());
        assert!(out.join("index.html").exists());
        assert!(out.join("assets/main.css").exists());

        let build_page = fs::read_to_string(out.join("2.html")).unwrap();
        assert!(build_page.contains("<title>Build - Workshop</title>"));
    }

    #[tokio::test]
    async fn writes_title_manifest() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        let out = temp.path().join("dist");
        write_docs(&docs);

        StaticBuilder::new(BuildConfig {
            docs_dir: docs,
            output_dir: out.clone(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        let json = fs::read_to_string(out.join("pages.json")).unwrap();
        let manifest = Manifest::from_json(&json).unwrap();
        assert_eq!(manifest.titles(), ["Intro", "Setup", "Build"]);
    }

    #[tokio::test]
    async fn fragments_keep_heading_anchors() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        let out = temp.path().join("dist");
        write_docs(&docs);

        StaticBuilder::new(BuildConfig {
            docs_dir: docs,
            output_dir: out.clone(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        let intro = fs::read_to_string(out.join("0.html")).unwrap();
        assert!(intro.contains(r#"<h2 id="next-steps">"#));
        assert!(intro.contains(r##"<a href="#next-steps">setup</a>"##));
    }

    #[tokio::test]
    async fn falls_back_to_file_stem_for_title() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        let out = temp.path().join("dist");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("appendix.md"), "Just text.").unwrap();

        StaticBuilder::new(BuildConfig {
            docs_dir: docs,
            output_dir: out.clone(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        let json = fs::read_to_string(out.join("pages.json")).unwrap();
        assert_eq!(Manifest::from_json(&json).unwrap().titles(), ["appendix"]);
    }

    #[tokio::test]
    async fn copies_resources_highlighter_and_viewer() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        let out = temp.path().join("dist");
        write_docs(&docs);

        let res = temp.path().join("res");
        fs::create_dir_all(&res).unwrap();
        fs::write(res.join("logo.png"), b"png").unwrap();

        let hl = temp.path().join("hl");
        fs::create_dir_all(&hl).unwrap();
        fs::write(hl.join("highlight.min.js"), "var hljs = {};").unwrap();
        fs::write(hl.join("idea.min.css"), ".hljs {}").unwrap();

        let pkg = temp.path().join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("workshop_viewer.js"), "export default function init() {}").unwrap();
        fs::write(pkg.join("workshop_viewer_bg.wasm"), b"\0asm").unwrap();

        StaticBuilder::new(BuildConfig {
            docs_dir: docs,
            output_dir: out.clone(),
            resources_dir: Some(res),
            viewer_dir: Some(pkg),
            highlight_script: Some(hl.join("highlight.min.js")),
            highlight_stylesheet: Some(hl.join("idea.min.css")),
            minify: false,
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        assert!(out.join("res/logo.png").exists());
        assert!(out.join("highlight/highlight.min.js").exists());
        assert!(out.join("highlight/idea.min.css").exists());
        assert!(out.join("viewer/workshop_viewer.js").exists());
        assert!(out.join("viewer/workshop_viewer_bg.wasm").exists());

        let shell = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(shell.contains("highlight.min.js"));
        assert!(shell.contains("idea.min.css"));
    }

    #[tokio::test]
    async fn errors_on_missing_docs_dir() {
        let temp = tempdir().unwrap();

        let result = StaticBuilder::new(BuildConfig {
            docs_dir: temp.path().join("missing"),
            output_dir: temp.path().join("dist"),
            ..Default::default()
        })
        .build()
        .await;

        assert!(matches!(result, Err(BuildError::ReadError(_))));
    }

    #[tokio::test]
    async fn reports_parse_errors_with_path() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("broken.md"), "---\ntitle: never closed\n").unwrap();

        let result = StaticBuilder::new(BuildConfig {
            docs_dir: docs,
            output_dir: temp.path().join("dist"),
            ..Default::default()
        })
        .build()
        .await;

        match result {
            Err(BuildError::ParseError { path, .. }) => assert!(path.ends_with("broken.md")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
