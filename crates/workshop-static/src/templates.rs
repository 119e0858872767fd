//! Templates for the shell page and the numbered page fragments.

use minijinja::{context, Environment};

/// Context for rendering the shell page (`index.html`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShellContext {
    /// Workshop title, shown in the menu header and the tab
    pub title: String,
    /// Highlighter script path relative to the output root
    pub highlight_script: Option<String>,
    /// Highlighter theme path relative to the output root
    pub highlight_stylesheet: Option<String>,
    /// Live reload client, only set for dev builds
    pub reload_script: Option<String>,
}

/// Context for rendering one page fragment (`{index}.html`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Page title
    pub title: String,
    /// Workshop title
    pub site_title: String,
    /// Page description, if the frontmatter has one
    pub description: Option<String>,
    /// Rendered content HTML
    pub content: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("shell.html".to_string(), SHELL_TEMPLATE.to_string())
            .expect("Failed to add shell template");

        env.add_template_owned("page.html".to_string(), PAGE_TEMPLATE.to_string())
            .expect("Failed to add page template");

        Self { env }
    }

    /// Render the shell page that hosts the viewer.
    pub fn render_shell(&self, context: &ShellContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("shell.html")?;

        tmpl.render(context! {
            title => &context.title,
            highlight_script => &context.highlight_script,
            highlight_stylesheet => &context.highlight_stylesheet,
            reload_script => &context.reload_script,
        })
    }

    /// Render a standalone page fragment.
    pub fn render_page(&self, context: &PageContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("page.html")?;

        tmpl.render(context! {
            title => &context.title,
            site_title => &context.site_title,
            description => &context.description,
            content => &context.content,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const SHELL_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="assets/main.css">
  {% if highlight_stylesheet %}<link rel="stylesheet" href="{{ highlight_stylesheet }}">
  {% endif %}{% if highlight_script %}<script src="{{ highlight_script }}"></script>
  {% endif %}</head>
<body>
  <div id="workshop" class="workshop" data-title="{{ title }}">
    <nav id="workshop-menu" class="menu"></nav>
    <main id="workshop-page" class="page"></main>
  </div>
  <script type="module">
    import init from "./viewer/workshop_viewer.js";
    init();
  </script>
  {% if reload_script %}<script>{{ reload_script | safe }}</script>
  {% endif %}</body>
</html>"##;

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ title }} - {{ site_title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}<link rel="stylesheet" href="assets/main.css">
</head>
<body>
<article class="article">
{{ content | safe }}
</article>
</body>
</html>"##;
