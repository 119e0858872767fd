//! Markup for the menu pane and the "next page" affordance.

use minijinja::{context, Environment};

use crate::menu::MenuView;
use crate::route::page_href;

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template("menu.html", MENU_TEMPLATE)
            .expect("Failed to add menu template");
        env.add_template("next.html", NEXT_TEMPLATE)
            .expect("Failed to add next template");

        Self { env }
    }

    /// Render the sidebar.
    pub fn render_menu(&self, view: &MenuView) -> Result<String, minijinja::Error> {
        self.env.get_template("menu.html")?.render(context! {
            title => &view.title,
            items => &view.items,
            back => &view.back,
            next => &view.next,
        })
    }

    /// Render the link to page `index` shown under the page content.
    pub fn render_next(&self, index: usize, title: &str) -> Result<String, minijinja::Error> {
        self.env.get_template("next.html")?.render(context! {
            index => index,
            title => title,
            href => page_href(index),
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// Hrefs are built from page indices only, so they skip escaping.
const MENU_TEMPLATE: &str = r##"<h1>{{ title }}</h1>
<ul>
{% for item in items %}  <li><a href="{{ item.href | safe }}" class="{{ item.placement }}{% if item.placement != "current" %} link{% endif %}"><span class="index">{{ item.index }}</span><span class="title">{{ item.title }}</span></a></li>
{% endfor %}</ul>
<div class="footer">
  <a{% if back.href %} href="{{ back.href | safe }}"{% endif %} class="back{% if not back.href %} start{% endif %}">Back</a>
  <a{% if next.href %} href="{{ next.href | safe }}"{% endif %} class="next{% if not next.href %} end{% endif %}">Next</a>
</div>"##;

const NEXT_TEMPLATE: &str = r##"<div class="workshop-next"><a href="{{ href | safe }}"><span>{{ index }}</span>{{ title }}</a></div>"##;
