//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off: every string
//! placed in a context goes through the constructors below, which escape it.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::helpers::html_escape;

/// Template renderer with the embedded pages
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("pages/layout.html")),
            ("index.html", include_str!("pages/index.html")),
            ("site.html", include_str!("pages/site.html")),
            ("post.html", include_str!("pages/post.html")),
            ("not_found.html", include_str!("pages/not_found.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
}

impl ConfigData {
    pub fn new(title: &str) -> Self {
        Self {
            title: html_escape(title),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteCard {
    pub title: String,
    pub path: String,
}

impl SiteCard {
    pub fn new(title: &str, path: &str) -> Self {
        Self {
            title: html_escape(title),
            path: html_escape(path),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub date: Option<String>,
    /// Missing when the post has no effective slug
    pub path: Option<String>,
}

impl PostSummary {
    pub fn new(title: &str, date: Option<String>, path: Option<String>) -> Self {
        Self {
            title: html_escape(title),
            date: date.as_deref().map(html_escape),
            path: path.as_deref().map(html_escape),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageData {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// A post detail page. `body` is already rendered HTML.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageData>,
    pub body: String,
}

impl PostView {
    pub fn new(
        title: &str,
        date: Option<String>,
        description: Option<String>,
        image: Option<ImageData>,
        body: String,
    ) -> Self {
        Self {
            title: html_escape(title),
            date: date.as_deref().map(html_escape),
            description: description.as_deref().map(html_escape),
            image: image.map(|img| ImageData {
                src: html_escape(&img.src),
                ..img
            }),
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackLink {
    pub path: String,
    pub label: String,
}

impl BackLink {
    pub fn new(path: &str, label: &str) -> Self {
        Self {
            path: html_escape(path),
            label: html_escape(label),
        }
    }
}
