//! Rich-text (Portable Text) rendering with syntax highlighting

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::post::{BodyBlock, CodeBlock, ImageRef, MarkDef, Span, TextBlock};
use crate::helpers::{html_escape, image_tag, is_safe_href, link_to, ImageUrlBuilder};

/// Width requested for images embedded in a body
const BODY_IMAGE_WIDTH: u32 = 800;

/// Portable Text renderer
pub struct PortableTextRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    images: Option<ImageUrlBuilder>,
}

impl PortableTextRenderer {
    /// Create a new renderer; body images are skipped without an image builder
    pub fn new(images: Option<ImageUrlBuilder>) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "InspiredGitHub".to_string(),
            images,
        }
    }

    /// Render a body to HTML
    pub fn render(&self, blocks: &[BodyBlock]) -> String {
        let mut html = String::new();
        let mut lists = ListStack::default();

        for block in blocks {
            match block {
                BodyBlock::Text(text) if text.list_item.is_some() => {
                    lists.enter(&mut html, text);
                    html.push_str(&render_spans(&text.children, &text.mark_defs));
                }
                BodyBlock::Text(text) => {
                    lists.close_all(&mut html);
                    html.push_str(&render_text_block(text));
                }
                BodyBlock::Image(image) => {
                    lists.close_all(&mut html);
                    if let Some(tag) = self.render_image(image) {
                        html.push_str(&tag);
                    }
                }
                BodyBlock::Code(code) => {
                    lists.close_all(&mut html);
                    html.push_str(&self.highlight_code(code));
                }
                BodyBlock::Unknown => {
                    tracing::debug!("Skipping unknown body block");
                }
            }
        }

        lists.close_all(&mut html);
        html
    }

    fn render_image(&self, image: &ImageRef) -> Option<String> {
        let src = self
            .images
            .as_ref()?
            .url(image, Some(BODY_IMAGE_WIDTH), None)?;
        Some(format!(
            "<figure>{}</figure>",
            image_tag(&src, image.alt.as_deref(), None)
        ))
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &CodeBlock) -> String {
        let lang = code.language.as_deref().unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        match theme.and_then(|theme| {
            highlighted_html_for_string(&code.code, &self.syntax_set, syntax, theme).ok()
        }) {
            Some(highlighted) => format!(r#"<div class="code-block">{}</div>"#, highlighted),
            None => format!("<pre><code>{}</code></pre>", html_escape(&code.code)),
        }
    }
}

/// Extract the plain text of a body (used for descriptions)
pub fn plain_text(blocks: &[BodyBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            BodyBlock::Text(text) => Some(
                text.children
                    .iter()
                    .map(|span| span.text.as_str())
                    .collect::<String>(),
            ),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_text_block(block: &TextBlock) -> String {
    let tag = match block.style.as_deref() {
        Some(style @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => style,
        Some("blockquote") => "blockquote",
        _ => "p",
    };
    format!(
        "<{tag}>{}</{tag}>",
        render_spans(&block.children, &block.mark_defs)
    )
}

fn render_spans(spans: &[Span], mark_defs: &[MarkDef]) -> String {
    spans
        .iter()
        .map(|span| render_span(span, mark_defs))
        .collect()
}

fn render_span(span: &Span, mark_defs: &[MarkDef]) -> String {
    let mut html = html_escape(&span.text).replace('\n', "<br/>");

    for mark in &span.marks {
        html = match mark.as_str() {
            "strong" => format!("<strong>{}</strong>", html),
            "em" => format!("<em>{}</em>", html),
            "code" => format!("<code>{}</code>", html),
            "underline" => format!(r#"<span style="text-decoration:underline">{}</span>"#, html),
            "strike-through" => format!("<del>{}</del>", html),
            key => match mark_defs.iter().find(|def| def.key == key) {
                Some(MarkDef {
                    kind,
                    href: Some(href),
                    ..
                }) if kind == "link" && is_safe_href(href) => link_to(href, &html),
                _ => html,
            },
        };
    }

    html
}

/// Open list elements while walking consecutive list-item blocks
#[derive(Default)]
struct ListStack {
    tags: Vec<&'static str>,
}

impl ListStack {
    fn enter(&mut self, html: &mut String, block: &TextBlock) {
        let tag = match block.list_item.as_deref() {
            Some("number") => "ol",
            _ => "ul",
        };
        let level = block.level.unwrap_or(1).max(1);

        while self.tags.len() > level {
            self.pop(html);
        }
        if self.tags.len() == level && self.tags.last() != Some(&tag) {
            self.pop(html);
        }
        if self.tags.len() == level {
            html.push_str("</li>");
        }
        while self.tags.len() < level {
            html.push_str(&format!("<{}>", tag));
            self.tags.push(tag);
        }
        html.push_str("<li>");
    }

    fn pop(&mut self, html: &mut String) {
        if let Some(tag) = self.tags.pop() {
            html.push_str(&format!("</li></{}>", tag));
        }
    }

    fn close_all(&mut self, html: &mut String) {
        while !self.tags.is_empty() {
            self.pop(html);
        }
    }
}
