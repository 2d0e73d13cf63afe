//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate an anchor tag
///
/// # Examples
/// ```ignore
/// link_to("https://example.com", "<b>Example</b>") // -> <a href="https://example.com" target="_blank" rel="noopener"><b>Example</b></a>
/// ```
pub fn link_to(href: &str, inner_html: &str) -> String {
    if is_external(href) {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(href),
            inner_html
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), inner_html)
    }
}

/// Generate an image tag
pub fn image_tag(src: &str, alt: Option<&str>, size: Option<(u32, u32)>) -> String {
    let size_attrs = size
        .map(|(w, h)| format!(r#" width="{}" height="{}""#, w, h))
        .unwrap_or_default();
    format!(
        r#"<img src="{}" alt="{}"{}>"#,
        html_escape(src),
        html_escape(alt.unwrap_or("")),
        size_attrs
    )
}

/// Whether `href` may be placed in a link: relative URLs and the
/// `http`, `https`, `mailto` and `tel` schemes.
pub fn is_safe_href(href: &str) -> bool {
    // Browsers drop whitespace and control characters inside a scheme
    let cleaned: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match cleaned.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(pos) if cleaned[pos..].starts_with(':') => {
            let scheme = cleaned[..pos].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel")
        }
        _ => true,
    }
}

fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}
