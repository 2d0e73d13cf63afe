//! URL helper functions for the page routes

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Prefix of master post detail pages
pub const MASTER_POSTS_PREFIX: &str = "posts";

/// Encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Decode a single path segment
pub fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Path of a site's post listing
///
/// # Examples
/// ```ignore
/// site_path("us") // -> "/us"
/// ```
pub fn site_path(site_id: &str) -> String {
    format!("/{}", encode_segment(site_id))
}

/// Path of a site post detail page
pub fn site_post_path(site_id: &str, slug: &str) -> String {
    format!("/{}/{}", encode_segment(site_id), encode_segment(slug))
}

/// Path of a master post detail page
pub fn master_post_path(slug: &str) -> String {
    format!("/{}/{}", MASTER_POSTS_PREFIX, encode_segment(slug))
}
