//! Content module - CMS documents, inheritance resolution and body rendering

mod portable_text;
mod post;
pub mod resolver;

pub use portable_text::{plain_text, PortableTextRenderer};
pub use post::{
    AssetRef, Body, BodyBlock, CodeBlock, ImageCrop, ImageHotspot, ImageRef, MarkDef, MasterPost,
    Site, SitePost, Slug, Span, TextBlock,
};
pub use resolver::{find_by_slug, select_listing, EffectivePost, Field, LISTING_LIMIT};
