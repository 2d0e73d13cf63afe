//! Master post inheritance and site-level overrides
//!
//! A site post either uses its own value for a field or falls back to the
//! value of its master post. The decision is made per field:
//!
//! 1. inheritance disabled: the local value wins, even when it is absent
//! 2. field named in the override set: the local value wins
//! 3. otherwise: the master value is used

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::post::{Body, ImageRef, SitePost, Slug};

/// Maximum number of posts shown in a listing
pub const LISTING_LIMIT: usize = 12;

/// A field that participates in inheritance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Slug,
    PublishedAt,
    Image,
    Body,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Slug,
        Field::PublishedAt,
        Field::Image,
        Field::Body,
    ];

    /// Name used for this field in the override set
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Slug => "slug",
            Field::PublishedAt => "publishedAt",
            Field::Image => "image",
            Field::Body => "body",
        }
    }
}

/// Resolve a single field.
///
/// Names in `overridden_fields` that do not match a known field are ignored.
pub fn resolve_field<T>(
    field: Field,
    site_value: Option<T>,
    master_value: Option<T>,
    inheritance_enabled: bool,
    overridden_fields: &[String],
) -> Option<T> {
    OverridePolicy::new(inheritance_enabled, overridden_fields).resolve(
        field,
        site_value,
        master_value,
    )
}

/// Inheritance settings of one site post
#[derive(Debug, Clone, Copy)]
pub struct OverridePolicy<'a> {
    inheritance_enabled: bool,
    overridden_fields: &'a [String],
}

impl<'a> OverridePolicy<'a> {
    pub fn new(inheritance_enabled: bool, overridden_fields: &'a [String]) -> Self {
        Self {
            inheritance_enabled,
            overridden_fields,
        }
    }

    /// Whether the site's own value is authoritative for `field`
    pub fn uses_local(&self, field: Field) -> bool {
        !self.inheritance_enabled || self.overridden_fields.iter().any(|f| f == field.name())
    }

    pub fn resolve<T>(
        &self,
        field: Field,
        site_value: Option<T>,
        master_value: Option<T>,
    ) -> Option<T> {
        if self.uses_local(field) {
            site_value
        } else {
            master_value
        }
    }
}

/// Site post after inheritance has been applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectivePost {
    pub id: String,
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<ImageRef>,
    pub body: Option<Body>,
}

impl EffectivePost {
    pub fn slug_str(&self) -> Option<&str> {
        self.slug.as_ref().map(|s| s.current.as_str())
    }
}

/// Resolve, order by effective publication date (newest first) and cap a listing.
///
/// Posts with an unresolved master link are dropped. Posts without a date sort
/// after dated ones; ties keep their input order.
pub fn select_listing(posts: &[SitePost]) -> Vec<EffectivePost> {
    let mut resolved: Vec<EffectivePost> = posts.iter().filter_map(SitePost::resolve).collect();
    resolved.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    resolved.truncate(LISTING_LIMIT);
    resolved
}

/// Find the first post whose effective slug equals `slug`
pub fn find_by_slug(posts: &[SitePost], slug: &str) -> Option<EffectivePost> {
    posts
        .iter()
        .filter_map(SitePost::resolve)
        .find(|p| p.slug_str() == Some(slug))
}
