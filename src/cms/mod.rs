//! Content store access
//!
//! [`ContentStore`] is the read-only boundary to the CMS. [`SanityClient`]
//! talks to the hosted query API; [`MemoryStore`] serves an exported dataset
//! from memory.

mod client;
mod error;
mod memory;
pub mod queries;

use async_trait::async_trait;

pub use client::SanityClient;
pub use error::{CmsError, Result};
pub use memory::{Dataset, MemoryStore};

use crate::content::{self, EffectivePost, MasterPost, Site, SitePost};

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All sites, ordered by title
    async fn sites(&self) -> Result<Vec<Site>>;

    /// The newest master posts with a slug, at most [`content::LISTING_LIMIT`]
    async fn master_posts(&self) -> Result<Vec<MasterPost>>;

    /// One master post by slug
    async fn master_post(&self, slug: &str) -> Result<Option<MasterPost>>;

    /// Site posts of a site with their master posts (title, slug, date only)
    async fn site_posts(&self, site_id: &str) -> Result<Vec<SitePost>>;

    /// Site posts of a site with every field, for detail lookups
    async fn site_post_documents(&self, site_id: &str) -> Result<Vec<SitePost>>;

    /// Effective listing of a site
    async fn site_listing(&self, site_id: &str) -> Result<Vec<EffectivePost>> {
        let posts = self.site_posts(site_id).await?;
        Ok(content::select_listing(&posts))
    }

    /// A site post by its effective slug
    async fn site_post(&self, site_id: &str, slug: &str) -> Result<Option<EffectivePost>> {
        let posts = self.site_post_documents(site_id).await?;
        Ok(content::find_by_slug(&posts, slug))
    }
}
