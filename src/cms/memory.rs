//! In-memory content store backed by an exported dataset

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::error::Result;
use super::ContentStore;
use crate::content::{MasterPost, Site, SitePost, LISTING_LIMIT};

/// Exported documents: sites, master posts and site posts grouped by site id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub sites: Vec<Site>,
    pub master_posts: Vec<MasterPost>,
    pub site_posts: HashMap<String, Vec<SitePost>>,
}

/// Content store that answers queries from a [`Dataset`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dataset: Dataset,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Load a dataset from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let dataset: Dataset = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded {} sites and {} master posts from {:?}",
            dataset.sites.len(),
            dataset.master_posts.len(),
            path.as_ref()
        );
        Ok(Self::new(dataset))
    }

    fn posts_of(&self, site_id: &str) -> Vec<SitePost> {
        self.dataset
            .site_posts
            .get(site_id)
            .map(|posts| {
                posts
                    .iter()
                    .filter(|p| p.master_post.is_some())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn sites(&self) -> Result<Vec<Site>> {
        let mut sites = self.dataset.sites.clone();
        sites.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(sites)
    }

    async fn master_posts(&self) -> Result<Vec<MasterPost>> {
        let mut posts: Vec<MasterPost> = self
            .dataset
            .master_posts
            .iter()
            .filter(|p| p.slug.is_some())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts.truncate(LISTING_LIMIT);
        Ok(posts)
    }

    async fn master_post(&self, slug: &str) -> Result<Option<MasterPost>> {
        Ok(self
            .dataset
            .master_posts
            .iter()
            .find(|p| p.slug.as_ref().map(|s| s.current.as_str()) == Some(slug))
            .cloned())
    }

    async fn site_posts(&self, site_id: &str) -> Result<Vec<SitePost>> {
        Ok(self.posts_of(site_id))
    }

    async fn site_post_documents(&self, site_id: &str) -> Result<Vec<SitePost>> {
        Ok(self.posts_of(site_id))
    }
}
