//! msm-blog: a multi-site blog front-end over a headless CMS
//!
//! Site posts link to a shared master post and inherit its fields unless
//! they mark a field as overridden. Pages are rendered on request with
//! embedded Tera templates.

pub mod cache;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use cms::{ContentStore, MemoryStore, SanityClient};
use generator::Generator;

/// The main application
#[derive(Clone)]
pub struct Blog {
    /// Application configuration
    pub config: config::AppConfig,
    /// Where documents come from
    pub store: Arc<dyn ContentStore>,
}

impl Blog {
    /// Connect to the hosted CMS described by the configuration
    pub fn connect(config: config::AppConfig) -> Result<Self> {
        let client = SanityClient::new(&config.cms, config.revalidate())
            .context("Failed to create CMS client")?;
        tracing::debug!("Querying {}", client.query_url());

        Ok(Self {
            config,
            store: Arc::new(client),
        })
    }

    /// Serve documents from an exported JSON dataset
    pub fn from_fixtures<P: AsRef<Path>>(config: config::AppConfig, path: P) -> Result<Self> {
        let store = MemoryStore::from_json_file(path.as_ref())
            .with_context(|| format!("Failed to load fixtures from {:?}", path.as_ref()))?;

        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Create a page generator over this blog's store
    pub fn generator(&self) -> Result<Generator> {
        Generator::new(&self.config, self.store.clone())
    }

    /// Start the HTTP server
    pub async fn serve(&self, ip: &str, port: u16, open: bool) -> Result<()> {
        let generator = Arc::new(self.generator()?);
        server::start(generator, self.config.revalidate_secs, ip, port, open).await
    }
}
