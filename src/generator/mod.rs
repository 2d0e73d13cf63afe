//! Page generator - fetches documents and renders pages with the built-in templates

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tera::Context;

use crate::cms::ContentStore;
use crate::config::AppConfig;
use crate::content::{
    plain_text, BodyBlock, EffectivePost, ImageRef, MasterPost, PortableTextRenderer,
};
use crate::helpers::{
    decode_segment, html_escape, master_post_path, site_path, site_post_path, truncate, Helpers,
    MASTER_POSTS_PREFIX,
};
use crate::templates::{
    BackLink, ConfigData, ImageData, PostSummary, PostView, SiteCard, TemplateRenderer,
};

/// Shown for posts without a title
const UNTITLED: &str = "Untitled";

/// Maximum length of a page description
const DESCRIPTION_LENGTH: usize = 160;

/// A page route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Index,
    /// `/posts/{slug}`
    MasterPost { slug: String },
    /// `/{siteId}`
    Site { site_id: String },
    /// `/{siteId}/{slug}`
    SitePost { site_id: String, slug: String },
}

impl Route {
    /// Parse a request path; `None` for paths with more than two segments
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect();

        match segments.as_slice() {
            [] => Some(Route::Index),
            [site_id] => Some(Route::Site {
                site_id: site_id.clone(),
            }),
            [prefix, slug] if prefix == MASTER_POSTS_PREFIX => Some(Route::MasterPost {
                slug: slug.clone(),
            }),
            [site_id, slug] => Some(Route::SitePost {
                site_id: site_id.clone(),
                slug: slug.clone(),
            }),
            _ => None,
        }
    }
}

/// Result of rendering a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Found(String),
    NotFound(String),
}

impl PageOutcome {
    pub fn html(&self) -> &str {
        match self {
            PageOutcome::Found(html) | PageOutcome::NotFound(html) => html,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PageOutcome::Found(_))
    }
}

/// Renders pages from a content store
pub struct Generator {
    config: AppConfig,
    store: Arc<dyn ContentStore>,
    renderer: TemplateRenderer,
    body_renderer: PortableTextRenderer,
    helpers: Helpers,
}

impl Generator {
    /// Create a new generator
    pub fn new(config: &AppConfig, store: Arc<dyn ContentStore>) -> Result<Self> {
        let helpers = Helpers::new(config);
        let body_renderer = PortableTextRenderer::new(helpers.images().cloned());
        if helpers.images().is_none() {
            tracing::info!("CMS project not configured, images will not be rendered");
        }

        Ok(Self {
            config: config.clone(),
            store,
            renderer: TemplateRenderer::new()?,
            body_renderer,
            helpers,
        })
    }

    /// Render a request path
    pub async fn render_path(&self, path: &str) -> Result<PageOutcome> {
        match Route::parse(path) {
            Some(route) => self.render(&route).await,
            None => self
                .not_found("Page not found", &BackLink::new("/", "Back to sites"))
                .map(PageOutcome::NotFound),
        }
    }

    /// Render a route
    pub async fn render(&self, route: &Route) -> Result<PageOutcome> {
        tracing::debug!("Rendering {:?}", route);
        match route {
            Route::Index => self.index_page().await.map(PageOutcome::Found),
            Route::Site { site_id } => self.site_page(site_id).await.map(PageOutcome::Found),
            Route::SitePost { site_id, slug } => self.site_post_page(site_id, slug).await,
            Route::MasterPost { slug } => self.master_post_page(slug).await,
        }
    }

    /// Landing page: sites and the newest master posts
    pub async fn index_page(&self) -> Result<String> {
        let (sites, posts) = tokio::try_join!(self.store.sites(), self.store.master_posts())?;

        let site_cards: Vec<SiteCard> = sites
            .iter()
            .filter_map(|site| {
                let site_id = site.site_id.as_deref()?;
                let title = site.title.as_deref().unwrap_or(site_id);
                Some(SiteCard::new(title, &site_path(site_id)))
            })
            .collect();

        let post_summaries: Vec<PostSummary> = posts
            .iter()
            .map(|post| {
                PostSummary::new(
                    post.title.as_deref().unwrap_or(UNTITLED),
                    post.published_at.as_ref().map(|d| self.helpers.date(d)),
                    post.slug.as_ref().map(|s| master_post_path(&s.current)),
                )
            })
            .collect();

        let mut context = self.base_context();
        context.insert("sites", &site_cards);
        context.insert("posts", &post_summaries);
        self.renderer.render("index.html", &context)
    }

    /// Listing of one site
    pub async fn site_page(&self, site_id: &str) -> Result<String> {
        let posts = self.store.site_listing(site_id).await?;

        let summaries: Vec<PostSummary> = posts
            .iter()
            .map(|post| {
                PostSummary::new(
                    post.title.as_deref().unwrap_or(UNTITLED),
                    post.published_at.as_ref().map(|d| self.helpers.date(d)),
                    post.slug_str().map(|slug| site_post_path(site_id, slug)),
                )
            })
            .collect();

        let mut context = self.base_context();
        context.insert("heading", &html_escape(&site_heading(site_id)));
        context.insert("posts", &summaries);
        self.renderer.render("site.html", &context)
    }

    /// Detail page of a site post, looked up by effective slug
    pub async fn site_post_page(&self, site_id: &str, slug: &str) -> Result<PageOutcome> {
        let back = BackLink::new(
            &site_path(site_id),
            &format!("Back to {} posts", site_id.to_uppercase()),
        );

        match self.store.site_post(site_id, slug).await? {
            Some(post) => self.post_page(self.effective_view(&post), &back).map(PageOutcome::Found),
            None => {
                tracing::debug!("No post {:?} on site {:?}", slug, site_id);
                self.not_found("Post not found", &back)
                    .map(PageOutcome::NotFound)
            }
        }
    }

    /// Detail page of a master post
    pub async fn master_post_page(&self, slug: &str) -> Result<PageOutcome> {
        let back = BackLink::new("/", "Back to sites");

        match self.store.master_post(slug).await? {
            Some(post) => self.post_page(self.master_view(&post), &back).map(PageOutcome::Found),
            None => self
                .not_found("Post not found", &back)
                .map(PageOutcome::NotFound),
        }
    }

    fn effective_view(&self, post: &EffectivePost) -> PostView {
        self.post_view(
            post.title.as_deref(),
            post.published_at.as_ref(),
            post.image.as_ref(),
            post.body.as_deref(),
        )
    }

    fn master_view(&self, post: &MasterPost) -> PostView {
        self.post_view(
            post.title.as_deref(),
            post.published_at.as_ref(),
            post.image.as_ref(),
            post.body.as_deref(),
        )
    }

    fn post_view(
        &self,
        title: Option<&str>,
        published_at: Option<&DateTime<Utc>>,
        image: Option<&ImageRef>,
        body: Option<&[BodyBlock]>,
    ) -> PostView {
        let (width, height) = (
            self.config.render.image_width,
            self.config.render.image_height,
        );
        let image = image
            .and_then(|img| self.helpers.image_url(img, Some(width), Some(height)))
            .map(|src| ImageData { src, width, height });

        let description = body
            .map(plain_text)
            .filter(|text| !text.is_empty())
            .map(|text| truncate(&text, DESCRIPTION_LENGTH, None));

        PostView::new(
            title.unwrap_or(UNTITLED),
            published_at.map(|d| self.helpers.date(d)),
            description,
            image,
            body.map(|blocks| self.body_renderer.render(blocks))
                .unwrap_or_default(),
        )
    }

    fn post_page(&self, post: PostView, back: &BackLink) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", &post);
        context.insert("back", back);
        self.renderer.render("post.html", &context)
    }

    fn not_found(&self, heading: &str, back: &BackLink) -> Result<String> {
        let mut context = self.base_context();
        context.insert("heading", &html_escape(heading));
        context.insert("back", back);
        self.renderer.render("not_found.html", &context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::new(&self.config.title));
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }
}

fn site_heading(site_id: &str) -> String {
    format!("{} Posts", site_id.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{Dataset, MemoryStore};
    use serde_json::json;

    fn dataset() -> Dataset {
        serde_json::from_value(json!({
            "sites": [
                {"_id": "s1", "title": "United States", "siteId": "us"},
                {"_id": "s2", "title": "No id"}
            ],
            "masterPosts": [
                {
                    "_id": "m1",
                    "title": "Master Title",
                    "slug": {"current": "master-slug"},
                    "publishedAt": "2024-01-05T12:00:00Z",
                    "image": {"asset": {"_ref": "image-abc-1100x620-jpg"}},
                    "body": [{"_type": "block", "style": "normal", "children": [{"text": "Master body"}]}]
                }
            ],
            "sitePosts": {
                "us": [
                    {
                        "_id": "sp1",
                        "inheritanceEnabled": true,
                        "overriddenFields": ["title"],
                        "title": "Local <Title>",
                        "slug": null,
                        "masterPost": {
                            "_id": "m1",
                            "title": "Master Title",
                            "slug": {"current": "master-slug"},
                            "publishedAt": "2024-01-05T12:00:00Z",
                            "image": {"asset": {"_ref": "image-abc-1100x620-jpg"}},
                            "body": [{"_type": "block", "style": "normal", "children": [{"text": "Master body"}]}]
                        }
                    },
                    {
                        "_id": "sp2",
                        "inheritanceEnabled": false,
                        "title": null,
                        "masterPost": {"title": "Hidden", "slug": {"current": "hidden"}}
                    },
                    {"_id": "sp3", "title": "Orphan", "masterPost": null}
                ]
            }
        }))
        .unwrap()
    }

    fn generator(config: AppConfig) -> Generator {
        Generator::new(&config, Arc::new(MemoryStore::new(dataset()))).unwrap()
    }

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.cms.project_id = Some("proj".to_string());
        config.cms.dataset = Some("production".to_string());
        config
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/"), Some(Route::Index));
        assert_eq!(Route::parse(""), Some(Route::Index));
        assert_eq!(
            Route::parse("/us/"),
            Some(Route::Site {
                site_id: "us".to_string()
            })
        );
        assert_eq!(
            Route::parse("/us/hello%20world"),
            Some(Route::SitePost {
                site_id: "us".to_string(),
                slug: "hello world".to_string()
            })
        );
        assert_eq!(
            Route::parse("/posts/hello"),
            Some(Route::MasterPost {
                slug: "hello".to_string()
            })
        );
        assert_eq!(Route::parse("/a/b/c"), None);
    }

    #[tokio::test]
    async fn test_index_page() {
        let html = generator(AppConfig::default()).index_page().await.unwrap();
        assert!(html.contains("<h1>MSM POC</h1>"));
        assert!(html.contains(r#"href="/us""#));
        assert!(html.contains("United States"));
        assert!(!html.contains("No id"));
        assert!(html.contains(r#"href="/posts/master-slug""#));
        assert!(html.contains("1/5/2024"));
    }

    #[tokio::test]
    async fn test_site_page_uses_effective_fields() {
        let html = generator(AppConfig::default()).site_page("us").await.unwrap();
        assert!(html.contains("<h1>US Posts</h1>"));
        assert!(html.contains("Local &lt;Title&gt;"));
        assert!(html.contains(r#"href="/us/master-slug""#));
        assert!(!html.contains("Hidden"));
        assert!(!html.contains("Orphan"));
    }

    #[tokio::test]
    async fn test_site_page_empty() {
        let html = generator(AppConfig::default()).site_page("fr").await.unwrap();
        assert!(html.contains("<h1>FR Posts</h1>"));
        assert!(html.contains("No posts found for this site."));
    }

    #[tokio::test]
    async fn test_site_post_page() {
        let outcome = generator(configured())
            .site_post_page("us", "master-slug")
            .await
            .unwrap();
        assert!(outcome.is_found());
        let html = outcome.html();
        assert!(html.contains("<h1>Local &lt;Title&gt;</h1>"));
        assert!(html.contains("<p>Master body</p>"));
        assert!(html.contains(r#"href="/us">&larr; Back to US posts"#));
        assert!(html.contains(
            r#"src="https://cdn.sanity.io/images/proj/production/abc-1100x620.jpg?w=550&amp;h=310""#
        ));
        assert!(html.contains(r#"<meta name="description" content="Master body">"#));
    }

    #[tokio::test]
    async fn test_site_post_page_without_image_config() {
        let outcome = generator(AppConfig::default())
            .site_post_page("us", "master-slug")
            .await
            .unwrap();
        assert!(outcome.is_found());
        assert!(!outcome.html().contains("<img"));
    }

    #[tokio::test]
    async fn test_site_post_not_found() {
        let outcome = generator(AppConfig::default())
            .site_post_page("us", "nope")
            .await
            .unwrap();
        assert!(!outcome.is_found());
        assert!(outcome.html().contains("<h1>Post not found</h1>"));
        assert!(outcome.html().contains(r#"href="/us""#));
    }

    #[tokio::test]
    async fn test_master_post_page() {
        let gen = generator(AppConfig::default());
        let outcome = gen.render_path("/posts/master-slug").await.unwrap();
        assert!(outcome.is_found());
        assert!(outcome.html().contains("<h1>Master Title</h1>"));
        assert!(!gen.render_path("/posts/missing").await.unwrap().is_found());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let outcome = generator(AppConfig::default())
            .render_path("/a/b/c")
            .await
            .unwrap();
        assert!(outcome.html().contains("Page not found"));
        assert!(!outcome.is_found());
    }
}
