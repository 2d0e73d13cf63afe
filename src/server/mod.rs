//! HTTP server rendering pages on request

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::generator::{Generator, PageOutcome};

/// Server state
struct ServerState {
    generator: Arc<Generator>,
    cache_control: String,
}

/// Build the application router
pub fn router(generator: Arc<Generator>, revalidate_secs: u64) -> Router {
    let cache_control = if revalidate_secs == 0 {
        "no-store".to_string()
    } else {
        format!(
            "public, s-maxage={}, stale-while-revalidate",
            revalidate_secs
        )
    };

    let state = Arc::new(ServerState {
        generator,
        cache_control,
    });

    Router::new()
        .route("/healthz", get(health_handler))
        .fallback(page_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn start(
    generator: Arc<Generator>,
    revalidate_secs: u64,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let app = router(generator, revalidate_secs);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Render any other path as a page route
async fn page_handler(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    match state.generator.render_path(uri.path()).await {
        Ok(PageOutcome::Found(html)) => (
            [(header::CACHE_CONTROL, state.cache_control.clone())],
            Html(html),
        )
            .into_response(),
        Ok(PageOutcome::NotFound(html)) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render {}: {:#}", uri.path(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{CmsError, ContentStore, Dataset, MemoryStore, SanityClient};
    use crate::config::{AppConfig, CmsConfig};
    use crate::content::{MasterPost, Site, SitePost};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use httpmock::MockServer;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Store whose every query fails
    struct FailingStore;

    #[async_trait]
    impl ContentStore for FailingStore {
        async fn sites(&self) -> crate::cms::Result<Vec<Site>> {
            Err(CmsError::Config {
                message: "offline".to_string(),
            })
        }
        async fn master_posts(&self) -> crate::cms::Result<Vec<MasterPost>> {
            Ok(Vec::new())
        }
        async fn master_post(&self, _slug: &str) -> crate::cms::Result<Option<MasterPost>> {
            Ok(None)
        }
        async fn site_posts(&self, _site_id: &str) -> crate::cms::Result<Vec<SitePost>> {
            Ok(Vec::new())
        }
        async fn site_post_documents(&self, _site_id: &str) -> crate::cms::Result<Vec<SitePost>> {
            Ok(Vec::new())
        }
    }

    fn app_with(store: Arc<dyn ContentStore>) -> Router {
        let generator = Generator::new(&AppConfig::default(), store).unwrap();
        router(Arc::new(generator), 5)
    }

    fn app() -> Router {
        let dataset: Dataset = serde_json::from_value(json!({
            "sites": [{"_id": "s1", "title": "US", "siteId": "us"}],
            "sitePosts": {
                "us": [{
                    "_id": "sp1",
                    "masterPost": {"title": "Hello", "slug": {"current": "hello"}}
                }]
            }
        }))
        .unwrap();
        app_with(Arc::new(MemoryStore::new(dataset)))
    }

    async fn get(app: Router, path: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_pages_render() {
        let (status, body) = get(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/us""#));

        let (status, body) = get(app(), "/us").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/us/hello""#));

        let (status, body) = get(app(), "/us/hello").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Hello</h1>"));
    }

    #[tokio::test]
    async fn test_cache_control_header() {
        let response = app()
            .oneshot(Request::builder().uri("/us").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, s-maxage=5, stale-while-revalidate"
        );
    }

    #[tokio::test]
    async fn test_missing_post_is_404_page() {
        let (status, body) = get(app(), "/us/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Post not found"));
        assert!(body.contains("Back to US posts"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_500() {
        let (status, _) = get(app_with(Arc::new(FailingStore)), "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_listing_tolerates_date_only_published_at() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .query_param("$siteId", "\"us\"");
                then.status(200).json_body(json!({
                    "result": [
                        {
                            "_id": "sp1",
                            "masterPost": {
                                "title": "Dated",
                                "slug": {"current": "dated"},
                                "publishedAt": "2024-03-01T08:00:00Z"
                            }
                        },
                        {
                            "_id": "sp2",
                            "overriddenFields": ["publishedAt"],
                            "publishedAt": "2024-01-02",
                            "masterPost": {"title": "Day only", "slug": {"current": "day-only"}}
                        },
                        {
                            "_id": "sp3",
                            "masterPost": {
                                "title": "Garbled",
                                "slug": {"current": "garbled"},
                                "publishedAt": "sometime"
                            }
                        }
                    ]
                }));
            })
            .await;

        let cms = CmsConfig {
            project_id: Some("proj".to_string()),
            dataset: Some("production".to_string()),
            api_host: Some(server.base_url()),
            ..CmsConfig::default()
        };
        let client = SanityClient::new(&cms, Duration::ZERO).unwrap();
        let (status, body) = get(app_with(Arc::new(client)), "/us").await;

        assert_eq!(status, StatusCode::OK);
        let dated = body.find("Dated").unwrap();
        let day_only = body.find("Day only").unwrap();
        let garbled = body.find("Garbled").unwrap();
        assert!(dated < day_only && day_only < garbled);
        assert!(body.contains("1/2/2024"));
    }

    #[tokio::test]
    async fn test_post_method_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
