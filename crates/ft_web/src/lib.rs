use axum::{
    routing::{get, post},
    Router,
};
use ft_core::{Error, Result};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Ports tried, starting at the requested one, before giving up.
pub const MAX_BIND_ATTEMPTS: u16 = 10;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    let api = Router::new()
        .route("/news", get(handlers::list_sources))
        .route("/news/:source", get(handlers::get_news))
        .route("/news/fourfourtwo/:league", get(handlers::get_fourfourtwo_news))
        .route("/scrape/:source", post(handlers::scrape_source))
        .route("/articles", get(handlers::list_articles))
        .route("/articles/:id", get(handlers::get_article))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `host:port`, moving to the next port while the address is taken.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let mut last_error = None;
    for attempt in 0..MAX_BIND_ATTEMPTS {
        let Some(candidate) = port.checked_add(attempt) else {
            break;
        };
        match TcpListener::bind((host, candidate)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                warn!(port = candidate, "Port is busy, trying the next one");
                last_error = Some(e);
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }
    let error = last_error.unwrap_or_else(|| {
        std::io::Error::new(ErrorKind::AddrNotAvailable, format!("No free port from {}", port))
    });
    Err(Error::Io(error))
}

/// Serves `app` until Ctrl-C or SIGTERM.
pub async fn serve(app: Router, host: &str, port: u16) -> Result<()> {
    let listener = bind(host, port).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "Football news API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use ft_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use ft_core::{ArticleStorage, ArticleStub, NewArticle, SourceId};
    use ft_scrapers::{PageFetcher, ScraperConfig, ScraperManager};
    use ft_storage::InMemoryStorage;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::time::Duration;
    use tower::ServiceExt;

    const GOAL_LISTING: &str = r#"
        <ul>
          <li><a href="/en-in/lists/top-10/blt1"><h3>Top 10 keepers</h3></a></li>
          <li><a href="/en-in/lists/top-5/blt2"><h3>Top 5 strikers</h3></a></li>
        </ul>
    "#;

    struct StaticFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages.get(url).cloned().ok_or_else(|| Error::HttpStatus {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    fn setup() -> (Router, Arc<InMemoryStorage>) {
        let pages = HashMap::from([
            ("https://www.goal.com/en-in/news".to_string(), GOAL_LISTING.to_string()),
            (
                "https://goal.com/en-in/lists/top-10/blt1".to_string(),
                r#"<h1>Top 10 goalkeepers</h1><div class="article-body"><p>One two three.</p></div>"#.to_string(),
            ),
        ]);
        let storage = Arc::new(InMemoryStorage::new());
        let config = ScraperConfig::default().with_request_delay(Duration::ZERO);
        let manager = ScraperManager::new(storage.clone(), Arc::new(StaticFetcher { pages }), config);
        (create_app(AppState::new(Arc::new(manager))), storage)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    async fn seed(storage: &InMemoryStorage, n: usize) {
        for i in 0..n {
            storage
                .insert_article(NewArticle {
                    source: SourceId::FourFourTwoUcl,
                    title: format!("Article {}", i),
                    original_title: None,
                    url: format!("https://www.fourfourtwo.com/news/{}", i),
                    image: None,
                    description: None,
                    content: Some("word ".repeat(450)),
                    published_at: None,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_source_catalogue() {
        let (app, _) = setup();
        let (status, body) = send(&app, get("/api/news")).await;
        assert_eq!(status, StatusCode::OK);
        let sources = body.as_array().unwrap();
        assert_eq!(sources.len(), SourceId::ALL.len());
        assert!(sources
            .iter()
            .any(|s| s["id"] == "fourfourtwo-ucl" && s["category"] == "ucl"));
    }

    #[tokio::test]
    async fn test_unknown_source_is_bad_request() {
        let (app, _) = setup();
        let (status, body) = send(&app, get("/api/news/bbc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid source: bbc");

        let (status, _) = send(&app, post_json("/api/scrape/bbc", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_listing_fetch_failure_is_server_error() {
        let (app, _) = setup();
        let (status, body) = send(&app, get("/api/news/fourfourtwo/epl")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_scrape_without_listing_returns_hint() {
        let (app, _) = setup();
        let (status, body) = send(&app, post_json("/api/scrape/goal", r#"{"limit": 3}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scraped"], 0);
        assert_eq!(body["totalFound"], 0);
        assert_eq!(body["hint"], "Call GET /api/news/goal first, then try scraping again.");
    }

    #[tokio::test]
    async fn test_listing_then_scrape() {
        let (app, storage) = setup();
        let (status, body) = send(&app, get("/api/news/goal")).await;
        assert_eq!(status, StatusCode::OK);
        let stubs: Vec<ArticleStub> = serde_json::from_value(body).unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].url, "https://goal.com/en-in/lists/top-10/blt1");

        // No body at all falls back to the default limit.
        let request = Request::builder()
            .method("POST")
            .uri("/api/scrape/goal")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "goal");
        assert_eq!(body["totalFound"], 2);
        // The second article page is unavailable and gets skipped.
        assert_eq!(body["scraped"], 1);
        assert_eq!(body["articles"][0]["title"], "Top 10 goalkeepers");
        assert_eq!(body["articles"][0]["originalTitle"], "Top 10 keepers");
        assert_eq!(body["articles"][0]["wordCount"], 3);
        assert_eq!(body["articles"][0]["readingTime"], 1);
        assert_eq!(body["articles"][0]["category"], "general");

        assert_eq!(
            storage.count_articles(&Default::default()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_articles_pagination() {
        let (app, storage) = setup();
        seed(&storage, 5).await;

        let (status, body) = send(&app, get("/api/articles?limit=2&page=3&category=ucl")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["articles"].as_array().unwrap().len(), 1);
        assert!(body["articles"][0].get("content").is_none());
        assert_eq!(body["articles"][0]["readingTime"], 3);
        assert_eq!(body["pagination"]["page"], 3);
        assert_eq!(body["pagination"]["total"], 5);
        assert_eq!(body["pagination"]["totalPages"], 3);

        let (_, body) = send(&app, get("/api/articles?limit=500&page=0")).await;
        assert_eq!(body["pagination"]["limit"], 100);
        assert_eq!(body["pagination"]["page"], 1);

        let (status, _) = send(&app, get("/api/articles?category=serie-a")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_single_article() {
        let (app, storage) = setup();
        seed(&storage, 1).await;

        let (status, body) = send(&app, get("/api/articles/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert!(body["content"].as_str().is_some());

        let (status, body) = send(&app, get("/api/articles/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Article not found");

        let (status, _) = send(&app, get("/api/articles/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, storage) = setup();
        seed(&storage, 2).await;

        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["database"], "memory connected");
        assert_eq!(body["totalArticles"], 2);
        assert_eq!(body["articlesLast24h"], 2);
    }

    #[tokio::test]
    async fn test_bind_skips_busy_port() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let listener = bind("127.0.0.1", port).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), port);
    }
}
