//! HTTP server for the Prometheus metrics endpoint.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::registry::{self, CONTENT_TYPE};
use crate::scrape::SharedExporter;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    exporter: SharedExporter,
    metrics_path: String,
}

/// Create the HTTP router.
fn create_router(exporter: SharedExporter, metrics_path: &str) -> Router {
    let state = AppState {
        exporter,
        metrics_path: metrics_path.to_string(),
    };

    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/", get(landing_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the metrics endpoint. Every request triggers a scrape.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match registry::collect(&state.exporter).await {
        Ok(body) => (StatusCode::OK, [("content-type", CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to encode metrics\n",
            )
                .into_response()
        }
    }
}

/// Handler for `/`.
async fn landing_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>BunnyCDN Exporter</title></head>\n\
         <body>\n\
         <h1>BunnyCDN Exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// HTTP server configuration.
pub struct HttpServer {
    exporter: SharedExporter,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(exporter: SharedExporter, listen_addr: SocketAddr, metrics_path: String) -> Self {
        Self {
            exporter,
            listen_addr,
            metrics_path,
        }
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let router = create_router(self.exporter, &self.metrics_path);

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrapeConfig;
    use crate::metrics::MetricSet;
    use crate::scrape::Exporter;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use bunnycdn_api::{ApiClient, ApiConfig};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Exporter pointed at a port nothing listens on.
    fn make_exporter() -> SharedExporter {
        let client = ApiClient::new(&ApiConfig {
            uri: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(1),
            ..Default::default()
        })
        .unwrap();
        Arc::new(Exporter::new(
            client,
            Arc::new(MetricSet::default()),
            ScrapeConfig::default(),
        ))
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let router = create_router(make_exporter(), "/metrics");

        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert!(
            content_type
                .to_str()
                .unwrap()
                .contains("application/openmetrics-text")
        );

        // API unreachable: the scrape is reported as down, not as an HTTP error
        let body = body_string(response).await;
        assert!(body.contains("bunnycdn_up 0"), "{}", body);
        assert!(body.contains("bunnycdn_exporter_total_errors_total 1"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = create_router(make_exporter(), "/metrics");

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_landing_page_links_metrics() {
        let router = create_router(make_exporter(), "/bunny/metrics");

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("<h1>BunnyCDN Exporter</h1>"));
        assert!(body.contains("href='/bunny/metrics'"));
    }

    #[tokio::test]
    async fn test_custom_metrics_path() {
        let router = create_router(make_exporter(), "/prometheus/metrics");

        // Custom path should work
        let response = router
            .clone()
            .oneshot(
                Request::get("/prometheus/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Default path should 404
        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
