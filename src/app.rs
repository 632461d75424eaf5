use axum::{
    http::{HeaderName, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::TokenKeys;
use crate::config::Settings;
use crate::middleware::{request_id_layer, X_REQUEST_ID};
use crate::routes;
use crate::storage::Storage;

/// Shared application state
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub settings: Settings,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, settings: Settings) -> Arc<Self> {
        let tokens = TokenKeys::new(&settings.jwt_secret, settings.jwt_ttl_seconds);
        Arc::new(Self {
            storage,
            settings,
            tokens,
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(&state.settings);

    // Build trace layer (use DEBUG for spans to reduce overhead at INFO level)
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Request ID layers
    let (set_request_id, propagate_request_id) = request_id_layer();

    let body_limit = RequestBodyLimitLayer::new(state.settings.request_body_limit_bytes);

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(body_limit)
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Longer preflight cache in development
    let max_age = if settings.env.is_dev() {
        std::time::Duration::from_secs(86400)
    } else {
        std::time::Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            HeaderName::from_static(X_REQUEST_ID),
        ]))
        .allow_credentials(true)
        .max_age(max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, LogFormat};
    use crate::storage::MemoryStorage;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let settings = Settings {
            env: Environment::Dev,
            log_format: LogFormat::Compact,
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            database_max_connections: 1,
            database_connect_retry_seconds: 1,
            cors_allow_origins: vec!["http://localhost:5000".to_string()],
            jwt_secret: "router-test-secret-router-test".to_string(),
            jwt_ttl_seconds: 60,
            admin_username: "admin".to_string(),
            admin_password: "secret123".to_string(),
            admin_email: "admin@example.com".to_string(),
            auto_approve_listings: false,
            request_body_limit_bytes: 256,
        };
        create_app(AppState::new(Arc::new(MemoryStorage::new()), settings))
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let body = format!("{{\"name\":\"{}\"}}", "x".repeat(1024));
        let res = app()
            .oneshot(
                Request::post("/api/products")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, body.len())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn oversized_chunked_bodies_are_rejected_the_same_way() {
        let chunks = (0..8).map(|_| Ok::<_, std::io::Error>(vec![b' '; 128]));
        let res = app()
            .oneshot(
                Request::post("/api/products")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from_stream(futures::stream::iter(chunks)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn bodies_without_json_content_type_are_unsupported() {
        let res = app()
            .oneshot(
                Request::post("/api/products")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn preflight_allows_configured_origin() {
        let res = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/products")
                    .header(header::ORIGIN, "http://localhost:5000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5000"
        );
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let res = app()
            .oneshot(
                Request::get("/health")
                    .header(X_REQUEST_ID, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(X_REQUEST_ID).unwrap(), "req-42");
    }
}
