use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::State,
    http::{self, HeaderMap, HeaderName, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    graphql::{RequestUser, SchemaType},
};

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "talent server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([
            http::header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/graphql", get(graphql_handler).post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// The gateway authenticates; a missing or unparsable header means an anonymous call.
pub fn request_user(headers: &HeaderMap) -> Option<RequestUser> {
    let raw = headers.get(USER_ID_HEADER)?;
    match raw.to_str().ok().and_then(|text| text.trim().parse::<i64>().ok()) {
        Some(id) if id > 0 => Some(RequestUser { id }),
        _ => {
            warn!(header = USER_ID_HEADER, "ignoring malformed caller id");
            None
        }
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(user) = request_user(&headers) {
        request = request.data(user);
    }
    state.schema.execute(request).await.into()
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = state
        .db
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::{GraphqlData, build_schema};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use products_talent::cv_token::JwtTokenProvider;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    fn state() -> AppState {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let schema = build_schema(GraphqlData {
            db: db.clone(),
            tokens: Arc::new(JwtTokenProvider::new("test-secret")),
            public_cv_base_url: "https://cv.example/".into(),
        });
        AppState {
            db,
            schema,
            config: Arc::new(AppConfig {
                cors_allowed_origins: vec!["http://localhost:4200".into()],
                public_cv_base_url: "https://cv.example/".into(),
                cv_token_secret: "test-secret".into(),
            }),
        }
    }

    #[test]
    fn caller_id_comes_from_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_user(&headers), None);
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" 42 "));
        assert_eq!(request_user(&headers), Some(RequestUser { id: 42 }));
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("admin"));
        assert_eq!(request_user(&headers), None);
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("0"));
        assert_eq!(request_user(&headers), None);
    }

    #[tokio::test]
    async fn graphql_post_is_routed_with_request_id() {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"query":"{ health { ok } }"}"#))
            .unwrap();
        let response = build_router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["health"]["ok"], serde_json::json!(true));
    }
}
