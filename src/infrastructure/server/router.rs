use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::application::bridge::Bridge;
use crate::config::RestConfig;
use crate::infrastructure::model::ModelProvider;
use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Every route of the API, bound to `bridge`. An empty origin list allows any origin.
pub fn build_router<P>(bridge: Arc<Bridge<P>>, cors_origins: &[String]) -> Router
where
    P: ModelProvider + 'static,
{
    let state = Arc::new(ServerState::new(bridge));
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/", get(routes::health::root_handler))
        .route("/health", get(routes::health::health_handler))
        .route("/api/connect", post(routes::session::connect_handler::<P>))
        .route("/api/disconnect", post(routes::session::disconnect_handler::<P>))
        .route("/api/query", post(routes::query::query_handler::<P>))
        .route("/api/status", get(routes::session::status_handler::<P>))
        .route("/api/tools", get(routes::session::tools_handler::<P>))
        .route(
            "/api/conversation",
            get(routes::conversation::conversation_get_handler::<P>)
                .delete(routes::conversation::conversation_delete_handler::<P>),
        )
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

pub(super) async fn serve<P>(bridge: Arc<Bridge<P>>, config: &RestConfig) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    let addr = config.bind;
    info!(%addr, "Binding REST server");
    let app = build_router(Arc::clone(&bridge), &config.cors_origins);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve);

    bridge.shutdown().await;
    served
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(origin = origin.as_str(), %err, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down REST server");
}
