use super::super::dto::{BannerResponse, HealthResponse};
use axum::Json;

const SERVICE_NAME: &str = "Gemini MCP Client API";

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service banner", body = BannerResponse)
    )
)]
pub async fn root_handler() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: format!("{SERVICE_NAME} is running"),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Liveness check", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
