use super::super::dto::{
    ConnectResponse, ErrorResponse, MessageResponse, RestConnectRequest, StatusResponse,
    ToolsResponse,
};
use super::super::state::ServerState;
use crate::application::bridge::{BridgeError, ConnectRequest};
use crate::infrastructure::model::ModelProvider;
use crate::types::LaunchSpec;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{debug, error, info};

type ApiError = (StatusCode, Json<ErrorResponse>);

#[utoipa::path(
    post,
    path = "/api/connect",
    tag = "session",
    request_body = RestConnectRequest,
    responses(
        (status = 200, description = "Connected; lists the server's tools", body = ConnectResponse),
        (status = 400, description = "Missing server command", body = ErrorResponse),
        (status = 500, description = "Server could not be started or did not complete the handshake", body = ErrorResponse)
    )
)]
pub async fn connect_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<RestConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let RestConnectRequest {
        api_key,
        server_command,
        server_args,
        env_vars,
    } = payload;

    info!(
        command = server_command.as_str(),
        args = ?server_args,
        "Received /api/connect request"
    );

    if server_command.trim().is_empty() {
        error!("Rejecting /api/connect request due to empty server command");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("server_command cannot be empty")),
        ));
    }

    let launch = LaunchSpec::new(server_command)
        .with_args(server_args)
        .with_env(env_vars.unwrap_or_default());
    let request = ConnectRequest::new(launch).with_api_key(api_key);

    match state.bridge().connect(request).await {
        Ok(outcome) => Ok(Json(ConnectResponse::connected(
            outcome.message,
            outcome.tools,
        ))),
        Err(err) => {
            error!(%err, "Failed to connect to MCP server");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(err.user_message())),
            ))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/disconnect",
    tag = "session",
    responses(
        (status = 200, description = "Disconnected (also when nothing was connected)", body = MessageResponse)
    )
)]
pub async fn disconnect_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
) -> Json<MessageResponse> {
    let message = state.bridge().disconnect().await;
    Json(MessageResponse {
        success: true,
        message,
    })
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "session",
    responses(
        (status = 200, description = "Connection state and cached tool catalog", body = StatusResponse)
    )
)]
pub async fn status_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
) -> Json<StatusResponse> {
    Json(state.bridge().status().into())
}

#[utoipa::path(
    get,
    path = "/api/tools",
    tag = "session",
    responses(
        (status = 200, description = "Tools freshly listed by the server", body = ToolsResponse),
        (status = 400, description = "No active MCP connection", body = ErrorResponse),
        (status = 500, description = "Server failed to list its tools", body = ErrorResponse)
    )
)]
pub async fn tools_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
) -> Result<Json<ToolsResponse>, ApiError> {
    match state.bridge().tools().await {
        Ok(tools) => {
            debug!(tool_count = tools.len(), "Serving /api/tools request");
            Ok(Json(tools.into()))
        }
        Err(BridgeError::NotConnected) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No active MCP connection")),
        )),
        Err(err) => {
            error!(%err, "Failed to list tools");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!(
                    "Failed to get tools: {}",
                    err.user_message()
                ))),
            ))
        }
    }
}
