use super::dto::{
    BannerResponse, ConnectResponse, ConversationResponse, ErrorResponse, HealthResponse,
    MessageResponse, RestConnectRequest, RestQueryRequest, RestQueryResponse, StatusResponse,
    ToolSummary, ToolsResponse,
};
use super::routes;
use crate::types::{ConversationRole, ConversationTurn};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::root_handler,
        routes::health::health_handler,
        routes::session::connect_handler,
        routes::session::disconnect_handler,
        routes::session::status_handler,
        routes::session::tools_handler,
        routes::query::query_handler,
        routes::conversation::conversation_get_handler,
        routes::conversation::conversation_delete_handler
    ),
    components(
        schemas(
            RestConnectRequest,
            ConnectResponse,
            MessageResponse,
            RestQueryRequest,
            RestQueryResponse,
            StatusResponse,
            ToolsResponse,
            ToolSummary,
            ConversationResponse,
            ConversationTurn,
            ConversationRole,
            BannerResponse,
            HealthResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "health", description = "Liveness and banner"),
        (name = "session", description = "Connect to and inspect the MCP server"),
        (name = "query", description = "Ask Gemini, with the server's tools available"),
        (name = "conversation", description = "Conversation history")
    )
)]
pub(super) struct ApiDoc;
