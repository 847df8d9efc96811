use super::super::dto::{ConversationResponse, MessageResponse};
use super::super::state::ServerState;
use crate::infrastructure::model::ModelProvider;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/conversation",
    tag = "conversation",
    responses(
        (status = 200, description = "Conversation so far, oldest first", body = ConversationResponse)
    )
)]
pub async fn conversation_get_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
) -> Json<ConversationResponse> {
    let conversation = state.bridge().conversation();
    let length = conversation.len();
    Json(ConversationResponse {
        conversation,
        length,
    })
}

#[utoipa::path(
    delete,
    path = "/api/conversation",
    tag = "conversation",
    responses(
        (status = 200, description = "Conversation cleared", body = MessageResponse)
    )
)]
pub async fn conversation_delete_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
) -> Json<MessageResponse> {
    state.bridge().clear_conversation();
    Json(MessageResponse {
        success: true,
        message: "Conversation history cleared".to_string(),
    })
}
