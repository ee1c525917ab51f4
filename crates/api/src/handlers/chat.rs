//! Conversational assistant endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use museum_core::chat::fallback_reply;
use museum_core::error::CoreError;
use museum_core::types::{DbId, Timestamp};
use museum_db::repositories::ExhibitRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub context: Option<String>,
    pub exhibit_id: Option<DbId>,
}

/// Which path produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Llm,
    Fallback,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: ReplySource,
    pub timestamp: Timestamp,
}

/// POST /api/v1/chat
///
/// Answer with the LLM when configured, grounded in the exhibit's latest
/// stored conditions if `exhibit_id` names one. Any LLM failure degrades to
/// the keyword reply rather than an error.
pub async fn chat(
    State(state): State<AppState>,
    Json(input): Json<ChatRequest>,
) -> AppResult<impl IntoResponse> {
    let message = input.message.trim();
    if message.is_empty() {
        return Err(CoreError::Validation("message must not be empty".into()).into());
    }

    let (response, source) = match &state.chat {
        Some(client) => {
            let snapshot = match input.exhibit_id {
                Some(id) => match ExhibitRepo::find_by_id(&state.pool, id).await? {
                    Some(exhibit) => state.monitor.latest_snapshot(&exhibit).await?,
                    None => None,
                },
                None => None,
            };

            match client
                .reply(message, input.context.as_deref(), snapshot.as_ref())
                .await
            {
                Ok(text) => (text, ReplySource::Llm),
                Err(e) => {
                    tracing::warn!(error = %e, "LLM request failed, using keyword reply");
                    (fallback_reply(message), ReplySource::Fallback)
                }
            }
        }
        None => (fallback_reply(message), ReplySource::Fallback),
    };

    Ok(Json(DataResponse {
        data: ChatResponse {
            response,
            source,
            timestamp: Utc::now(),
        },
    }))
}
