use axum::routing::post;
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// `POST /chat` -> chat
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat::chat))
}
