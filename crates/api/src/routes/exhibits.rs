use axum::routing::get;
use axum::Router;

use crate::handlers::{exhibits, monitor, readings};
use crate::state::AppState;

/// Exhibit routes mounted at `/exhibits`.
///
/// ```text
/// GET    /                -> list_exhibits
/// POST   /                -> create_exhibit
/// GET    /{id}            -> get_exhibit
/// PUT    /{id}            -> update_exhibit
/// DELETE /{id}            -> delete_exhibit
/// GET    /{id}/monitor    -> monitor_exhibit
/// GET    /{id}/readings   -> list_readings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(exhibits::list_exhibits).post(exhibits::create_exhibit),
        )
        .route(
            "/{id}",
            get(exhibits::get_exhibit)
                .put(exhibits::update_exhibit)
                .delete(exhibits::delete_exhibit),
        )
        .route("/{id}/monitor", get(monitor::monitor_exhibit))
        .route("/{id}/readings", get(readings::list_readings))
}
