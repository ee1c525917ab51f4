pub mod anomaly;
pub mod camera;
pub mod chat;
pub mod esp32;
pub mod exhibits;
pub mod monitor;
pub mod readings;

use museum_core::error::CoreError;
use museum_core::types::DbId;
use museum_db::models::exhibit::Exhibit;
use museum_db::repositories::ExhibitRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// Load an exhibit or fail with 404.
pub(crate) async fn require_exhibit(state: &AppState, id: DbId) -> AppResult<Exhibit> {
    ExhibitRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Exhibit", id }.into())
}
