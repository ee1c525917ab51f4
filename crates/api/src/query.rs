//! Query-string extractors.

use serde::Deserialize;

/// `?limit=` for history endpoints. Clamped in the repository layer via
/// `clamp_limit`.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
