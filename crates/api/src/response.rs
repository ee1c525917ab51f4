//! Success envelope for JSON endpoints.

use serde::Serialize;

/// `{"data": ...}`. Errors use [`crate::error::AppError`]'s body instead;
/// `/health` and binary camera responses are unwrapped.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
