/// Errors from the LLM or detector services.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status code.
    #[error("Service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with JSON we could not interpret.
    #[error("Invalid service response: {0}")]
    InvalidResponse(String),
}

/// Turn a non-2xx response into [`AssistantError::Status`], keeping a
/// bounded excerpt of the body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, AssistantError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AssistantError::Status {
            status: status.as_u16(),
            body: truncate(&body, 320),
        });
    }
    Ok(response)
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}
