/// Errors from talking to a sensor board or camera.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The device answered with a non-2xx status code.
    #[error("Device responded with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Body as returned by the board, for logs.
        body: String,
    },

    /// The device answered, but with something we cannot use.
    #[error("Invalid device payload: {0}")]
    InvalidPayload(String),
}
