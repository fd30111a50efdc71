use thiserror::Error;

/// Errors from talking to the MASFD service. Calls either succeed or surface
/// the failure to the caller, there is no retry logic.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service returned status {status}: {body}")]
    Service { status: u16, body: String },
}

impl ClientError {
    pub fn service(status: u16, body: impl Into<String>) -> Self {
        Self::Service {
            status,
            body: body.into(),
        }
    }
}
