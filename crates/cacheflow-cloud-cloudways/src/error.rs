//! Cloudways provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudwaysError {
    #[error("authentication failed, no access token in response: {0}")]
    AuthenticationFailed(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("unexpected response from Cloudways API: {0}")]
    UnexpectedResponse(String),

    #[error("operation {operation_id} did not complete after {attempts} attempts")]
    Timeout { operation_id: String, attempts: u32 },

    #[error("invalid server id: {0:?} is not a number")]
    InvalidServerId(String),

    #[error("invalid varnish action: {0:?} (expected enable, disable or purge)")]
    InvalidAction(String),

    #[error("environment variable not set: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudwaysError>;
