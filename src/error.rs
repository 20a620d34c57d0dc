use axum::http::StatusCode;
use thiserror::Error;

/// Failures surfaced while authenticating, decoding or dispatching a webhook delivery.
///
/// Every variant is recoverable: callers answer the request and keep serving.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook authentication failed: {0}")]
    Authentication(String),

    #[error("malformed webhook envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("webhook envelope has no eventType")]
    MissingEventType,

    #[error("unknown eventType in webhook payload: {tag}")]
    UnknownEventType { tag: String },

    #[error("failed to decode {event_type} resource at `{path}`: {reason}")]
    PayloadDecode {
        event_type: String,
        path: String,
        reason: String,
    },
}

impl WebhookError {
    /// HTTP status a webhook receiver should answer with for this failure.
    ///
    /// Unknown event types are acknowledged so the service does not redeliver them.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Authentication(_) => StatusCode::UNAUTHORIZED,
            WebhookError::MalformedEnvelope(_) | WebhookError::MissingEventType => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::UnknownEventType { .. } => StatusCode::ACCEPTED,
            WebhookError::PayloadDecode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Failures from the Azure DevOps REST client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} responded with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("decoding json response from {url} failed: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
