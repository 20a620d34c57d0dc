//! Service-hook ingestion: authenticate a delivery, decode its envelope and
//! dispatch the inner resource to a typed shape by `eventType`.

pub mod auth;
pub mod dispatch;
pub mod envelope;
pub mod registry;

pub use auth::{
    BasicCredentials, WebhookCredentials, activity_id, request_id, subscription_id,
    validate_payload,
};
pub use dispatch::{Resource, decode_resource, parse_webhook};
pub use envelope::{Event, Message, ResourceContainers};
pub use registry::{EventType, ResourceKind};
