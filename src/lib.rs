pub mod azure_client;
pub mod config;
pub mod error;
pub mod models;
pub mod webhook;

pub use azure_client::AzureDevOpsClient;
pub use config::Config;
pub use error::{ClientError, WebhookError};
pub use models::*;
pub use webhook::{
    Event, EventType, Resource, ResourceKind, WebhookCredentials, parse_webhook, validate_payload,
};
