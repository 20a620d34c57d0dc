use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de};
use serde_json::value::RawValue;

use super::dispatch::Resource;
use crate::error::WebhookError;
use crate::models::ResourceRef;

/// Notification text in the formats the service renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

/// The collection, account and project the notification's resource belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContainers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<ResourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<ResourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ResourceRef>,
}

/// A service-hook notification envelope.
///
/// The inner `resource` is kept verbatim until [`Event::dispatch`] decodes it
/// according to `eventType`; the decoded value is then available from
/// [`Event::resource`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_message: Option<Message>,
    #[serde(default, rename = "resource", skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_containers: Option<ResourceContainers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub(crate) resource: Option<Resource>,
}

impl Event {
    /// Decodes the outer envelope, leaving the inner resource undecoded.
    pub fn from_slice(payload: &[u8]) -> Result<Self, WebhookError> {
        // serde would otherwise accept a JSON array as a positional struct
        if payload.trim_ascii_start().first() == Some(&b'[') {
            return Err(WebhookError::MalformedEnvelope(de::Error::custom(
                "expected a JSON object, found an array",
            )));
        }
        serde_json::from_slice(payload).map_err(WebhookError::MalformedEnvelope)
    }

    /// An envelope carrying `event_type` and a raw JSON resource, as the service would send it.
    pub fn with_payload(
        event_type: impl Into<String>,
        resource: impl Into<String>,
    ) -> Result<Self, WebhookError> {
        let raw = RawValue::from_string(resource.into()).map_err(WebhookError::MalformedEnvelope)?;
        Ok(Self {
            event_type: Some(event_type.into()),
            raw_payload: Some(raw),
            ..Default::default()
        })
    }

    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// The undecoded `resource` JSON text.
    pub fn raw_resource(&self) -> Option<&str> {
        self.raw_payload.as_deref().map(RawValue::get)
    }

    /// The decoded resource; `None` until a dispatch has succeeded.
    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn into_resource(self) -> Option<Resource> {
        self.resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_envelope_and_keeps_resource_verbatim() {
        let event = Event::from_slice(
            br#"{
                "subscriptionId": "00000000-0000-0000-0000-000000000000",
                "notificationId": 1,
                "id": "2ab4e3d3-b7a6-425e-92b1-5a9982c1269e",
                "eventType": "git.pullrequest.created",
                "publisherId": "tfs",
                "message": { "text": "Jamal Hartnett created a new pull request", "markdown": "Jamal Hartnett created a new pull request" },
                "resource": {"pullRequestId":1,"status":"active"},
                "resourceVersion": "1.0-preview.1",
                "resourceContainers": {
                    "collection": { "id": "c12d0eb8-e382-443b-9f9c-c52cba5014c2" },
                    "account": { "id": "f844ec47-a9db-4511-8281-8b63f4eaf94e" },
                    "project": { "id": "be9b3917-87e6-42a4-a549-2bc06a7a878f", "baseUrl": "https://dev.azure.com/fabrikam/" }
                },
                "createdDate": "2016-09-19T13:03:27.2879096Z"
            }"#,
        )
        .unwrap();

        assert_eq!(event.event_type(), Some("git.pullrequest.created"));
        assert_eq!(event.notification_id, Some(1));
        assert_eq!(event.raw_resource(), Some(r#"{"pullRequestId":1,"status":"active"}"#));
        assert_eq!(
            event
                .resource_containers
                .as_ref()
                .and_then(|c| c.project.as_ref())
                .and_then(|p| p.base_url.as_deref()),
            Some("https://dev.azure.com/fabrikam/")
        );
        assert_eq!(
            event.message.as_ref().and_then(|m| m.text.as_deref()),
            Some("Jamal Hartnett created a new pull request")
        );
        assert!(event.created_date.is_some());
        assert!(event.resource().is_none());
    }

    #[test]
    fn event_type_is_optional_at_decode_time() {
        let event = Event::from_slice(br#"{"id":"abc","resource":{}}"#).unwrap();
        assert_eq!(event.event_type(), None);
        assert_eq!(event.raw_resource(), Some("{}"));
    }

    #[test]
    fn malformed_bytes_are_rejected() {
        for payload in [
            &b"not json"[..],
            b"",
            b"[1,2,3]",
            b"[]",
            b"{\"eventType\": 42}",
            b"{\"notificationId\": \"one\"}",
            b"{\"createdDate\": \"yesterday\"}",
            b"{\"eventType\": \"git.push\"",
        ] {
            assert!(
                matches!(
                    Event::from_slice(payload),
                    Err(WebhookError::MalformedEnvelope(_))
                ),
                "{:?} should be malformed",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn reserializes_without_unset_fields() {
        let event = Event::with_payload("git.push", r#"{"pushId":14}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"eventType":"git.push","resource":{"pushId":14}}"#
        );
    }
}
