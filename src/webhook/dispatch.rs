use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use super::envelope::Event;
use super::registry::{EventType, ResourceKind};
use crate::error::WebhookError;
use crate::models::{GitPullRequest, GitPush, WorkItem, WorkItemUpdate};

/// A decoded notification resource, one variant per shape in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    PullRequest(GitPullRequest),
    Push(GitPush),
    WorkItem(WorkItem),
    WorkItemUpdate(WorkItemUpdate),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::PullRequest(_) => ResourceKind::PullRequest,
            Resource::Push(_) => ResourceKind::Push,
            Resource::WorkItem(_) => ResourceKind::WorkItem,
            Resource::WorkItemUpdate(_) => ResourceKind::WorkItemUpdate,
        }
    }

    pub fn as_pull_request(&self) -> Option<&GitPullRequest> {
        match self {
            Resource::PullRequest(pr) => Some(pr),
            _ => None,
        }
    }

    pub fn as_push(&self) -> Option<&GitPush> {
        match self {
            Resource::Push(push) => Some(push),
            _ => None,
        }
    }

    pub fn as_work_item(&self) -> Option<&WorkItem> {
        match self {
            Resource::WorkItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_work_item_update(&self) -> Option<&WorkItemUpdate> {
        match self {
            Resource::WorkItemUpdate(update) => Some(update),
            _ => None,
        }
    }
}

/// Decodes a raw resource into the shape registered for `event_type`.
///
/// Pure in `(event_type, raw)`: unknown members are ignored, type mismatches
/// fail with the JSON path of the offending member.
pub fn decode_resource(event_type: EventType, raw: &RawValue) -> Result<Resource, WebhookError> {
    match event_type.resource_kind() {
        ResourceKind::PullRequest => decode(event_type, raw).map(Resource::PullRequest),
        ResourceKind::Push => decode(event_type, raw).map(Resource::Push),
        ResourceKind::WorkItem => decode(event_type, raw).map(Resource::WorkItem),
        ResourceKind::WorkItemUpdate => decode(event_type, raw).map(Resource::WorkItemUpdate),
    }
}

fn decode<T: DeserializeOwned>(event_type: EventType, raw: &RawValue) -> Result<T, WebhookError> {
    // every shape is a struct, and serde would read an array positionally
    if raw.get().trim_start().starts_with('[') {
        return Err(WebhookError::PayloadDecode {
            event_type: event_type.to_string(),
            path: ".".to_string(),
            reason: "expected a JSON object, found an array".to_string(),
        });
    }
    let de = &mut serde_json::Deserializer::from_str(raw.get());
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        WebhookError::PayloadDecode {
            event_type: event_type.to_string(),
            path,
            reason: err.into_inner().to_string(),
        }
    })
}

impl Event {
    /// Decodes the raw resource according to `eventType` and attaches it to the envelope.
    ///
    /// On any error the envelope is left as it was.
    pub fn dispatch(&mut self) -> Result<&Resource, WebhookError> {
        let tag = self
            .event_type
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .ok_or(WebhookError::MissingEventType)?;
        let event_type = EventType::lookup(tag).ok_or_else(|| WebhookError::UnknownEventType {
            tag: tag.to_string(),
        })?;
        let raw = self
            .raw_payload
            .as_deref()
            .ok_or_else(|| WebhookError::PayloadDecode {
                event_type: event_type.to_string(),
                path: "resource".to_string(),
                reason: "notification carries no resource".to_string(),
            })?;

        let resource = decode_resource(event_type, raw)?;
        tracing::debug!(
            event_type = %event_type,
            notification_id = ?self.notification_id,
            "decoded webhook resource"
        );
        Ok(&*self.resource.insert(resource))
    }
}

/// Decodes an envelope and, when it names an event type, dispatches its resource.
///
/// Envelopes without an `eventType` are returned undispatched.
pub fn parse_webhook(payload: &[u8]) -> Result<Event, WebhookError> {
    let mut event = Event::from_slice(payload)?;
    if event.event_type.is_some() {
        event.dispatch()?;
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_registered_tag_decodes_an_empty_resource() {
        for event_type in EventType::ALL {
            let mut event = Event::with_payload(event_type.as_str(), "{}").unwrap();
            let resource = event.dispatch().unwrap().clone();
            assert_eq!(resource.kind(), event_type.resource_kind());
            assert_eq!(event.resource(), Some(&resource));
        }
    }

    #[test]
    fn dispatch_matches_direct_decode() {
        let body = r#"{"pullRequestId":22,"title":"A new feature","isDraft":false}"#;
        let mut event = Event::with_payload("git.pullrequest.merged", body).unwrap();
        let direct: GitPullRequest = serde_json::from_str(body).unwrap();

        assert_eq!(event.dispatch().unwrap(), &Resource::PullRequest(direct));
    }

    #[test]
    fn type_mismatch_reports_field_path() {
        let mut event = Event::with_payload(
            "git.push",
            r#"{"pushId":14,"refUpdates":[{"name":"refs/heads/master","oldObjectId":7}]}"#,
        )
        .unwrap();

        match event.dispatch() {
            Err(WebhookError::PayloadDecode {
                event_type, path, ..
            }) => {
                assert_eq!(event_type, "git.push");
                assert_eq!(path, "refUpdates[0].oldObjectId");
            }
            other => panic!("expected PayloadDecode, got {:?}", other),
        }
        assert!(event.resource().is_none());
    }

    #[test]
    fn non_object_resource_is_a_decode_error() {
        let mut event = Event::with_payload("workitem.updated", r#""just a string""#).unwrap();
        assert!(matches!(
            event.dispatch(),
            Err(WebhookError::PayloadDecode { .. })
        ));
        assert!(event.resource().is_none());
    }

    #[test]
    fn array_resource_is_not_read_positionally() {
        let mut event = Event::with_payload("git.pullrequest.updated", "[]").unwrap();
        match event.dispatch() {
            Err(WebhookError::PayloadDecode { path, .. }) => assert_eq!(path, "."),
            other => panic!("expected PayloadDecode, got {:?}", other),
        }
    }

    #[test]
    fn missing_resource_is_a_decode_error() {
        let mut event = Event::from_slice(br#"{"eventType":"git.push"}"#).unwrap();
        match event.dispatch() {
            Err(WebhookError::PayloadDecode { path, .. }) => assert_eq!(path, "resource"),
            other => panic!("expected PayloadDecode, got {:?}", other),
        }
    }

    #[test]
    fn empty_event_type_counts_as_missing() {
        let mut event = Event::with_payload("", "{}").unwrap();
        assert!(matches!(
            event.dispatch(),
            Err(WebhookError::MissingEventType)
        ));
    }

    #[test]
    fn failed_redispatch_keeps_earlier_resource() {
        let mut event = Event::with_payload("git.push", r#"{"pushId":14}"#).unwrap();
        let first = event.dispatch().unwrap().clone();

        event.event_type = Some("release.deployment.completed".to_string());
        assert!(event.dispatch().is_err());
        assert_eq!(event.resource(), Some(&first));
    }

    #[test]
    fn parse_webhook_skips_dispatch_without_event_type() {
        let event = parse_webhook(br#"{"id":"abc","resource":{"pushId":1}}"#).unwrap();
        assert!(event.resource().is_none());

        let event =
            parse_webhook(br#"{"eventType":"git.push","resource":{"pushId":1}}"#).unwrap();
        assert_eq!(
            event.resource().and_then(Resource::as_push).and_then(|p| p.push_id),
            Some(1)
        );
    }
}
