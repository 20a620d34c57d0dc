use std::fmt;
use std::str::FromStr;

use crate::error::WebhookError;

/// The event types this crate knows how to decode.
///
/// See <https://learn.microsoft.com/en-us/azure/devops/service-hooks/events>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PullRequestCreated,
    PullRequestMerged,
    PullRequestUpdated,
    Push,
    WorkItemCommented,
    WorkItemUpdated,
}

/// The shape an event's resource decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    PullRequest,
    Push,
    WorkItem,
    WorkItemUpdate,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::PullRequestCreated,
        EventType::PullRequestMerged,
        EventType::PullRequestUpdated,
        EventType::Push,
        EventType::WorkItemCommented,
        EventType::WorkItemUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PullRequestCreated => "git.pullrequest.created",
            EventType::PullRequestMerged => "git.pullrequest.merged",
            EventType::PullRequestUpdated => "git.pullrequest.updated",
            EventType::Push => "git.push",
            EventType::WorkItemCommented => "workitem.commented",
            EventType::WorkItemUpdated => "workitem.updated",
        }
    }

    /// Exact, case-sensitive lookup; `None` for anything not in the table.
    pub fn lookup(tag: &str) -> Option<Self> {
        EventType::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            EventType::PullRequestCreated
            | EventType::PullRequestMerged
            | EventType::PullRequestUpdated => ResourceKind::PullRequest,
            EventType::Push => ResourceKind::Push,
            EventType::WorkItemCommented => ResourceKind::WorkItem,
            EventType::WorkItemUpdated => ResourceKind::WorkItemUpdate,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::lookup(s).ok_or_else(|| WebhookError::UnknownEventType { tag: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips_through_lookup() {
        for event_type in EventType::ALL {
            assert_eq!(EventType::lookup(event_type.as_str()), Some(event_type));
        }
    }

    #[test]
    fn pull_request_tags_share_one_shape() {
        assert_eq!(
            EventType::PullRequestCreated.resource_kind(),
            ResourceKind::PullRequest
        );
        assert_eq!(
            EventType::PullRequestMerged.resource_kind(),
            ResourceKind::PullRequest
        );
        assert_eq!(
            EventType::PullRequestUpdated.resource_kind(),
            ResourceKind::PullRequest
        );
        assert_eq!(EventType::Push.resource_kind(), ResourceKind::Push);
        assert_eq!(
            EventType::WorkItemCommented.resource_kind(),
            ResourceKind::WorkItem
        );
        assert_eq!(
            EventType::WorkItemUpdated.resource_kind(),
            ResourceKind::WorkItemUpdate
        );
    }

    #[test]
    fn unknown_tags_do_not_fall_back() {
        assert_eq!(EventType::lookup("release.deployment.completed"), None);
        assert_eq!(EventType::lookup("GIT.PUSH"), None);
        assert_eq!(EventType::lookup(" git.push"), None);
        assert_eq!(EventType::lookup(""), None);

        match "build.complete".parse::<EventType>() {
            Err(WebhookError::UnknownEventType { tag }) => assert_eq!(tag, "build.complete"),
            other => panic!("expected UnknownEventType, got {:?}", other),
        }
    }
}
