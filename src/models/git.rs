use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{
    IdentityRef, IdentityRefWithVote, ReferenceLinks, ResourceRef, TeamProjectReference,
    WebApiTagDefinition,
};

string_enum! {
    /// Status of a pull request.
    pub enum PullRequestStatus {
        Abandoned => "abandoned",
        Active => "active",
        All => "all",
        Completed => "completed",
        NotSet => "notSet",
    }
}

string_enum! {
    /// Current status of a pull request merge.
    pub enum PullRequestAsyncStatus {
        Conflicts => "conflicts",
        Failure => "failure",
        NotSet => "notSet",
        Queued => "queued",
        RejectedByPolicy => "rejectedByPolicy",
        Succeeded => "succeeded",
    }
}

string_enum! {
    /// The specific kind of merge failure.
    pub enum PullRequestMergeFailureType {
        None => "none",
        Unknown => "unknown",
        CaseSensitive => "caseSensitive",
        ObjectTooLarge => "objectTooLarge",
    }
}

string_enum! {
    pub enum GitPullRequestMergeStrategy {
        NoFastForward => "noFastForward",
        Squash => "squash",
        Rebase => "rebase",
        RebaseMerge => "rebaseMerge",
    }
}

string_enum! {
    pub enum CommentThreadStatus {
        Unknown => "unknown",
        Active => "active",
        Fixed => "fixed",
        #[serde(alias = "wontfix")]
        WontFix => "wontFix",
        Closed => "closed",
        ByDesign => "byDesign",
        Pending => "pending",
    }
}

string_enum! {
    pub enum CommentType {
        Unknown => "unknown",
        Text => "text",
        #[serde(alias = "codechange")]
        CodeChange => "codeChange",
        System => "system",
    }
}

string_enum! {
    pub enum GitObjectType {
        Bad => "bad",
        Commit => "commit",
        Tree => "tree",
        Blob => "blob",
        Tag => "tag",
        Ext2 => "ext2",
        OfsDelta => "ofsDelta",
        RefDelta => "refDelta",
    }
}

string_enum! {
    /// Kind of change made to a version-controlled item.
    pub enum VersionControlChangeType {
        None => "none",
        Add => "add",
        Edit => "edit",
        Encoding => "encoding",
        Rename => "rename",
        Delete => "delete",
        Undelete => "undelete",
        Branch => "branch",
        Merge => "merge",
        Lock => "lock",
        Rollback => "rollback",
        SourceRename => "sourceRename",
        TargetRename => "targetRename",
        Property => "property",
        All => "all",
    }
}

/// Prefixes a bare branch name with `refs/heads/`; qualified refs pass through.
pub fn format_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{}", branch)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<TeamProjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
}

/// Name, email and timestamp of a commit author or committer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitUserDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_object_type: Option<GitObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_folder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<VersionControlChangeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<GitItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_server_item: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<GitUserDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer: Option<GitUserDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_truncated: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<GitChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

/// A single ref moved by a push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRefUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
}

/// Resource of a `git.push` notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPush {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commits: Vec<GitCommitRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ref_updates: Vec<GitRefUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<GitRepository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_by: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<ReferenceLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequestCompletionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_policy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_source_branch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_commit_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<GitPullRequestMergeStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squash_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_work_items: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by_auto_complete: Option<bool>,
}

/// Resource of the `git.pullrequest.*` notifications, also returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<GitRepository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_review_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PullRequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ref_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_status: Option<PullRequestAsyncStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_failure_type: Option<PullRequestMergeFailureType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_failure_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_merge_source_commit: Option<GitCommitRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_merge_target_commit: Option<GitCommitRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_merge_commit: Option<GitCommitRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<IdentityRefWithVote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commits: Vec<GitCommitRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_item_refs: Vec<ResourceRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<WebApiTagDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_complete_set_by: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_options: Option<GitPullRequestCompletionOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_iterations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<ReferenceLinks>,
}

impl GitPullRequest {
    /// Source branch without the `refs/heads/` prefix.
    pub fn source_branch(&self) -> Option<&str> {
        self.source_ref_name
            .as_deref()
            .map(|r| r.strip_prefix("refs/heads/").unwrap_or(r))
    }

    /// Target branch without the `refs/heads/` prefix.
    pub fn target_branch(&self) -> Option<&str> {
        self.target_ref_name
            .as_deref()
            .map(|r| r.strip_prefix("refs/heads/").unwrap_or(r))
    }
}

/// Query options for listing pull requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PullRequestListOptions {
    #[serde(rename = "searchCriteria.status", skip_serializing_if = "Option::is_none")]
    pub status: Option<PullRequestStatus>,
    #[serde(rename = "searchCriteria.repositoryId", skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(rename = "searchCriteria.sourceRefName", skip_serializing_if = "Option::is_none")]
    pub source_ref_name: Option<String>,
    #[serde(rename = "searchCriteria.targetRefName", skip_serializing_if = "Option::is_none")]
    pub target_ref_name: Option<String>,
    #[serde(rename = "searchCriteria.creatorId", skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    #[serde(rename = "searchCriteria.reviewerId", skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
    #[serde(rename = "$top", skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(rename = "$skip", skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A comment in a pull-request thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_type: Option<CommentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_content_updated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users_liked: Vec<IdentityRef>,
    #[serde(default, rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<ReferenceLinks>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// The file and line range a thread was left on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_file_start: Option<CommentPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_file_end: Option<CommentPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_file_start: Option<CommentPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_file_end: Option<CommentPosition>,
}

/// A pull-request comment thread: an initial comment and its replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequestCommentThread {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CommentThreadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_context: Option<CommentThreadContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<ReferenceLinks>,
}
