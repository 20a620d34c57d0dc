use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::error::ClientError;
use crate::models::{
    Build, Comment, CommentType, GitPullRequest, GitPullRequestCommentThread, GitRef, ListResponse,
    PullRequestListOptions, QueueBuildOptions, TeamsListOptions, WebApiTeam, WorkItemComment,
};

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
const API_VERSION: &str = "7.1";
const COMMENTS_API_VERSION: &str = "7.1-preview.4";
const TEAMS_API_VERSION: &str = "7.1-preview.3";

/// Minimal Azure DevOps REST client.
///
/// Authenticates with a personal access token sent as the Basic password.
/// Single page per call, no retries.
#[derive(Clone, Debug)]
pub struct AzureDevOpsClient {
    pub org: String,
    pub project: String,
    pat: SecretString,
    base_url: Url,
    http: reqwest::Client,
}

impl AzureDevOpsClient {
    pub fn new(org: impl AsRef<str>, project: impl AsRef<str>, pat: SecretString) -> Self {
        Self::with_base_url(org, project, pat, DEFAULT_BASE_URL)
            .expect("default base url is valid")
    }

    /// Client against a different host, e.g. an on-prem server or a mock.
    pub fn with_base_url(
        org: impl AsRef<str>,
        project: impl AsRef<str>,
        pat: SecretString,
        base_url: impl AsRef<str>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(30))
            .build()?;

        let mut base_url = Url::parse(base_url.as_ref())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            org: org.as_ref().to_string(),
            project: project.as_ref().to_string(),
            pat,
            base_url,
            http,
        })
    }

    /// `{base}/{org}/{project}/_apis/{path}?api-version=..`
    fn project_url(&self, path: &str, api_version: &str) -> Result<Url, ClientError> {
        self.api_url(
            &format!(
                "{}/{}/_apis/{}",
                urlencoding::encode(&self.org),
                urlencoding::encode(&self.project),
                path.trim_start_matches('/')
            ),
            api_version,
        )
    }

    /// `{base}/{org}/_apis/{path}?api-version=..`
    fn org_url(&self, path: &str, api_version: &str) -> Result<Url, ClientError> {
        self.api_url(
            &format!(
                "{}/_apis/{}",
                urlencoding::encode(&self.org),
                path.trim_start_matches('/')
            ),
            api_version,
        )
    }

    fn api_url(&self, relative: &str, api_version: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.join(relative)?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        // PAT as Basic password; username stays empty
        self.http
            .request(method, url)
            .basic_auth("", Some(self.pat.expose_secret()))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, %status, "azure devops request failed");
            return Err(ClientError::Status { url, status });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { url, source })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        self.execute(self.request(Method::GET, url)).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        self.execute(self.request(Method::POST, url).json(body)).await
    }

    /// Fetch a single pull request.
    pub async fn get_pull_request(
        &self,
        repo_id: &str,
        pull_request_id: i64,
    ) -> Result<GitPullRequest, ClientError> {
        let url = self.project_url(
            &format!(
                "git/repositories/{}/pullrequests/{}",
                urlencoding::encode(repo_id),
                pull_request_id
            ),
            API_VERSION,
        )?;
        self.get(url).await
    }

    /// List pull requests across the project matching `opts`.
    pub async fn list_pull_requests(
        &self,
        opts: &PullRequestListOptions,
    ) -> Result<Vec<GitPullRequest>, ClientError> {
        let url = self.project_url("git/pullrequests", API_VERSION)?;
        let resp: ListResponse<GitPullRequest> = self
            .execute(self.request(Method::GET, url).query(opts))
            .await?;
        Ok(resp.value)
    }

    pub async fn list_pull_request_threads(
        &self,
        repo_id: &str,
        pull_request_id: i64,
    ) -> Result<Vec<GitPullRequestCommentThread>, ClientError> {
        let url = self.project_url(
            &format!(
                "git/repositories/{}/pullRequests/{}/threads",
                urlencoding::encode(repo_id),
                pull_request_id
            ),
            API_VERSION,
        )?;
        let resp: ListResponse<GitPullRequestCommentThread> = self.get(url).await?;
        Ok(resp.value)
    }

    /// Post a text reply inside an existing PR comment thread.
    pub async fn reply_in_thread(
        &self,
        repo_id: &str,
        pull_request_id: i64,
        thread_id: i64,
        content: &str,
    ) -> Result<Comment, ClientError> {
        let url = self.project_url(
            &format!(
                "git/repositories/{}/pullRequests/{}/threads/{}/comments",
                urlencoding::encode(repo_id),
                pull_request_id,
                thread_id
            ),
            API_VERSION,
        )?;
        let body = Comment {
            content: Some(content.to_string()),
            comment_type: Some(CommentType::Text),
            ..Default::default()
        };
        self.post(url, &body).await
    }

    /// Fetch build details: source version, repository, build number and result.
    pub async fn get_build(&self, build_id: u64) -> Result<Build, ClientError> {
        let url = self.project_url(&format!("build/builds/{}", build_id), API_VERSION)?;
        self.get(url).await
    }

    /// Queue a new build of `build.definition` on `build.source_branch`.
    pub async fn queue_build(
        &self,
        build: &Build,
        opts: &QueueBuildOptions,
    ) -> Result<Build, ClientError> {
        let url = self.project_url("build/builds", API_VERSION)?;
        self.execute(self.request(Method::POST, url).query(opts).json(build))
            .await
    }

    /// List refs of a repository, optionally filtered by prefix (e.g. `heads/`).
    pub async fn list_refs(
        &self,
        repo_id: &str,
        filter: Option<&str>,
    ) -> Result<Vec<GitRef>, ClientError> {
        let url = self.project_url(
            &format!("git/repositories/{}/refs", urlencoding::encode(repo_id)),
            API_VERSION,
        )?;
        let mut request = self.request(Method::GET, url);
        if let Some(filter) = filter {
            request = request.query(&[("filter", filter)]);
        }
        let resp: ListResponse<GitRef> = self.execute(request).await?;
        Ok(resp.value)
    }

    /// Add a comment to a work item.
    pub async fn add_work_item_comment(
        &self,
        work_item_id: i64,
        text: &str,
    ) -> Result<WorkItemComment, ClientError> {
        let url = self.project_url(
            &format!("wit/workItems/{}/comments", work_item_id),
            COMMENTS_API_VERSION,
        )?;
        self.post(url, &serde_json::json!({ "text": text })).await
    }

    /// List the teams of the client's project.
    pub async fn list_teams(
        &self,
        opts: &TeamsListOptions,
    ) -> Result<Vec<WebApiTeam>, ClientError> {
        let url = self.org_url(
            &format!("projects/{}/teams", urlencoding::encode(&self.project)),
            TEAMS_API_VERSION,
        )?;
        let resp: ListResponse<WebApiTeam> = self
            .execute(self.request(Method::GET, url).query(opts))
            .await?;
        Ok(resp.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> AzureDevOpsClient {
        AzureDevOpsClient::with_base_url(
            "fabrikam",
            "Fabrikam Fiber",
            SecretString::from("pat".to_string()),
            base,
        )
        .unwrap()
    }

    #[test]
    fn project_urls_escape_segments_and_pin_api_version() {
        let url = client(DEFAULT_BASE_URL)
            .project_url("git/pullrequests", API_VERSION)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/fabrikam/Fabrikam%20Fiber/_apis/git/pullrequests?api-version=7.1"
        );
    }

    #[test]
    fn base_url_path_is_preserved() {
        let url = client("https://tfs.example.com/tfs")
            .org_url("projects/x/teams", TEAMS_API_VERSION)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://tfs.example.com/tfs/fabrikam/_apis/projects/x/teams?api-version=7.1-preview.3"
        );
    }

    #[test]
    fn debug_output_does_not_leak_pat() {
        let printed = format!("{:?}", client(DEFAULT_BASE_URL));
        assert!(!printed.contains("\"pat\""));
    }
}
