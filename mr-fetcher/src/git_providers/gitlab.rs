//! GitLab provider (REST v4) for MR metadata, commits and diffs.
//!
//! Endpoints used:
//!   * GET /projects/:id/merge_requests?state=opened&order_by=updated_at&sort=desc
//!   * GET /projects/:id/merge_requests/:iid
//!   * GET /projects/:id/merge_requests/:iid/commits
//!   * GET /projects/:id/repository/compare?from=:from&to=:to
//!   * GET /projects/:id/repository/commits/:sha/diff

use diff_normalizer::RawFileDiff;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::{FetchResult, ProviderError};
use crate::git_providers::types::*;

/// GitLab HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,    // "PRIVATE-TOKEN"
}

impl GitLabClient {
    /// Constructs a GitLab client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        debug!("Creating GitLabClient with base_api={}", base_api);
        Self {
            http,
            base_api,
            token,
        }
    }

    fn project_url(&self, project: &str) -> String {
        format!("{}/projects/{}", self.base_api, urlencoding::encode(project))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> FetchResult<T> {
        let value = self
            .http
            .get(url)
            .query(query)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(value)
    }

    pub async fn latest_open_merge_request(&self, project: &str) -> FetchResult<Option<u64>> {
        let url = format!("{}/merge_requests", self.project_url(project));
        debug!("GitLab latest_open_merge_request: {}", url);

        let items: Vec<GitLabMrListItem> = self
            .get_json(
                url,
                &[
                    ("state", "opened"),
                    ("order_by", "updated_at"),
                    ("sort", "desc"),
                    ("per_page", "1"),
                ],
            )
            .await?;

        Ok(items.first().map(|mr| mr.iid))
    }

    /// Fetches merge request metadata including diff refs and author info.
    pub async fn get_meta(&self, id: &MergeRequestId) -> FetchResult<MergeRequestInfo> {
        let url = format!("{}/merge_requests/{}", self.project_url(&id.project), id.iid);
        debug!("GitLab get_meta: {}", url);

        let resp: GitLabMr = self.get_json(url, &[]).await?;
        merge_request_info(id, resp)
    }

    /// Fetches commits attached to the merge request (newest first).
    pub async fn get_commits(&self, id: &MergeRequestId) -> FetchResult<Vec<CommitRef>> {
        let url = format!(
            "{}/merge_requests/{}/commits",
            self.project_url(&id.project),
            id.iid
        );
        debug!("GitLab get_commits: {}", url);

        let raw: Vec<GitLabCommit> = self.get_json(url, &[("per_page", "100")]).await?;

        Ok(raw
            .into_iter()
            .map(|c| CommitRef {
                id: c.id,
                title: c.title,
                author_name: c.author_name,
            })
            .collect())
    }

    pub async fn compare(&self, project: &str, from: &str, to: &str) -> FetchResult<Vec<RawFileDiff>> {
        let url = format!("{}/repository/compare", self.project_url(project));
        debug!("GitLab compare: {} ({}..{})", url, from, to);

        let resp: GitLabCompare = self.get_json(url, &[("from", from), ("to", to)]).await?;
        if resp.compare_timeout.unwrap_or(false) {
            warn!("GitLab compare timed out; diff list may be incomplete");
        }

        Ok(raw_diffs(resp.diffs))
    }

    pub async fn commit_diff(&self, project: &str, sha: &str) -> FetchResult<Vec<RawFileDiff>> {
        let url = format!(
            "{}/repository/commits/{}/diff",
            self.project_url(project),
            urlencoding::encode(sha)
        );
        debug!("GitLab commit_diff: {}", url);

        let diffs: Vec<GitLabDiff> = self.get_json(url, &[("per_page", "100")]).await?;
        Ok(raw_diffs(diffs))
    }
}

fn merge_request_info(id: &MergeRequestId, resp: GitLabMr) -> FetchResult<MergeRequestInfo> {
    let refs = resp.diff_refs.ok_or_else(|| {
        ProviderError::InvalidResponse(format!("merge request !{} has no diff_refs", id.iid))
    })?;

    Ok(MergeRequestInfo {
        provider: ProviderKind::GitLab,
        id: id.clone(),
        title: resp.title,
        description: resp.description.unwrap_or_default(),
        author_name: resp.author.name,
        web_url: resp.web_url,
        source_branch: resp.source_branch,
        target_branch: resp.target_branch,
        diff_refs: DiffRefs {
            base_sha: refs.base_sha,
            start_sha: refs.start_sha,
            head_sha: refs.head_sha,
        },
    })
}

/// Maps GitLab diff entries onto raw normalizer input, keeping order.
///
/// Entries without a `diff` (binary or over the size limit) become an empty body.
fn raw_diffs(diffs: Vec<GitLabDiff>) -> Vec<RawFileDiff> {
    diffs
        .into_iter()
        .map(|d| {
            if d.too_large.unwrap_or(false) || d.diff.is_none() {
                warn!(path = %d.new_path, "GitLab returned no diff body for file");
            }
            RawFileDiff {
                old_path: d.old_path,
                new_path: d.new_path,
                diff_body: d.diff.unwrap_or_default(),
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct GitLabMrListItem {
    iid: u64,
}

/// GitLab MR response (subset).
#[derive(Debug, Deserialize)]
struct GitLabMr {
    title: String,
    description: Option<String>,
    web_url: String,
    source_branch: String,
    target_branch: String,
    #[serde(default)]
    diff_refs: Option<GitLabDiffRefs>,
    author: GitLabUser,
}

#[derive(Debug, Deserialize)]
struct GitLabDiffRefs {
    base_sha: String,
    head_sha: String,
    #[serde(default)]
    start_sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabUser {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitLabCommit {
    id: String,
    title: String,
    #[serde(default)]
    author_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabCompare {
    #[serde(default)]
    diffs: Vec<GitLabDiff>,
    #[serde(default)]
    compare_timeout: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct GitLabDiff {
    old_path: String,
    new_path: String,
    #[serde(default)]
    too_large: Option<bool>,
    #[serde(default)]
    diff: Option<String>, // unified hunk body; None for binary/too large
}
