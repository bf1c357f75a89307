//! GitHub provider (REST v3) for PR metadata, commits and diffs.
//!
//! Endpoints used:
//!   * GET /repos/{owner}/{repo}/pulls?state=open&sort=updated&direction=desc
//!   * GET /repos/{owner}/{repo}/pulls/{number}
//!   * GET /repos/{owner}/{repo}/pulls/{number}/commits
//!   * GET /repos/{owner}/{repo}/compare/{base}...{head}
//!   * GET /repos/{owner}/{repo}/commits/{sha}

use diff_normalizer::RawFileDiff;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::{FetchError, FetchResult};
use crate::git_providers::types::*;

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // "https://api.github.com"
    token: String,
}

impl GitHubClient {
    /// Constructs a GitHub client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        debug!("Creating GitHubClient with base_api={}", base_api);
        Self {
            http,
            base_api,
            token,
        }
    }

    fn repo_url(&self, project: &str) -> FetchResult<String> {
        let (owner, repo) = split_owner_repo(project)?;
        Ok(format!("{}/repos/{}/{}", self.base_api, owner, repo))
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
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(value)
    }

    pub async fn latest_open_merge_request(&self, project: &str) -> FetchResult<Option<u64>> {
        let url = format!("{}/pulls", self.repo_url(project)?);
        debug!("GitHub latest_open_merge_request: {}", url);

        let items: Vec<GitHubPrListItem> = self
            .get_json(
                url,
                &[
                    ("state", "open"),
                    ("sort", "updated"),
                    ("direction", "desc"),
                    ("per_page", "1"),
                ],
            )
            .await?;

        Ok(items.first().map(|pr| pr.number))
    }

    /// Fetches PR metadata including base/head SHAs.
    pub async fn get_meta(&self, id: &MergeRequestId) -> FetchResult<MergeRequestInfo> {
        let url = format!("{}/pulls/{}", self.repo_url(&id.project)?, id.iid);
        debug!("GitHub get_meta: {}", url);

        let resp: GitHubPr = self.get_json(url, &[]).await?;
        Ok(merge_request_info(id, resp))
    }

    /// Fetches commits attached to the PR, newest first.
    ///
    /// GitHub lists PR commits oldest first; the order is flipped here so both
    /// providers agree.
    pub async fn get_commits(&self, id: &MergeRequestId) -> FetchResult<Vec<CommitRef>> {
        let url = format!("{}/pulls/{}/commits", self.repo_url(&id.project)?, id.iid);
        debug!("GitHub get_commits: {}", url);

        let raw: Vec<GitHubCommit> = self.get_json(url, &[("per_page", "100")]).await?;
        Ok(commit_refs(raw))
    }

    pub async fn compare(&self, project: &str, from: &str, to: &str) -> FetchResult<Vec<RawFileDiff>> {
        let url = format!(
            "{}/compare/{}...{}",
            self.repo_url(project)?,
            urlencoding::encode(from),
            urlencoding::encode(to)
        );
        debug!("GitHub compare: {}", url);

        let resp: GitHubFiles = self.get_json(url, &[]).await?;
        Ok(raw_diffs(resp.files))
    }

    pub async fn commit_diff(&self, project: &str, sha: &str) -> FetchResult<Vec<RawFileDiff>> {
        let url = format!(
            "{}/commits/{}",
            self.repo_url(project)?,
            urlencoding::encode(sha)
        );
        debug!("GitHub commit_diff: {}", url);

        let resp: GitHubFiles = self.get_json(url, &[]).await?;
        Ok(raw_diffs(resp.files))
    }
}

fn split_owner_repo(project: &str) -> FetchResult<(String, String)> {
    let mut parts = project.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(FetchError::Validation(format!(
            "invalid GitHub project id '{}', expected 'owner/repo'",
            project
        )));
    }

    Ok((owner.to_string(), repo.to_string()))
}

fn merge_request_info(id: &MergeRequestId, resp: GitHubPr) -> MergeRequestInfo {
    MergeRequestInfo {
        provider: ProviderKind::GitHub,
        id: id.clone(),
        title: resp.title,
        description: resp.body.unwrap_or_default(),
        author_name: resp.user.login,
        web_url: resp.html_url,
        source_branch: resp.head.r#ref,
        target_branch: resp.base.r#ref,
        diff_refs: DiffRefs {
            base_sha: resp.base.sha,
            start_sha: None,
            head_sha: resp.head.sha,
        },
    }
}

fn commit_refs(raw: Vec<GitHubCommit>) -> Vec<CommitRef> {
    raw.into_iter()
        .rev()
        .map(|c| CommitRef {
            title: c.commit.message.lines().next().unwrap_or_default().to_string(),
            author_name: c.commit.author.map(|a| a.name),
            id: c.sha,
        })
        .collect()
}

/// Maps GitHub file entries onto raw normalizer input, keeping order.
///
/// Files without a `patch` (binary, too large, pure renames) get an empty body.
fn raw_diffs(files: Vec<GitHubFile>) -> Vec<RawFileDiff> {
    files
        .into_iter()
        .map(|f| {
            if f.patch.is_none() && f.status != "renamed" {
                warn!(path = %f.filename, status = %f.status, "GitHub returned no patch for file");
            }
            RawFileDiff {
                old_path: f.previous_filename.unwrap_or_else(|| f.filename.clone()),
                new_path: f.filename,
                diff_body: f.patch.unwrap_or_default(),
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct GitHubPrListItem {
    number: u64,
}

/// GitHub PR response (subset).
#[derive(Debug, Deserialize)]
struct GitHubPr {
    title: String,
    body: Option<String>,
    html_url: String,
    user: GitHubUser,
    base: GitHubRef,
    head: GitHubRef,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    r#ref: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitInner,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitInner {
    message: String,
    author: Option<GitHubCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitAuthor {
    name: String,
}

/// Shared shape of `compare` and single-commit responses.
#[derive(Debug, Deserialize)]
struct GitHubFiles {
    #[serde(default)]
    files: Vec<GitHubFile>,
}

#[derive(Debug, Deserialize)]
struct GitHubFile {
    filename: String,
    #[serde(default)]
    previous_filename: Option<String>,
    status: String,
    #[serde(default)]
    patch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use diff_normalizer::DiffStatus;

    #[test]
    fn owner_repo_must_have_two_parts() {
        assert_eq!(
            split_owner_repo("octo/hello").unwrap(),
            ("octo".to_string(), "hello".to_string())
        );
        assert!(split_owner_repo("octo").is_err());
        assert!(split_owner_repo("a/b/c").is_err());
        assert!(split_owner_repo("/b").is_err());
    }

    #[test]
    fn compare_files_map_and_classify() {
        let json = r#"{
            "status": "ahead",
            "files": [
                {"filename": "src/app.ts", "status": "added", "patch": "@@ -0,0 +1,2 @@\n+a\n+b"},
                {"filename": "docs/new.md", "previous_filename": "docs/old.md", "status": "renamed"},
                {"filename": "gone.yml", "status": "removed", "patch": "@@ -1,2 +0,0 @@\n-x\n-y"},
                {"filename": "Cargo.toml", "status": "modified", "patch": "@@ -3,2 +3,2 @@\n [package]\n-version = \"0.1.0\"\n+version = \"0.2.0\""}
            ]
        }"#;
        let resp: GitHubFiles = serde_json::from_str(json).unwrap();
        let raw = raw_diffs(resp.files);
        assert_eq!(raw[1].old_path, "docs/old.md");
        assert_eq!(raw[1].diff_body, "");

        let changes = diff_normalizer::normalize(&raw).unwrap();
        let statuses: Vec<_> = changes.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            [
                DiffStatus::Added,
                DiffStatus::Renamed,
                DiffStatus::Deleted,
                DiffStatus::Modified
            ]
        );
        assert_eq!(changes[3].content_type, "toml");
        assert_eq!((changes[3].added_lines, changes[3].removed_lines), (1, 1));
    }

    #[test]
    fn commits_are_returned_newest_first() {
        let json = r#"[
            {"sha": "aaa", "commit": {"message": "first\n\nbody", "author": {"name": "A"}}},
            {"sha": "bbb", "commit": {"message": "second", "author": null}}
        ]"#;
        let raw: Vec<GitHubCommit> = serde_json::from_str(json).unwrap();
        let commits = commit_refs(raw);

        assert_eq!(commits[0].id, "bbb");
        assert_eq!(commits[0].author_name, None);
        assert_eq!(commits[1].title, "first");
    }

    #[test]
    fn pull_request_maps_to_info() {
        let json = r#"{
            "number": 5, "title": "Fix", "body": "details", "html_url": "https://github.com/o/r/pull/5",
            "user": {"login": "octocat", "id": 1},
            "base": {"ref": "main", "sha": "base1"},
            "head": {"ref": "fix", "sha": "head1"}
        }"#;
        let resp: GitHubPr = serde_json::from_str(json).unwrap();
        let id = MergeRequestId {
            project: "o/r".into(),
            iid: 5,
        };
        let info = merge_request_info(&id, resp);

        assert_eq!(info.provider, ProviderKind::GitHub);
        assert_eq!(info.author_name, "octocat");
        assert_eq!(info.diff_refs.base_sha, "base1");
        assert_eq!(info.diff_refs.start_sha, None);
        assert_eq!(info.source_branch, "fix");
    }
}
