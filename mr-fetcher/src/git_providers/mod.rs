//! Provider facade without async-trait or dynamic trait objects.
//!
//! `ProviderClient` wraps the concrete GitLab/GitHub clients and exposes the
//! handful of read-only calls the fetch stage needs: resolving a merge request,
//! reading its metadata and commits, and pulling per-file diffs for a range or
//! a single commit as `RawFileDiff` entries.

pub mod types;
pub use types::*;

pub mod github;
pub mod gitlab;

use diff_normalizer::RawFileDiff;
use tracing::debug;

use crate::errors::{ConfigError, FetchResult};

/// Runtime configuration for any provider client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// API base, e.g. "https://gitlab.com/api/v4" or "https://api.github.com".
    pub base_api: String,
    /// Access token (GitLab PAT or GitHub token).
    pub token: String,
}

impl ProviderConfig {
    /// Checks that the config can produce a working client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_api.starts_with("https://") || self.base_api.starts_with("http://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_api.clone()));
        }
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken(match self.kind {
                ProviderKind::GitLab => "GITLAB_PERSONAL_ACCESS_TOKEN",
                ProviderKind::GitHub => "GITHUB_TOKEN",
            }));
        }
        Ok(())
    }
}

/// Concrete provider client with enum dispatch.
#[derive(Debug, Clone)]
pub enum ProviderClient {
    GitLab(gitlab::GitLabClient),
    GitHub(github::GitHubClient),
}

impl ProviderClient {
    /// Constructs a concrete provider client from generic configuration.
    pub fn from_config(cfg: ProviderConfig) -> FetchResult<Self> {
        cfg.validate()?;
        debug!(
            "Initializing provider client: kind={:?}, base_api={}",
            cfg.kind, cfg.base_api
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("mr-fetcher/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_api = cfg.base_api.trim_end_matches('/').to_string();
        let client = match cfg.kind {
            ProviderKind::GitLab => {
                ProviderClient::GitLab(gitlab::GitLabClient::new(http, base_api, cfg.token))
            }
            ProviderKind::GitHub => {
                ProviderClient::GitHub(github::GitHubClient::new(http, base_api, cfg.token))
            }
        };

        Ok(client)
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::GitLab(_) => ProviderKind::GitLab,
            Self::GitHub(_) => ProviderKind::GitHub,
        }
    }

    /// IID of the most recently updated open merge request, if any.
    pub async fn latest_open_merge_request(&self, project: &str) -> FetchResult<Option<u64>> {
        match self {
            Self::GitLab(c) => c.latest_open_merge_request(project).await,
            Self::GitHub(c) => c.latest_open_merge_request(project).await,
        }
    }

    pub async fn fetch_merge_request(&self, id: &MergeRequestId) -> FetchResult<MergeRequestInfo> {
        match self {
            Self::GitLab(c) => c.get_meta(id).await,
            Self::GitHub(c) => c.get_meta(id).await,
        }
    }

    /// Commits of the merge request, newest first.
    pub async fn fetch_commits(&self, id: &MergeRequestId) -> FetchResult<Vec<CommitRef>> {
        match self {
            Self::GitLab(c) => c.get_commits(id).await,
            Self::GitHub(c) => c.get_commits(id).await,
        }
    }

    /// Per-file diffs between two refs, in provider order.
    pub async fn compare(
        &self,
        project: &str,
        from: &str,
        to: &str,
    ) -> FetchResult<Vec<RawFileDiff>> {
        debug!("Comparing refs: project={}, from={}, to={}", project, from, to);
        match self {
            Self::GitLab(c) => c.compare(project, from, to).await,
            Self::GitHub(c) => c.compare(project, from, to).await,
        }
    }

    /// Per-file diffs introduced by a single commit.
    pub async fn commit_diff(&self, project: &str, sha: &str) -> FetchResult<Vec<RawFileDiff>> {
        debug!("Fetching commit diff: project={}, sha={}", project, sha);
        match self {
            Self::GitLab(c) => c.commit_diff(project, sha).await,
            Self::GitHub(c) => c.commit_diff(project, sha).await,
        }
    }
}
