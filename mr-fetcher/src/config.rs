//! Runtime configuration loaded from environment variables.
//!
//! | variable                        | meaning                                           |
//! |---------------------------------|---------------------------------------------------|
//! | `GIT_PROVIDER`                  | `gitlab` (default) or `github`                    |
//! | `GIT_API_BASE`                  | explicit API base, overrides the defaults below   |
//! | `CI_SERVER_URL`                 | GitLab server, default `https://gitlab.com/`      |
//! | `GITLAB_PERSONAL_ACCESS_TOKEN`  | GitLab token                                      |
//! | `GITHUB_TOKEN`                  | GitHub token                                      |
//! | `CI_PROJECT_ID`                 | GitLab project id or path                         |
//! | `GITHUB_REPOSITORY`             | GitHub `owner/repo`, else `CI_PROJECT_ID`         |
//! | `MR_IID`                        | merge request to review; latest open one if unset |
//! | `REVIEW_SCOPE`                  | `merge_request` (default) or `commit`             |

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::git_providers::{ProviderConfig, ProviderKind};

const DEFAULT_GITLAB_SERVER: &str = "https://gitlab.com/";
const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Which diff of the merge request to review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewScope {
    /// Combined diff from the merge base to the head commit.
    MergeRequest,
    /// Only the changes of the head commit.
    Commit,
}

/// Everything a fetch run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewConfig {
    pub provider: ProviderConfig,
    pub project: String,
    pub mr_iid: Option<u64>,
    pub scope: ReviewScope,
}

impl ReviewConfig {
    /// Build from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let kind = match get("GIT_PROVIDER").as_deref().map(str::to_ascii_lowercase) {
            None => ProviderKind::GitLab,
            Some(v) if v == "gitlab" => ProviderKind::GitLab,
            Some(v) if v == "github" => ProviderKind::GitHub,
            Some(v) => {
                return Err(ConfigError::InvalidValue {
                    key: "GIT_PROVIDER",
                    value: v,
                });
            }
        };

        let (base_api, token, project) = match kind {
            ProviderKind::GitLab => {
                let base_api = get("GIT_API_BASE").unwrap_or_else(|| {
                    let server = get("CI_SERVER_URL").unwrap_or_else(|| DEFAULT_GITLAB_SERVER.into());
                    format!("{}/api/v4", server.trim_end_matches('/'))
                });
                let project = get("CI_PROJECT_ID").ok_or(ConfigError::MissingProject("CI_PROJECT_ID"))?;
                (base_api, get("GITLAB_PERSONAL_ACCESS_TOKEN"), project)
            }
            ProviderKind::GitHub => {
                let base_api = get("GIT_API_BASE").unwrap_or_else(|| DEFAULT_GITHUB_API.into());
                let project = get("GITHUB_REPOSITORY")
                    .or_else(|| get("CI_PROJECT_ID"))
                    .ok_or(ConfigError::MissingProject("GITHUB_REPOSITORY"))?;
                (base_api, get("GITHUB_TOKEN"), project)
            }
        };

        let mr_iid = match get("MR_IID") {
            None => None,
            Some(v) => Some(v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "MR_IID",
                value: v.clone(),
            })?),
        };

        let scope = match get("REVIEW_SCOPE").as_deref() {
            None | Some("merge_request") => ReviewScope::MergeRequest,
            Some("commit") => ReviewScope::Commit,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "REVIEW_SCOPE",
                    value: other.to_string(),
                });
            }
        };

        let provider = ProviderConfig {
            kind,
            base_api,
            token: token.unwrap_or_default(),
        };
        provider.validate()?;

        Ok(Self {
            provider,
            project,
            mr_iid,
            scope,
        })
    }
}
