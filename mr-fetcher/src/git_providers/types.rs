//! Provider-agnostic data model for merge requests and commits.

use serde::{Deserialize, Serialize};

/// Supported Git providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitLab,
    GitHub,
}

/// A merge request inside a provider.
///
/// * `project` – GitLab: numeric ID or "group/project"; GitHub: "owner/repo".
/// * `iid`     – GitLab MR IID or GitHub PR number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestId {
    pub project: String,
    pub iid: u64,
}

/// Base/head SHAs of the merge request diff.
///
/// GitLab also exposes `start_sha`; GitHub does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRefs {
    pub base_sha: String,
    pub start_sha: Option<String>,
    pub head_sha: String,
}

/// Merge request metadata forwarded to the review stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestInfo {
    pub provider: ProviderKind,
    pub id: MergeRequestId,
    pub title: String,
    /// Empty when the author left no description.
    pub description: String,
    pub author_name: String,
    pub web_url: String,
    pub source_branch: String,
    pub target_branch: String,
    pub diff_refs: DiffRefs,
}

/// A single commit belonging to the merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub id: String,
    pub title: String,
    pub author_name: Option<String>,
}
