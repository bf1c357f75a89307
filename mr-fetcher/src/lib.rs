//! Fetch stage of the merge-request review pipeline.
//!
//! 1) resolve the merge request (explicit IID or the latest open one);
//! 2) read its metadata and commits from the provider;
//! 3) pull per-file diffs for the configured scope (whole MR range or head commit);
//! 4) normalize them with `diff-normalizer` and wrap them as review documents.
//!
//! Requests are issued one after another; the crate never retries. Provider
//! dispatch is enum-based, without `async-trait` or boxed trait objects.

pub mod config;
pub mod documents;
pub mod errors;
pub mod git_providers;

pub use diff_normalizer::ChangeSummary;
use diff_normalizer::{NormalizedChange, RawFileDiff};
use serde::Serialize;
use tracing::{debug, info};

pub use config::{ReviewConfig, ReviewScope};
pub use documents::{ReviewDocument, build_review_documents};
pub use errors::{ConfigError, FetchError, FetchResult, ProviderError};
pub use git_providers::{
    CommitRef, MergeRequestId, MergeRequestInfo, ProviderClient, ProviderConfig, ProviderKind,
};

/// Everything fetched and normalized for one merge request.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewBatch {
    pub info: MergeRequestInfo,
    /// Newest first.
    pub commits: Vec<CommitRef>,
    pub scope: ReviewScope,
    pub changes: Vec<NormalizedChange>,
}

impl ReviewBatch {
    pub fn documents(&self) -> Vec<ReviewDocument> {
        build_review_documents(&self.info, &self.changes)
    }

    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary::from_changes(&self.changes)
    }
}

/// Runs the fetch stage for the configured project.
///
/// Returns `Ok(None)` when no IID is configured and the project has no open
/// merge request. A malformed file diff aborts the whole batch.
pub async fn collect_review_batch(cfg: &ReviewConfig) -> FetchResult<Option<ReviewBatch>> {
    let client = ProviderClient::from_config(cfg.provider.clone())?;

    let iid = match cfg.mr_iid {
        Some(iid) => iid,
        None => match client.latest_open_merge_request(&cfg.project).await? {
            Some(iid) => iid,
            None => {
                info!(project = %cfg.project, "no open merge requests");
                return Ok(None);
            }
        },
    };

    let id = MergeRequestId {
        project: cfg.project.clone(),
        iid,
    };
    info!(provider = ?cfg.provider.kind, project = %id.project, iid, "collecting merge request");

    let info = client.fetch_merge_request(&id).await?;
    let commits = client.fetch_commits(&id).await?;
    debug!(
        commits = commits.len(),
        head_sha = %info.diff_refs.head_sha,
        "merge request metadata fetched"
    );

    let raw = fetch_raw_diffs(&client, &info, cfg.scope).await?;
    debug!(files = raw.len(), scope = ?cfg.scope, "raw diffs fetched");

    let changes = diff_normalizer::normalize(&raw)?;

    Ok(Some(ReviewBatch {
        info,
        commits,
        scope: cfg.scope,
        changes,
    }))
}

/// Raw per-file diffs of a merge request for the given scope.
///
/// `MergeRequest` compares the merge base with the head commit, which covers
/// every commit of the MR. `Commit` only looks at the head commit.
pub async fn fetch_raw_diffs(
    client: &ProviderClient,
    info: &MergeRequestInfo,
    scope: ReviewScope,
) -> FetchResult<Vec<RawFileDiff>> {
    let refs = &info.diff_refs;
    if refs.head_sha.is_empty() {
        return Err(FetchError::Validation(format!(
            "merge request {} has an empty head sha",
            info.id.iid
        )));
    }

    match scope {
        ReviewScope::MergeRequest => {
            if refs.base_sha.is_empty() {
                return Err(FetchError::Validation(format!(
                    "merge request {} has an empty base sha",
                    info.id.iid
                )));
            }
            client
                .compare(&info.id.project, &refs.base_sha, &refs.head_sha)
                .await
        }
        ReviewScope::Commit => client.commit_diff(&info.id.project, &refs.head_sha).await,
    }
}
