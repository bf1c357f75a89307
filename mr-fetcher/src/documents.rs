//! Review documents handed to the prompt pipeline.
//!
//! One document per changed file: `content` is the full unified diff, and
//! `metadata` merges merge-request fields with the per-file change fields so a
//! prompt template can render both without reaching back into provider types.

use diff_normalizer::{DiffStatus, NormalizedChange};
use serde::{Deserialize, Serialize};

use crate::git_providers::MergeRequestInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub description: String,
    pub author: AuthorName,
    pub web_url: String,
    pub file_path: String,
    pub diff_status: DiffStatus,
    pub add_count: u32,
    pub delete_count: u32,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Builds one document per change, in change order.
pub fn build_review_documents(
    info: &MergeRequestInfo,
    changes: &[NormalizedChange],
) -> Vec<ReviewDocument> {
    changes
        .iter()
        .map(|c| ReviewDocument {
            content: c.diff_text.clone(),
            metadata: DocumentMetadata {
                title: info.title.clone(),
                description: info.description.clone(),
                author: AuthorName {
                    name: info.author_name.clone(),
                },
                web_url: info.web_url.clone(),
                file_path: c.file_path.clone(),
                diff_status: c.status,
                add_count: c.added_lines,
                delete_count: c.removed_lines,
                file_type: c.content_type.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git_providers::{DiffRefs, MergeRequestId, ProviderKind};
    use diff_normalizer::{RawFileDiff, normalize};

    fn info() -> MergeRequestInfo {
        MergeRequestInfo {
            provider: ProviderKind::GitLab,
            id: MergeRequestId {
                project: "42".into(),
                iid: 9,
            },
            title: "Tidy config".into(),
            description: "Moves settings to TOML".into(),
            author_name: "Dev One".into(),
            web_url: "https://gitlab.com/g/p/-/merge_requests/9".into(),
            source_branch: "tidy".into(),
            target_branch: "main".into(),
            diff_refs: DiffRefs {
                base_sha: "b".into(),
                start_sha: None,
                head_sha: "h".into(),
            },
        }
    }

    #[test]
    fn documents_merge_request_and_change_fields() {
        let changes = normalize(&[
            RawFileDiff::new("", "config.toml", "@@ -0,0 +1,2 @@\n+[app]\n+debug = true\n"),
            RawFileDiff::new("app.py", "app.py", "@@ -1 +1 @@\n-DEBUG = True\n+import config\n"),
        ])
        .unwrap();

        let docs = build_review_documents(&info(), &changes);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata.file_path, "config.toml");
        assert_eq!(docs[0].metadata.diff_status, DiffStatus::Added);
        assert_eq!(docs[0].metadata.file_type, "toml");
        assert_eq!(docs[0].metadata.add_count, 2);
        assert_eq!(docs[1].metadata.author.name, "Dev One");
        assert_eq!(docs[1].metadata.delete_count, 1);
        assert_eq!(docs[1].content, changes[1].diff_text);
    }

    #[test]
    fn document_json_shape() {
        let changes =
            normalize(&[RawFileDiff::new("a.yml", "a.yml", "@@ -1 +1 @@\n-x: 1\n+x: 2\n")]).unwrap();
        let docs = build_review_documents(&info(), &changes);
        let v = serde_json::to_value(&docs[0]).unwrap();

        assert_eq!(v["metadata"]["diff_status"], "modified");
        assert_eq!(v["metadata"]["author"]["name"], "Dev One");
        assert_eq!(v["metadata"]["file_type"], "yaml");
        assert!(v["content"].as_str().unwrap().starts_with("--- a/a.yml\n+++ b/a.yml\n"));
    }
}
