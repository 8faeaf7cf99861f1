//! Bitbucket API payload types.
//!
//! Request bodies are typed so their wire shape is fixed in one place.
//! Responses stay as `serde_json::Value` and are passed through untouched,
//! except for the few fields the server inspects itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Pagination
// =============================================================================

/// One page of a Bitbucket list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub pagelen: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
}

// =============================================================================
// Pull requests
// =============================================================================

/// Branch reference used for PR source/destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchTarget {
    pub branch: BranchName,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchName {
    pub name: String,
}

impl BranchTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            branch: BranchName { name: name.into() },
        }
    }
}

/// Reviewer reference. Bitbucket accepts a UUID, an Atlassian account id,
/// or (on older workspaces) a username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRef {
    Uuid(String),
    AccountId(String),
    Username(String),
}

impl ReviewerRef {
    /// Classify a reviewer identifier by its format.
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if id.starts_with('{') && id.ends_with('}') {
            ReviewerRef::Uuid(id.to_string())
        } else if id.contains(':') {
            ReviewerRef::AccountId(id.to_string())
        } else {
            ReviewerRef::Username(id.to_string())
        }
    }
}

/// Body of `POST /repositories/{workspace}/{repo}/pullrequests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePullRequestRequest {
    pub title: String,
    pub description: String,
    pub source: BranchTarget,
    pub destination: BranchTarget,
    pub close_source_branch: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<ReviewerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
}

/// Body of `PUT .../pullrequests/{id}`; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePullRequestRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
}

/// Body of `POST .../pullrequests/{id}/merge`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergePullRequestRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<String>,
}

/// Participant entry of a pull request, reduced to what reviewer lookups need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

impl Participant {
    /// Whether this participant is `nickname` as a reviewer who has not approved yet.
    pub fn is_pending_reviewer(&self, nickname: &str) -> bool {
        self.role.as_deref() == Some("REVIEWER")
            && !self.approved
            && self
                .user
                .as_ref()
                .and_then(|u| u.nickname.as_deref())
                .is_some_and(|n| n == nickname)
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentContent {
    pub raw: String,
}

/// Body of `POST .../pullrequests/{id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: CommentContent,
    /// File/line anchor, e.g. `{"path": "src/lib.rs", "to": 12}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
}

// =============================================================================
// Branching model
// =============================================================================

/// Body of `PUT .../branching-model/settings`; only present sections are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchingModelSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_types: Option<Value>,
}

// =============================================================================
// Pipelines
// =============================================================================

/// Pipeline target as supplied by a tool caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineTargetInput {
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub ref_name: Option<String>,
    #[serde(default)]
    pub commit_hash: Option<String>,
    #[serde(default)]
    pub selector_type: Option<String>,
    #[serde(default)]
    pub selector_pattern: Option<String>,
}

/// Pipeline target in Bitbucket's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineTarget {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<PipelineSelector>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSelector {
    #[serde(rename = "type")]
    pub kind: String,
    pub pattern: String,
}

impl From<PipelineTargetInput> for PipelineTarget {
    fn from(input: PipelineTargetInput) -> Self {
        let commit = input.commit_hash.filter(|h| !h.is_empty()).map(|hash| CommitRef {
            kind: "commit".to_string(),
            hash,
        });
        let kind = if commit.is_some() {
            "pipeline_commit_target"
        } else {
            "pipeline_ref_target"
        };
        let selector = match (input.selector_type, input.selector_pattern) {
            (Some(kind), Some(pattern)) => Some(PipelineSelector { kind, pattern }),
            _ => None,
        };

        PipelineTarget {
            kind: kind.to_string(),
            ref_type: input.ref_type,
            ref_name: input.ref_name,
            commit,
            selector,
        }
    }
}

/// Pipeline variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineVariable {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub secured: bool,
}

/// Body of `POST .../pipelines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPipelineRequest {
    pub target: PipelineTarget,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<PipelineVariable>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reviewer_ref_parse() {
        assert_eq!(
            ReviewerRef::parse("{d3c7f1e2-0000-4000-8000-000000000000}"),
            ReviewerRef::Uuid("{d3c7f1e2-0000-4000-8000-000000000000}".to_string())
        );
        assert_eq!(
            ReviewerRef::parse("557058:abcd"),
            ReviewerRef::AccountId("557058:abcd".to_string())
        );
        assert_eq!(
            ReviewerRef::parse(" alice "),
            ReviewerRef::Username("alice".to_string())
        );
    }

    #[test]
    fn test_create_pull_request_shape() {
        let req = CreatePullRequestRequest {
            title: "Add feature".to_string(),
            description: "Body".to_string(),
            source: BranchTarget::new("feature/x"),
            destination: BranchTarget::new("main"),
            close_source_branch: true,
            reviewers: vec![ReviewerRef::parse("alice")],
            draft: Some(true),
        };

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "title": "Add feature",
                "description": "Body",
                "source": {"branch": {"name": "feature/x"}},
                "destination": {"branch": {"name": "main"}},
                "close_source_branch": true,
                "reviewers": [{"username": "alice"}],
                "draft": true
            })
        );
    }

    #[test]
    fn test_create_pull_request_omits_empty_fields() {
        let req = CreatePullRequestRequest {
            title: "t".to_string(),
            description: String::new(),
            source: BranchTarget::new("a"),
            destination: BranchTarget::new("b"),
            close_source_branch: true,
            reviewers: vec![],
            draft: None,
        };

        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("reviewers").is_none());
        assert!(value.get("draft").is_none());
    }

    #[test]
    fn test_update_pull_request_only_present_fields() {
        let req = UpdatePullRequestRequest {
            draft: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"draft": false}));
    }

    #[test]
    fn test_pipeline_ref_target() {
        let target = PipelineTarget::from(PipelineTargetInput {
            ref_type: Some("branch".to_string()),
            ref_name: Some("main".to_string()),
            selector_type: Some("custom".to_string()),
            selector_pattern: Some("deploy".to_string()),
            ..Default::default()
        });

        assert_eq!(
            serde_json::to_value(&target).unwrap(),
            json!({
                "type": "pipeline_ref_target",
                "ref_type": "branch",
                "ref_name": "main",
                "selector": {"type": "custom", "pattern": "deploy"}
            })
        );
    }

    #[test]
    fn test_pipeline_commit_target() {
        let target = PipelineTarget::from(PipelineTargetInput {
            ref_type: Some("branch".to_string()),
            ref_name: Some("main".to_string()),
            commit_hash: Some("abc123".to_string()),
            selector_type: Some("custom".to_string()),
            ..Default::default()
        });

        assert_eq!(target.kind, "pipeline_commit_target");
        assert_eq!(target.commit.unwrap().hash, "abc123");
        // Selector needs both a type and a pattern
        assert!(target.selector.is_none());
    }

    #[test]
    fn test_participant_pending_reviewer() {
        let participant: Participant = serde_json::from_value(json!({
            "user": {"nickname": "alice", "display_name": "Alice"},
            "role": "REVIEWER",
            "approved": false
        }))
        .unwrap();

        assert!(participant.is_pending_reviewer("alice"));
        assert!(!participant.is_pending_reviewer("bob"));

        let approved = Participant {
            approved: true,
            ..participant.clone()
        };
        assert!(!approved.is_pending_reviewer("alice"));

        let author = Participant {
            role: Some("PARTICIPANT".to_string()),
            ..participant
        };
        assert!(!author.is_pending_reviewer("alice"));
    }

    #[test]
    fn test_branching_update_only_present_sections() {
        let update = BranchingModelSettingsUpdate {
            development: Some(json!({"name": "develop"})),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"development": {"name": "develop"}})
        );
    }

    #[test]
    fn test_paginated_defaults() {
        let page: Paginated<Value> = serde_json::from_value(json!({
            "pagelen": 10,
            "values": [{"slug": "api"}],
            "next": "https://api.bitbucket.org/2.0/repositories/acme?page=2"
        }))
        .unwrap();
        assert_eq!(page.values.len(), 1);
        assert_eq!(page.pagelen, Some(10));
        assert!(page.next.is_some());

        let empty: Paginated<Value> = serde_json::from_value(json!({})).unwrap();
        assert!(empty.values.is_empty());
        assert!(empty.next.is_none());
    }
}
