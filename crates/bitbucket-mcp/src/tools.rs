//! MCP tool definitions.
//!
//! Every tool is described once in [`TOOLS`]; the descriptor drives both the
//! `inputSchema` advertised by `tools/list` and argument validation before a
//! handler runs.

use std::collections::HashMap;

use bitbucket_core::{Error, Result};
use serde_json::{json, Map, Value};

use crate::protocol::ToolDefinition;

/// JSON type accepted by a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    Object,
    Array,
    /// String or integer (pull request ids)
    Id,
}

impl ParamKind {
    /// Whether `value` has this kind. `null` never matches.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Object => value.is_object(),
            ParamKind::Array => value.is_array(),
            ParamKind::Id => value.is_string() || value.is_i64() || value.is_u64(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::Object => "object",
            ParamKind::Array => "array",
            ParamKind::Id => "string or integer",
        }
    }

    fn schema(&self) -> Value {
        match self {
            ParamKind::Id => json!({ "type": ["string", "integer"] }),
            other => json!({ "type": other.type_name() }),
        }
    }
}

/// One named tool parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
    /// Inclusive bounds for integer parameters
    pub range: Option<(i64, i64)>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            range: None,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
            range: None,
        }
    }

    pub const fn with_range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    fn check(&self, value: &Value) -> Result<()> {
        if !self.kind.matches(value) {
            return Err(Error::InvalidArguments(format!(
                "'{}' must be of type {}",
                self.name,
                self.kind.type_name()
            )));
        }

        if let (Some((min, max)), Some(n)) = (self.range, value.as_i64()) {
            if n < min || n > max {
                return Err(Error::InvalidArguments(format!(
                    "'{}' must be between {} and {}",
                    self.name, min, max
                )));
            }
        }

        Ok(())
    }

    fn schema(&self) -> Value {
        let mut schema = self.kind.schema();
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".into(), json!(self.description));
            if let Some((min, max)) = self.range {
                obj.insert("minimum".into(), json!(min));
                obj.insert("maximum".into(), json!(max));
            }
            if self.kind == ParamKind::Array {
                obj.insert("items".into(), json!({}));
            }
        }
        schema
    }
}

/// Static description of a tool.
#[derive(Debug)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }

    /// Check arguments against the parameter list.
    ///
    /// Missing arguments read as an empty object. A `null` value counts as
    /// absent. Unknown keys are ignored.
    pub fn validate(&self, arguments: Option<Value>) -> Result<Value> {
        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(v @ Value::Object(_)) => v,
            Some(_) => {
                return Err(Error::InvalidArguments(
                    "arguments must be a JSON object".to_string(),
                ))
            }
        };

        for param in self.params {
            match arguments.get(param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(Error::InvalidArguments(format!(
                        "missing required parameter '{}'",
                        param.name
                    )))
                }
                None | Some(Value::Null) => {}
                Some(value) => param.check(value)?,
            }
        }

        Ok(arguments)
    }
}

// =============================================================================
// Parameter building blocks
// =============================================================================

use ParamKind::{Array, Boolean, Id, Integer, Object};

const WORKSPACE: ParamSpec =
    ParamSpec::required("workspace", ParamKind::String, "Bitbucket workspace slug");
const DEFAULT_WORKSPACE: ParamSpec = ParamSpec::optional(
    "workspace",
    ParamKind::String,
    "Bitbucket workspace slug. Uses BITBUCKET_WORKSPACE when omitted.",
);
const REPO_SLUG: ParamSpec =
    ParamSpec::required("repo_slug", ParamKind::String, "Repository slug");
const PULL_REQUEST_ID: ParamSpec = ParamSpec::required("pull_request_id", Id, "Pull request ID");
const PROJECT_KEY: ParamSpec =
    ParamSpec::required("project_key", ParamKind::String, "Project key (e.g., ABC)");
const PIPELINE_UUID: ParamSpec =
    ParamSpec::required("pipeline_uuid", ParamKind::String, "Pipeline UUID");
const STEP_UUID: ParamSpec = ParamSpec::required("step_uuid", ParamKind::String, "Step UUID");

const TITLE: ParamSpec = ParamSpec::required("title", ParamKind::String, "Pull request title");
const DESCRIPTION: ParamSpec = ParamSpec::required(
    "description",
    ParamKind::String,
    "Pull request description/body",
);
const SOURCE_BRANCH: ParamSpec = ParamSpec::required(
    "sourceBranch",
    ParamKind::String,
    "Source branch name (feature branch)",
);
const TARGET_BRANCH: ParamSpec = ParamSpec::required(
    "targetBranch",
    ParamKind::String,
    "Target branch name (e.g., main)",
);
const REVIEWERS: ParamSpec = ParamSpec::optional(
    "reviewers",
    Array,
    "Optional list of reviewers (usernames, account IDs or UUIDs)",
);

const COMMENT_CONTENT: ParamSpec =
    ParamSpec::required("content", ParamKind::String, "Comment text content");
const COMMENT_INLINE: ParamSpec = ParamSpec::optional(
    "inline",
    Object,
    "Inline context for file/line comments (path, from, to)",
);

const DEVELOPMENT: ParamSpec =
    ParamSpec::optional("development", Object, "Development branch settings payload");
const PRODUCTION: ParamSpec =
    ParamSpec::optional("production", Object, "Production branch settings payload");
const BRANCH_TYPES: ParamSpec =
    ParamSpec::optional("branch_types", Array, "Branch types configuration list");

const REPO: &[ParamSpec] = &[WORKSPACE, REPO_SLUG];
const PULL_REQUEST: &[ParamSpec] = &[WORKSPACE, REPO_SLUG, PULL_REQUEST_ID];
const PROJECT: &[ParamSpec] = &[WORKSPACE, PROJECT_KEY];
const PIPELINE: &[ParamSpec] = &[WORKSPACE, REPO_SLUG, PIPELINE_UUID];
const PIPELINE_STEP: &[ParamSpec] = &[WORKSPACE, REPO_SLUG, PIPELINE_UUID, STEP_UUID];

/// All built-in tools, in the order `tools/list` reports them.
pub static TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "health",
        description: "Health check: validates configuration and Bitbucket connectivity (optionally for a given workspace).",
        params: &[DEFAULT_WORKSPACE],
    },
    // Repositories
    ToolDescriptor {
        name: "listRepositories",
        description: "List repositories in a workspace. Optionally filter by `name` (contains) and limit results.",
        params: &[
            DEFAULT_WORKSPACE,
            ParamSpec::optional("limit", Integer, "Maximum number of repositories to return (default: 10)")
                .with_range(1, 100),
            ParamSpec::optional("name", ParamKind::String, "Filter repositories whose name contains this string."),
        ],
    },
    ToolDescriptor {
        name: "getRepository",
        description: "Get repository details by `workspace` and `repo_slug`.",
        params: REPO,
    },
    // Pull requests
    ToolDescriptor {
        name: "getPullRequests",
        description: "List pull requests for a repository. Optionally filter by `state` and limit results.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            ParamSpec::optional("state", ParamKind::String, "Filter by PR state: OPEN, MERGED, DECLINED, SUPERSEDED"),
            ParamSpec::optional("limit", Integer, "Maximum number of pull requests to return (default: 10)")
                .with_range(1, 100),
        ],
    },
    ToolDescriptor {
        name: "createPullRequest",
        description: "Create a pull request. Set `draft=true` to create a draft PR.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            TITLE,
            DESCRIPTION,
            SOURCE_BRANCH,
            TARGET_BRANCH,
            REVIEWERS,
            ParamSpec::optional("draft", Boolean, "Create as draft PR when true"),
        ],
    },
    ToolDescriptor {
        name: "getPullRequest",
        description: "Get a pull request by ID.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "updatePullRequest",
        description: "Update a pull request's title and/or description.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            PULL_REQUEST_ID,
            ParamSpec::optional("title", ParamKind::String, "New title"),
            ParamSpec::optional("description", ParamKind::String, "New description/body"),
        ],
    },
    ToolDescriptor {
        name: "getPullRequestActivity",
        description: "List activity (comments, approvals, updates) for a pull request.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "approvePullRequest",
        description: "Approve a pull request as the current user.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "unapprovePullRequest",
        description: "Remove your approval from a pull request.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "declinePullRequest",
        description: "Decline (close) a pull request. Optionally provide a message.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            PULL_REQUEST_ID,
            ParamSpec::optional("message", ParamKind::String, "Optional decline message"),
        ],
    },
    ToolDescriptor {
        name: "mergePullRequest",
        description: "Merge a pull request. Optionally set a commit `message` and merge `strategy`.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            PULL_REQUEST_ID,
            ParamSpec::optional("message", ParamKind::String, "Optional merge commit message"),
            ParamSpec::optional("strategy", ParamKind::String, "Merge strategy (merge_commit, squash, fast_forward)"),
        ],
    },
    ToolDescriptor {
        name: "getPullRequestComments",
        description: "List comments for a pull request.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "getPullRequestCommits",
        description: "List commits included in a pull request.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "getPullRequestDiff",
        description: "Get unified diff for a pull request.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "addPullRequestComment",
        description: "Add a comment to a pull request. Set `inline` for file/line comments; set `pending=true` to keep it as a draft.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            PULL_REQUEST_ID,
            COMMENT_CONTENT,
            COMMENT_INLINE,
            ParamSpec::optional("pending", Boolean, "When true, keep the comment pending until published"),
        ],
    },
    ToolDescriptor {
        name: "addPendingPullRequestComment",
        description: "Add a pending (unpublished) comment to a pull request. Equivalent to `pending=true`.",
        params: &[WORKSPACE, REPO_SLUG, PULL_REQUEST_ID, COMMENT_CONTENT, COMMENT_INLINE],
    },
    ToolDescriptor {
        name: "publishPendingComments",
        description: "Publish all pending comments on a pull request.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "createDraftPullRequest",
        description: "Create a draft pull request.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            TITLE,
            DESCRIPTION,
            SOURCE_BRANCH,
            TARGET_BRANCH,
            REVIEWERS,
        ],
    },
    ToolDescriptor {
        name: "publishDraftPullRequest",
        description: "Publish a draft pull request (mark it ready for review).",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "convertTodraft",
        description: "Convert an open pull request to draft.",
        params: PULL_REQUEST,
    },
    ToolDescriptor {
        name: "getPendingReviewPRs",
        description: "List PRs awaiting your review across repositories in a workspace.",
        params: &[
            DEFAULT_WORKSPACE,
            ParamSpec::optional("limit", Integer, "Maximum number of pull requests to return (default: 50)")
                .with_range(1, 100),
            ParamSpec::optional("repositoryList", Array, "Optional list of repository slugs to limit the search to"),
        ],
    },
    // Branching models
    ToolDescriptor {
        name: "getRepositoryBranchingModel",
        description: "Get repository-level branching model.",
        params: REPO,
    },
    ToolDescriptor {
        name: "getRepositoryBranchingModelSettings",
        description: "Get repository branching model settings (raw, may inherit from project).",
        params: REPO,
    },
    ToolDescriptor {
        name: "updateRepositoryBranchingModelSettings",
        description: "Update repository branching model settings.",
        params: &[WORKSPACE, REPO_SLUG, DEVELOPMENT, PRODUCTION, BRANCH_TYPES],
    },
    ToolDescriptor {
        name: "getEffectiveRepositoryBranchingModel",
        description: "Resolve the effective repository branching model (repository settings over project defaults).",
        params: REPO,
    },
    ToolDescriptor {
        name: "getProjectBranchingModel",
        description: "Get project-level branching model (defaults for repositories).",
        params: PROJECT,
    },
    ToolDescriptor {
        name: "getProjectBranchingModelSettings",
        description: "Get project branching model settings (raw).",
        params: PROJECT,
    },
    ToolDescriptor {
        name: "updateProjectBranchingModelSettings",
        description: "Update project branching model settings.",
        params: &[WORKSPACE, PROJECT_KEY, DEVELOPMENT, PRODUCTION, BRANCH_TYPES],
    },
    // Pipelines
    ToolDescriptor {
        name: "listPipelineRuns",
        description: "List pipeline runs for a repository. Filter by status, branch, trigger type, and limit.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            ParamSpec::optional("limit", Integer, "Maximum number of pipeline runs to return.")
                .with_range(1, 100),
            ParamSpec::optional("status", ParamKind::String, "Filter by pipeline status (e.g., COMPLETED, FAILED, RUNNING)"),
            ParamSpec::optional("target_branch", ParamKind::String, "Filter by target branch name"),
            ParamSpec::optional("trigger_type", ParamKind::String, "Filter by trigger type (e.g., PUSH, MANUAL)"),
        ],
    },
    ToolDescriptor {
        name: "getPipelineRun",
        description: "Get details for a specific pipeline run.",
        params: PIPELINE,
    },
    ToolDescriptor {
        name: "runPipeline",
        description: "Trigger a pipeline run for a target (branch/commit) with optional variables.",
        params: &[
            WORKSPACE,
            REPO_SLUG,
            ParamSpec::required(
                "target",
                Object,
                "Target: ref_type, ref_name, optional commit_hash, selector_type, selector_pattern",
            ),
            ParamSpec::optional("variables", Array, "Optional list of pipeline variables {key, value, secured}"),
        ],
    },
    ToolDescriptor {
        name: "stopPipeline",
        description: "Stop a running pipeline.",
        params: PIPELINE,
    },
    ToolDescriptor {
        name: "getPipelineSteps",
        description: "List steps for a pipeline run.",
        params: PIPELINE,
    },
    ToolDescriptor {
        name: "getPipelineStep",
        description: "Get details for a pipeline step.",
        params: PIPELINE_STEP,
    },
    ToolDescriptor {
        name: "getPipelineStepLogs",
        description: "Get raw logs for a pipeline step.",
        params: PIPELINE_STEP,
    },
];

/// Name-indexed view over [`TOOLS`].
#[derive(Debug)]
pub struct ToolRegistry {
    tools: &'static [ToolDescriptor],
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Registry of the built-in tools.
    pub fn new() -> Self {
        let index = TOOLS
            .iter()
            .enumerate()
            .map(|(i, tool)| (tool.name, i))
            .collect();
        Self {
            tools: TOOLS,
            index,
        }
    }

    /// Look up a descriptor by exact name.
    pub fn get(&self, name: &str) -> Option<&'static ToolDescriptor> {
        let tools = self.tools;
        self.index.get(name).map(|&i| &tools[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions for `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.iter().map(ToolDescriptor::definition).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_has_all_tools() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.len(), 36);

        let names: HashSet<_> = registry.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 36, "tool names must be unique");
        assert!(registry.get("getPullRequestDiff").is_some());
        assert!(registry.get("convertTodraft").is_some());
        assert!(registry.get("getpullrequestdiff").is_none());
    }

    #[test]
    fn test_param_names_unique_per_tool() {
        for tool in TOOLS {
            let names: HashSet<_> = tool.params.iter().map(|p| p.name).collect();
            assert_eq!(names.len(), tool.params.len(), "duplicate param in {}", tool.name);
        }
    }

    #[test]
    fn test_input_schema() {
        let tool = ToolRegistry::new().get("getPullRequest").unwrap();
        let schema = tool.input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["required"],
            json!(["workspace", "repo_slug", "pull_request_id"])
        );
        assert_eq!(
            schema["properties"]["pull_request_id"]["type"],
            json!(["string", "integer"])
        );
        assert_eq!(schema["properties"]["workspace"]["type"], "string");
    }

    #[test]
    fn test_input_schema_range() {
        let tool = ToolRegistry::new().get("listRepositories").unwrap();
        let schema = tool.input_schema();

        assert_eq!(schema["required"], json!([]));
        assert_eq!(schema["properties"]["limit"]["minimum"], 1);
        assert_eq!(schema["properties"]["limit"]["maximum"], 100);
    }

    #[test]
    fn test_validate_accepts_valid() {
        let tool = ToolRegistry::new().get("getPullRequest").unwrap();

        let args = json!({"workspace": "acme", "repo_slug": "api", "pull_request_id": 42});
        assert_eq!(tool.validate(Some(args.clone())).unwrap(), args);

        let args = json!({"workspace": "acme", "repo_slug": "api", "pull_request_id": "42"});
        assert!(tool.validate(Some(args)).is_ok());
    }

    #[test]
    fn test_validate_missing_required() {
        let tool = ToolRegistry::new().get("getRepository").unwrap();

        let err = tool
            .validate(Some(json!({"workspace": "acme"})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(ref m) if m.contains("repo_slug")));

        let err = tool
            .validate(Some(json!({"workspace": "acme", "repo_slug": null})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));

        assert!(matches!(
            tool.validate(None),
            Err(Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_validate_wrong_type() {
        let tool = ToolRegistry::new().get("createPullRequest").unwrap();
        let args = json!({
            "workspace": "acme",
            "repo_slug": "api",
            "title": "t",
            "description": "d",
            "sourceBranch": "feature",
            "targetBranch": "main",
            "draft": "yes"
        });

        let err = tool.validate(Some(args)).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(ref m) if m.contains("draft")));
    }

    #[test]
    fn test_validate_range_and_shape() {
        let tool = ToolRegistry::new().get("listRepositories").unwrap();

        assert!(tool.validate(Some(json!({"limit": 100}))).is_ok());
        assert!(matches!(
            tool.validate(Some(json!({"limit": 0}))),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            tool.validate(Some(json!({"limit": 2.5}))),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            tool.validate(Some(json!(["acme"]))),
            Err(Error::InvalidArguments(_))
        ));
        assert!(tool.validate(None).is_ok());
    }

    #[test]
    fn test_param_kind_matches() {
        assert!(ParamKind::Id.matches(&json!(7)));
        assert!(ParamKind::Id.matches(&json!("7")));
        assert!(!ParamKind::Id.matches(&json!(true)));
        assert!(!ParamKind::String.matches(&Value::Null));
        assert!(ParamKind::Array.matches(&json!([])));
        assert!(!ParamKind::Object.matches(&json!([])));
    }

    #[test]
    fn test_definitions_order() {
        let defs = ToolRegistry::new().definitions();
        assert_eq!(defs.first().map(|d| d.name.as_str()), Some("health"));
        assert_eq!(
            defs.last().map(|d| d.name.as_str()),
            Some("getPipelineStepLogs")
        );
    }
}
