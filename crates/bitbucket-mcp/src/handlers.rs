//! Tool handlers for MCP server.
//!
//! [`ToolHandler::dispatch`] looks the tool up in the registry, validates the
//! arguments against its descriptor and routes to the matching handler. The
//! handlers are stateless forwarders: each turns its arguments into one or
//! more [`ApiRequest`]s and maps the responses into a [`ToolOutput`].

use std::sync::Arc;

use bitbucket_api::{
    api_path, ApiRequest, BitbucketApi, BranchTarget, BranchingModelSettingsUpdate,
    CommentContent, CreateCommentRequest, CreatePullRequestRequest, MergePullRequestRequest,
    Paginated, Participant, PipelineTargetInput, PipelineVariable, ReviewerRef,
    RunPipelineRequest, UpdatePullRequestRequest,
};
use bitbucket_core::{branching, BitbucketConfig, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::format::ToolOutput;
use crate::protocol::ToolDefinition;
use crate::tools::ToolRegistry;

/// Confirmation returned by `unapprovePullRequest`.
pub const APPROVAL_REMOVED_MESSAGE: &str = "Pull request approval removed successfully.";

/// Confirmation returned by `stopPipeline`.
pub const PIPELINE_STOPPED_MESSAGE: &str = "Pipeline stop signal sent successfully.";

const DEFAULT_LIST_LIMIT: u32 = 10;
const DEFAULT_PENDING_REVIEW_LIMIT: usize = 50;
/// Repositories scanned by `getPendingReviewPRs` when no list is given.
const PENDING_REVIEW_REPO_SCAN: u32 = 100;
const PENDING_REVIEW_MAX_PAGELEN: usize = 50;

/// Tool handler that executes tools against the Bitbucket API.
pub struct ToolHandler {
    registry: ToolRegistry,
    config: Arc<BitbucketConfig>,
    api: Arc<dyn BitbucketApi>,
}

impl ToolHandler {
    /// Create a handler over the built-in tool registry.
    pub fn new(config: Arc<BitbucketConfig>, api: Arc<dyn BitbucketApi>) -> Self {
        Self {
            registry: ToolRegistry::new(),
            config,
            api,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Execute a tool by name with arguments.
    ///
    /// Unknown names fail with [`Error::UnknownTool`] and arguments that do
    /// not fit the tool's parameters with [`Error::InvalidArguments`]; in both
    /// cases no request is sent.
    pub async fn dispatch(&self, name: &str, arguments: Option<Value>) -> Result<ToolOutput> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        let args = tool.validate(arguments)?;

        debug!(tool = name, "Dispatching tool call");

        match tool.name {
            "health" => self.health(parse(args)?).await,

            "listRepositories" => self.list_repositories(parse(args)?).await,
            "getRepository" => {
                let p: RepoParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&[]))).await
            }

            "getPullRequests" => self.get_pull_requests(parse(args)?).await,
            "createPullRequest" => {
                let p: CreatePullRequestParams = parse(args)?;
                let draft = p.draft.unwrap_or(false);
                self.create_pull_request(p, draft).await
            }
            "createDraftPullRequest" => self.create_pull_request(parse(args)?, true).await,
            "getPullRequest" => {
                let p: PullRequestParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&[]))).await
            }
            "updatePullRequest" => self.update_pull_request(parse(args)?).await,
            "publishDraftPullRequest" => self.set_draft(parse(args)?, false).await,
            "convertTodraft" => self.set_draft(parse(args)?, true).await,
            "getPullRequestActivity" => {
                let p: PullRequestParams = parse(args)?;
                self.fetch_list(ApiRequest::get(p.path(&["activity"]))).await
            }
            "approvePullRequest" => {
                let p: PullRequestParams = parse(args)?;
                self.fetch_json(ApiRequest::post(p.path(&["approve"]))).await
            }
            "unapprovePullRequest" => {
                let p: PullRequestParams = parse(args)?;
                self.api.send(ApiRequest::delete(p.path(&["approve"]))).await?;
                Ok(ToolOutput::Text(APPROVAL_REMOVED_MESSAGE.to_string()))
            }
            "declinePullRequest" => self.decline_pull_request(parse(args)?).await,
            "mergePullRequest" => self.merge_pull_request(parse(args)?).await,
            "getPullRequestComments" => {
                let p: PullRequestParams = parse(args)?;
                self.fetch_list(ApiRequest::get(p.path(&["comments"]))).await
            }
            "getPullRequestCommits" => {
                let p: PullRequestParams = parse(args)?;
                self.fetch_list(ApiRequest::get(p.path(&["commits"]))).await
            }
            "getPullRequestDiff" => {
                let p: PullRequestParams = parse(args)?;
                self.fetch_text(ApiRequest::get(p.path(&["diff"]))).await
            }

            "addPullRequestComment" => {
                let p: AddCommentParams = parse(args)?;
                let pending = p.pending;
                self.add_comment(p, pending).await
            }
            "addPendingPullRequestComment" => self.add_comment(parse(args)?, Some(true)).await,
            "publishPendingComments" => self.publish_pending_comments(parse(args)?).await,

            "getPendingReviewPRs" => self.get_pending_review_prs(parse(args)?).await,

            "getRepositoryBranchingModel" => {
                let p: RepoParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&["branching-model"])))
                    .await
            }
            "getRepositoryBranchingModelSettings" => {
                let p: RepoParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&["branching-model", "settings"])))
                    .await
            }
            "updateRepositoryBranchingModelSettings" => {
                let p: RepoSettingsUpdateParams = parse(args)?;
                let request = ApiRequest::put(p.repo.path(&["branching-model", "settings"]))
                    .json(serde_json::to_value(&p.update)?);
                self.fetch_json(request).await
            }
            "getEffectiveRepositoryBranchingModel" => {
                self.get_effective_branching_model(parse(args)?).await
            }
            "getProjectBranchingModel" => {
                let p: ProjectParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&["branching-model"])))
                    .await
            }
            "getProjectBranchingModelSettings" => {
                let p: ProjectParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&["branching-model", "settings"])))
                    .await
            }
            "updateProjectBranchingModelSettings" => {
                let p: ProjectSettingsUpdateParams = parse(args)?;
                let request = ApiRequest::put(p.project.path(&["branching-model", "settings"]))
                    .json(serde_json::to_value(&p.update)?);
                self.fetch_json(request).await
            }

            "listPipelineRuns" => self.list_pipeline_runs(parse(args)?).await,
            "getPipelineRun" => {
                let p: PipelineParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&[]))).await
            }
            "runPipeline" => self.run_pipeline(parse(args)?).await,
            "stopPipeline" => {
                let p: PipelineParams = parse(args)?;
                self.api
                    .send(ApiRequest::post(p.path(&["stopPipeline"])))
                    .await?;
                Ok(ToolOutput::Text(PIPELINE_STOPPED_MESSAGE.to_string()))
            }
            "getPipelineSteps" => {
                let p: PipelineParams = parse(args)?;
                self.fetch_list(ApiRequest::get(p.path(&["steps"]))).await
            }
            "getPipelineStep" => {
                let p: PipelineStepParams = parse(args)?;
                self.fetch_json(ApiRequest::get(p.path(&[]))).await
            }
            "getPipelineStepLogs" => {
                let p: PipelineStepParams = parse(args)?;
                self.fetch_text(ApiRequest::get(p.path(&["log"]))).await
            }

            _ => Err(Error::UnknownTool(name.to_string())),
        }
    }

    // =========================================================================
    // Response helpers
    // =========================================================================

    async fn fetch_json(&self, request: ApiRequest) -> Result<ToolOutput> {
        let value = self.api.send(request).await?.into_json()?;
        Ok(ToolOutput::Json(value))
    }

    /// Fetch a paginated endpoint and return only its `values`.
    async fn fetch_list(&self, request: ApiRequest) -> Result<ToolOutput> {
        let values = self.api.send(request).await?.into_values()?;
        Ok(ToolOutput::Json(Value::Array(values)))
    }

    async fn fetch_text(&self, request: ApiRequest) -> Result<ToolOutput> {
        let text = self.api.send(request.text()).await?.into_text();
        Ok(ToolOutput::Text(text))
    }

    fn require_workspace(&self, workspace: Option<String>) -> Result<String> {
        self.config
            .resolve_workspace(workspace.as_deref())
            .ok_or_else(|| {
                Error::InvalidArguments(
                    "workspace must be provided or set via BITBUCKET_WORKSPACE".to_string(),
                )
            })
    }

    // =========================================================================
    // Health & repositories
    // =========================================================================

    /// Report configuration state and probe connectivity. Never fails; problems
    /// are reported in the result body.
    async fn health(&self, p: WorkspaceParams) -> Result<ToolOutput> {
        let workspace = self.config.resolve_workspace(p.workspace.as_deref());
        let mut details = json!({
            "hasToken": self.config.has_token(),
            "hasUser": self.config.has_user(),
            "workspaceResolved": workspace,
        });

        let Some(workspace) = workspace else {
            details["connectivity"] = json!(false);
            details["message"] = json!("Workspace not provided and BITBUCKET_WORKSPACE not set");
            return Ok(ToolOutput::Json(json!({ "status": "error", "details": details })));
        };

        let probe = ApiRequest::get(api_path(&["repositories", &workspace])).query("pagelen", 1);
        let status = match self.api.send(probe).await {
            Ok(_) => {
                details["connectivity"] = json!(true);
                "ok"
            }
            Err(e) => {
                warn!(workspace = %workspace, error = %e, "Health check failed");
                details["connectivity"] = json!(false);
                details["error"] = json!(e.to_string());
                "error"
            }
        };

        Ok(ToolOutput::Json(json!({ "status": status, "details": details })))
    }

    async fn list_repositories(&self, p: ListRepositoriesParams) -> Result<ToolOutput> {
        let workspace = self.require_workspace(p.workspace)?;
        let request = ApiRequest::get(api_path(&["repositories", &workspace]))
            .query("pagelen", p.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .query_opt(
                "q",
                p.name
                    .filter(|n| !n.is_empty())
                    .map(|n| format!("name~\"{}\"", n)),
            );
        self.fetch_list(request).await
    }

    // =========================================================================
    // Pull requests
    // =========================================================================

    async fn get_pull_requests(&self, p: GetPullRequestsParams) -> Result<ToolOutput> {
        let request = ApiRequest::get(p.repo.path(&["pullrequests"]))
            .query_opt("state", p.state.filter(|s| !s.is_empty()))
            .query("pagelen", p.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        self.fetch_list(request).await
    }

    async fn create_pull_request(
        &self,
        p: CreatePullRequestParams,
        draft: bool,
    ) -> Result<ToolOutput> {
        let body = CreatePullRequestRequest {
            title: p.title,
            description: p.description,
            source: BranchTarget::new(p.source_branch),
            destination: BranchTarget::new(p.target_branch),
            close_source_branch: true,
            reviewers: p.reviewers.iter().map(|r| ReviewerRef::parse(r)).collect(),
            draft: draft.then_some(true),
        };

        let request =
            ApiRequest::post(p.repo.path(&["pullrequests"])).json(serde_json::to_value(&body)?);
        self.fetch_json(request).await
    }

    async fn update_pull_request(&self, p: UpdatePullRequestParams) -> Result<ToolOutput> {
        let body = UpdatePullRequestRequest {
            title: p.title,
            description: p.description,
            draft: None,
        };
        let request = ApiRequest::put(p.pr.path(&[])).json(serde_json::to_value(&body)?);
        self.fetch_json(request).await
    }

    async fn set_draft(&self, p: PullRequestParams, draft: bool) -> Result<ToolOutput> {
        let body = UpdatePullRequestRequest {
            draft: Some(draft),
            ..Default::default()
        };
        let request = ApiRequest::put(p.path(&[])).json(serde_json::to_value(&body)?);
        self.fetch_json(request).await
    }

    async fn decline_pull_request(&self, p: DeclineParams) -> Result<ToolOutput> {
        let body = match p.message.filter(|m| !m.is_empty()) {
            Some(message) => json!({ "message": message }),
            None => json!({}),
        };
        self.fetch_json(ApiRequest::post(p.pr.path(&["decline"])).json(body))
            .await
    }

    async fn merge_pull_request(&self, p: MergeParams) -> Result<ToolOutput> {
        let body = MergePullRequestRequest {
            message: p.message.filter(|m| !m.is_empty()),
            merge_strategy: p.strategy.filter(|s| !s.is_empty()),
        };
        let request = ApiRequest::post(p.pr.path(&["merge"])).json(serde_json::to_value(&body)?);
        self.fetch_json(request).await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    async fn add_comment(&self, p: AddCommentParams, pending: Option<bool>) -> Result<ToolOutput> {
        // Null anchor fields are dropped; an empty anchor is omitted.
        let inline = p
            .inline
            .map(|fields| {
                fields
                    .into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .collect::<Map<String, Value>>()
            })
            .filter(|fields| !fields.is_empty())
            .map(Value::Object);

        let body = CreateCommentRequest {
            content: CommentContent { raw: p.content },
            inline,
            pending,
        };
        let request =
            ApiRequest::post(p.pr.path(&["comments"])).json(serde_json::to_value(&body)?);
        self.fetch_json(request).await
    }

    /// Flip every pending comment of the pull request to published.
    async fn publish_pending_comments(&self, p: PullRequestParams) -> Result<ToolOutput> {
        let comments = self
            .api
            .send(ApiRequest::get(p.path(&["comments"])))
            .await?
            .into_values()?;

        let mut results = Vec::new();
        for comment in comments {
            if comment.get("pending") != Some(&Value::Bool(true)) {
                continue;
            }
            let id = match comment.get("id") {
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::String(s)) => s.clone(),
                _ => {
                    warn!("Pending comment without id, skipping");
                    continue;
                }
            };

            let mut body = json!({
                "content": comment.get("content").cloned().unwrap_or(Value::Null),
                "pending": false,
            });
            if let Some(inline) = comment.get("inline") {
                body["inline"] = inline.clone();
            }

            let data = self
                .api
                .send(ApiRequest::put(p.path(&["comments", &id])).json(body))
                .await?
                .into_json()?;
            debug!(comment_id = %id, "Published pending comment");

            results.push(json!({
                "commentId": comment["id"],
                "status": "published",
                "data": data,
            }));
        }

        Ok(ToolOutput::Json(json!({
            "published": results.len(),
            "results": results,
        })))
    }

    // =========================================================================
    // Pending reviews
    // =========================================================================

    /// Open pull requests where the configured user is a reviewer who has not
    /// approved yet, newest activity first.
    async fn get_pending_review_prs(&self, p: PendingReviewParams) -> Result<ToolOutput> {
        let workspace = self.require_workspace(p.workspace)?;
        let user = self.config.username.clone().ok_or_else(|| {
            Error::Config(
                "BITBUCKET_USERNAME must be set to identify the current reviewer".to_string(),
            )
        })?;
        let limit = p.limit.unwrap_or(DEFAULT_PENDING_REVIEW_LIMIT);

        let repositories = match p.repository_list.filter(|list| !list.is_empty()) {
            Some(list) => list,
            None => {
                let request = ApiRequest::get(api_path(&["repositories", &workspace]))
                    .query("pagelen", PENDING_REVIEW_REPO_SCAN);
                let page: Paginated<Value> = self.api.send(request).await?.into_page()?;
                page.values
                    .iter()
                    .filter_map(|repo| {
                        repo.get("slug")
                            .or_else(|| repo.get("name"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .collect()
            }
        };

        let mut pending = Vec::new();
        for repo in &repositories {
            let request = ApiRequest::get(repo_path(&workspace, repo, &["pullrequests"]))
                .query("state", "OPEN")
                .query("pagelen", limit.min(PENDING_REVIEW_MAX_PAGELEN));

            let pull_requests = match self.api.send(request).await.and_then(|r| r.into_values()) {
                Ok(prs) => prs,
                Err(e) => {
                    warn!(repo = %repo, error = %e, "Failed to fetch pull requests");
                    continue;
                }
            };

            for mut pr in pull_requests {
                if !awaits_review_from(&pr, &user) {
                    continue;
                }
                if let Some(fields) = pr.as_object_mut() {
                    fields.insert(
                        "repository".to_string(),
                        json!({
                            "name": repo,
                            "full_name": format!("{}/{}", workspace, repo),
                        }),
                    );
                }
                pending.push(pr);
            }

            if pending.len() >= limit {
                break;
            }
        }

        pending.sort_by(|a, b| updated_on(b).cmp(updated_on(a)));
        pending.truncate(limit);
        let total_found = pending.len();

        Ok(ToolOutput::Json(json!({
            "pending_review_prs": pending,
            "total_found": total_found,
            "searched_repositories": repositories.len(),
            "user": user,
            "workspace": workspace,
        })))
    }

    // =========================================================================
    // Branching model
    // =========================================================================

    /// Overlay repository settings on the settings of the repository's project.
    async fn get_effective_branching_model(&self, p: RepoParams) -> Result<ToolOutput> {
        let repository = self
            .api
            .send(ApiRequest::get(p.path(&[])))
            .await?
            .into_json()?;
        let repo_settings = self
            .api
            .send(ApiRequest::get(p.path(&["branching-model", "settings"])))
            .await?
            .into_json()?;

        let Some(project_key) = repository.pointer("/project/key").and_then(Value::as_str)
        else {
            debug!(repo = %p.repo_slug, "Repository has no project, using its own settings");
            return Ok(ToolOutput::Json(repo_settings));
        };

        let project_settings = self
            .api
            .send(ApiRequest::get(project_path(
                &p.workspace,
                project_key,
                &["branching-model", "settings"],
            )))
            .await?
            .into_json()?;

        Ok(ToolOutput::Json(branching::resolve_effective(
            &project_settings,
            &repo_settings,
        )))
    }

    // =========================================================================
    // Pipelines
    // =========================================================================

    async fn list_pipeline_runs(&self, p: ListPipelinesParams) -> Result<ToolOutput> {
        let request = ApiRequest::get(p.repo.path(&["pipelines"]))
            .query_opt("pagelen", p.limit)
            .query_opt("status", p.status.filter(|s| !s.is_empty()))
            .query_opt("target.branch", p.target_branch.filter(|s| !s.is_empty()))
            .query_opt("trigger_type", p.trigger_type.filter(|s| !s.is_empty()));
        self.fetch_list(request).await
    }

    async fn run_pipeline(&self, p: RunPipelineParams) -> Result<ToolOutput> {
        let body = RunPipelineRequest {
            target: p.target.into(),
            variables: p.variables,
        };
        let request =
            ApiRequest::post(p.repo.path(&["pipelines"])).json(serde_json::to_value(&body)?);
        self.fetch_json(request).await
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| Error::InvalidArguments(e.to_string()))
}

fn repo_path(workspace: &str, repo_slug: &str, rest: &[&str]) -> String {
    let mut segments = vec!["repositories", workspace, repo_slug];
    segments.extend_from_slice(rest);
    api_path(&segments)
}

fn project_path(workspace: &str, project_key: &str, rest: &[&str]) -> String {
    let mut segments = vec!["workspaces", workspace, "projects", project_key];
    segments.extend_from_slice(rest);
    api_path(&segments)
}

fn awaits_review_from(pr: &Value, nickname: &str) -> bool {
    pr.get("participants")
        .and_then(Value::as_array)
        .is_some_and(|participants| {
            participants
                .iter()
                .filter_map(|p| Participant::deserialize(p).ok())
                .any(|p| p.is_pending_reviewer(nickname))
        })
}

fn updated_on(pr: &Value) -> &str {
    pr.get("updated_on").and_then(Value::as_str).unwrap_or("")
}

/// Pull request ids arrive as strings or integers.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or integer id, got {}",
            other
        ))),
    }
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
struct WorkspaceParams {
    workspace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoParams {
    workspace: String,
    repo_slug: String,
}

impl RepoParams {
    fn path(&self, rest: &[&str]) -> String {
        repo_path(&self.workspace, &self.repo_slug, rest)
    }
}

#[derive(Debug, Deserialize)]
struct PullRequestParams {
    workspace: String,
    repo_slug: String,
    #[serde(deserialize_with = "id_string")]
    pull_request_id: String,
}

impl PullRequestParams {
    fn path(&self, rest: &[&str]) -> String {
        let mut segments = vec!["pullrequests", self.pull_request_id.as_str()];
        segments.extend_from_slice(rest);
        repo_path(&self.workspace, &self.repo_slug, &segments)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectParams {
    workspace: String,
    project_key: String,
}

impl ProjectParams {
    fn path(&self, rest: &[&str]) -> String {
        project_path(&self.workspace, &self.project_key, rest)
    }
}

#[derive(Debug, Deserialize)]
struct PipelineParams {
    workspace: String,
    repo_slug: String,
    pipeline_uuid: String,
}

impl PipelineParams {
    fn path(&self, rest: &[&str]) -> String {
        let mut segments = vec!["pipelines", self.pipeline_uuid.as_str()];
        segments.extend_from_slice(rest);
        repo_path(&self.workspace, &self.repo_slug, &segments)
    }
}

#[derive(Debug, Deserialize)]
struct PipelineStepParams {
    #[serde(flatten)]
    pipeline: PipelineParams,
    step_uuid: String,
}

impl PipelineStepParams {
    fn path(&self, rest: &[&str]) -> String {
        let mut segments = vec!["steps", self.step_uuid.as_str()];
        segments.extend_from_slice(rest);
        self.pipeline.path(&segments)
    }
}

#[derive(Debug, Deserialize)]
struct ListRepositoriesParams {
    workspace: Option<String>,
    limit: Option<u32>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetPullRequestsParams {
    #[serde(flatten)]
    repo: RepoParams,
    state: Option<String>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CreatePullRequestParams {
    #[serde(flatten)]
    repo: RepoParams,
    title: String,
    description: String,
    #[serde(rename = "sourceBranch")]
    source_branch: String,
    #[serde(rename = "targetBranch")]
    target_branch: String,
    #[serde(default)]
    reviewers: Vec<String>,
    draft: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct UpdatePullRequestParams {
    #[serde(flatten)]
    pr: PullRequestParams,
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeclineParams {
    #[serde(flatten)]
    pr: PullRequestParams,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MergeParams {
    #[serde(flatten)]
    pr: PullRequestParams,
    message: Option<String>,
    strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddCommentParams {
    #[serde(flatten)]
    pr: PullRequestParams,
    content: String,
    inline: Option<Map<String, Value>>,
    pending: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PendingReviewParams {
    workspace: Option<String>,
    limit: Option<usize>,
    #[serde(rename = "repositoryList")]
    repository_list: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RepoSettingsUpdateParams {
    #[serde(flatten)]
    repo: RepoParams,
    #[serde(flatten)]
    update: BranchingModelSettingsUpdate,
}

#[derive(Debug, Deserialize)]
struct ProjectSettingsUpdateParams {
    #[serde(flatten)]
    project: ProjectParams,
    #[serde(flatten)]
    update: BranchingModelSettingsUpdate,
}

#[derive(Debug, Deserialize)]
struct ListPipelinesParams {
    #[serde(flatten)]
    repo: RepoParams,
    limit: Option<u32>,
    status: Option<String>,
    target_branch: Option<String>,
    trigger_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunPipelineParams {
    #[serde(flatten)]
    repo: RepoParams,
    target: PipelineTargetInput,
    #[serde(default)]
    variables: Vec<PipelineVariable>,
}
