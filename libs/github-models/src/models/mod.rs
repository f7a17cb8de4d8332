//! API models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of a deployment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Queued,
    Pending,
    InProgress,
    Success,
    Failure,
    Error,
    Inactive,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Queued => "queued",
            DeploymentState::Pending => "pending",
            DeploymentState::InProgress => "in_progress",
            DeploymentState::Success => "success",
            DeploymentState::Failure => "failure",
            DeploymentState::Error => "error",
            DeploymentState::Inactive => "inactive",
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(DeploymentState::Queued),
            "pending" => Ok(DeploymentState::Pending),
            "in_progress" => Ok(DeploymentState::InProgress),
            "success" => Ok(DeploymentState::Success),
            "failure" => Ok(DeploymentState::Failure),
            "error" => Ok(DeploymentState::Error),
            "inactive" => Ok(DeploymentState::Inactive),
            _ => Err(format!("unknown deployment state: {}", s)),
        }
    }
}

/// A deployment as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: u64,

    /// Commit SHA the ref resolved to
    #[serde(default)]
    pub sha: String,

    #[serde(rename = "ref", default)]
    pub git_ref: String,

    #[serde(default)]
    pub task: Option<String>,

    pub environment: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub payload: serde_json::Value,

    #[serde(default)]
    pub transient_environment: bool,

    #[serde(default)]
    pub production_environment: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A status attached to a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub id: u64,

    pub state: DeploymentState,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub environment_url: Option<String>,

    #[serde(default)]
    pub log_url: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /repos/{owner}/{repo}/deployments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDeploymentRequest {
    #[serde(rename = "ref")]
    pub git_ref: String,

    pub environment: String,

    pub auto_merge: bool,

    /// Status contexts to verify; always sent, empty skips verification
    pub required_contexts: Vec<String>,

    pub transient_environment: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// Body of `POST /repos/{owner}/{repo}/deployments/{id}/statuses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDeploymentStatusRequest {
    pub state: DeploymentState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_inactive: Option<bool>,
}

impl CreateDeploymentStatusRequest {
    /// A bare status write carrying only the state
    pub fn new(state: DeploymentState) -> Self {
        Self {
            state,
            log_url: None,
            description: None,
            environment_url: None,
            auto_inactive: None,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,

    #[serde(default)]
    pub documentation_url: Option<String>,

    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}
