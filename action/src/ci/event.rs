//! Context of the workflow run that triggered this step

use std::env;

const DEFAULT_SERVER_URL: &str = "https://github.com";
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Values the runner exports about the triggering event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// `owner/repo` of the workflow's repository
    pub repository: String,

    /// Ref that triggered the run
    pub git_ref: String,

    /// Commit SHA that triggered the run
    pub sha: String,

    /// Web URL of the GitHub server
    pub server_url: String,

    /// REST API base URL
    pub api_url: String,
}

impl EventContext {
    /// Read the event context from the runner environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the event context through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let repository = get("GITHUB_REPOSITORY").unwrap_or_default();

        Self {
            repository,
            git_ref: get("GITHUB_REF").unwrap_or_default(),
            sha: get("GITHUB_SHA").unwrap_or_default(),
            server_url: get("GITHUB_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        }
    }
}
