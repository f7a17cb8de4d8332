//! Resolved configuration for one invocation

use std::collections::HashSet;

use secrecy::SecretString;
use serde_json::Value;

use crate::ci::event::EventContext;
use crate::ci::inputs::InputSource;
use crate::errors::ActionError;
use crate::lifecycle::targets::{
    parse_deployment_id, parse_deployment_targets, parse_list, DeploymentTarget,
};

/// Remote API connection settings
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// REST API base URL
    pub base_url: String,

    /// API credential
    pub token: SecretString,
}

/// Arguments shared by every step
#[derive(Debug, Clone, Default)]
pub struct CoreArgs {
    /// Target environments, possibly empty for steps that don't need one
    pub environments: Vec<String>,

    pub description: Option<String>,

    /// Log URL attached to status writes
    pub logs_url: String,
}

/// Configuration for this run, built once at the entry point
#[derive(Debug, Clone)]
pub struct DeploymentContext {
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
    pub task: Option<String>,

    /// Log resolved step arguments
    pub log_args: bool,

    pub api: ApiSettings,

    pub core: CoreArgs,
}

impl DeploymentContext {
    /// Resolve the context from step inputs and the triggering event
    pub fn collect(inputs: &dyn InputSource, event: &EventContext) -> Result<Self, ActionError> {
        let (owner, repo) = parse_repository(
            &inputs
                .optional("repository")
                .unwrap_or_else(|| event.repository.clone()),
        )?;

        let git_ref = inputs
            .optional("ref")
            .or_else(|| Some(event.git_ref.clone()).filter(|r| !r.is_empty()))
            .ok_or_else(|| ActionError::missing_input("ref"))?;

        let mut environments = match inputs.optional("envs").or_else(|| inputs.optional("env")) {
            Some(raw) => parse_list(&raw)?,
            None => Vec::new(),
        };
        let mut seen = HashSet::new();
        environments.retain(|env| seen.insert(env.clone()));

        let logs_url = inputs.optional("logs").unwrap_or_else(|| {
            format!(
                "{}/{}/{}/commit/{}/checks",
                event.server_url.trim_end_matches('/'),
                owner,
                repo,
                event.sha
            )
        });

        Ok(Self {
            owner,
            repo,
            git_ref,
            task: inputs.optional("task"),
            log_args: inputs.boolean("log_args", false),
            api: ApiSettings {
                base_url: event.api_url.clone(),
                token: SecretString::from(inputs.required("token")?),
            },
            core: CoreArgs {
                environments,
                description: inputs.optional("desc"),
                logs_url,
            },
        })
    }

    /// Environments for steps that need at least one
    pub fn require_environments(&self) -> Result<&[String], ActionError> {
        if self.core.environments.is_empty() {
            return Err(ActionError::missing_input("env"));
        }
        Ok(&self.core.environments)
    }
}

/// Split `owner/repo`
pub fn parse_repository(raw: &str) -> Result<(String, String), ActionError> {
    match raw.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ActionError::ConfigError(format!(
            "invalid target repository: {}",
            raw
        ))),
    }
}

/// Arguments for the `start` step
#[derive(Debug, Clone, Default)]
pub struct StartArgs {
    /// Reuse an existing deployment instead of creating one
    pub deployment_id: Option<u64>,

    /// Deactivate existing deployments of the environment first
    pub override_existing: bool,

    pub transient: bool,

    pub payload: Option<Value>,

    /// Environment URLs, positionally matched to environments
    pub env_urls: Vec<String>,
}

impl StartArgs {
    pub fn collect(inputs: &dyn InputSource) -> Result<Self, ActionError> {
        let deployment_id = inputs
            .optional("deployment_id")
            .map(|raw| parse_deployment_id(&raw).map_err(ActionError::ConfigError))
            .transpose()?;

        let payload = inputs
            .optional("payload")
            .map(|raw| {
                serde_json::from_str::<Value>(&raw)
                    .map_err(|e| ActionError::ConfigError(format!("invalid payload: {}", e)))
            })
            .transpose()?;

        // `env_url` is a single URL and may itself contain commas
        let env_urls = match inputs.optional("env_urls") {
            Some(raw) => parse_list(&raw)?,
            None => inputs.optional("env_url").into_iter().collect(),
        };

        Ok(Self {
            deployment_id,
            // on by default; the legacy `no_override: "true"` turns it off
            override_existing: inputs.boolean("override", true)
                && !inputs.boolean("no_override", false),
            transient: inputs.boolean("transient", false),
            payload,
            env_urls,
        })
    }
}

/// Arguments for the `finish` step
#[derive(Debug, Clone, Default)]
pub struct FinishArgs {
    /// Requested status, lowercased but not yet validated
    pub status: String,

    /// Deployments to finish, each with its own environment URL
    pub targets: Vec<DeploymentTarget>,

    /// Deactivate configured environments first and let GitHub deactivate past deployments
    pub override_existing: bool,

    pub auto_inactive: bool,
}

impl FinishArgs {
    pub fn collect(inputs: &dyn InputSource) -> Result<Self, ActionError> {
        let status = inputs.required("status")?.to_lowercase();

        let targets = match inputs.optional("deployments") {
            Some(raw) => parse_deployment_targets(&raw)?,
            None => {
                let raw = inputs.required("deployment_id")?;
                if raw.starts_with('[') {
                    parse_deployment_targets(&raw)?
                } else {
                    let id = parse_deployment_id(&raw).map_err(ActionError::ConfigError)?;
                    vec![DeploymentTarget::new(id, inputs.optional("env_url"))]
                }
            }
        };
        if targets.is_empty() {
            return Err(ActionError::missing_input("deployment_id"));
        }

        Ok(Self {
            status,
            targets,
            override_existing: inputs.boolean("override", true),
            auto_inactive: inputs.boolean("auto_inactive", false),
        })
    }
}
