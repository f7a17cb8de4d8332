//! Start step: create (or adopt) a deployment and mark it in progress

use github_models::{CreateDeploymentRequest, CreateDeploymentStatusRequest};
use tracing::info;

use crate::config::StartArgs;
use crate::errors::ActionError;
use crate::lifecycle::fsm::{DeploymentFsm, LifecycleEvent};
use crate::lifecycle::targets::fan_out;
use crate::lifecycle::Controller;

/// A deployment that has been marked in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedDeployment {
    pub environment: String,
    pub deployment_id: u64,
    pub status_id: u64,

    /// Environment URL configured for this environment, if any
    pub url: Option<String>,
}

impl Controller {
    /// Start a deployment for every configured environment, concurrently
    pub async fn start(&self, args: &StartArgs) -> Result<Vec<StartedDeployment>, ActionError> {
        let environments = self.context.require_environments()?;

        if args.deployment_id.is_some() && environments.len() > 1 {
            return Err(ActionError::ConfigError(format!(
                "deployment_id cannot be reused across {} environments",
                environments.len()
            )));
        }
        if !args.env_urls.is_empty() && args.env_urls.len() != environments.len() {
            return Err(ActionError::ConfigError(format!(
                "got {} environment URLs for {} environments",
                args.env_urls.len(),
                environments.len()
            )));
        }

        let targets: Vec<(String, Option<String>)> = environments
            .iter()
            .enumerate()
            .map(|(i, env)| (env.clone(), args.env_urls.get(i).cloned()))
            .collect();

        fan_out(
            targets,
            |(environment, _)| environment.clone(),
            |(environment, url)| self.start_environment(environment, url, args),
        )
        .await
    }

    async fn start_environment(
        &self,
        environment: String,
        url: Option<String>,
        args: &StartArgs,
    ) -> Result<StartedDeployment, ActionError> {
        let ctx = &self.context;

        if args.override_existing {
            self.deactivate_environment(&environment).await?;
        }

        let mut fsm = DeploymentFsm::new();
        let deployment_id = match args.deployment_id {
            Some(id) => {
                fsm.process(LifecycleEvent::Adopt)?;
                info!(
                    "initializing deployment {} for {} @ {}",
                    id, environment, ctx.git_ref
                );
                id
            }
            None => {
                fsm.process(LifecycleEvent::Create)?;
                info!(
                    "initializing new deployment for {} @ {}",
                    environment, ctx.git_ref
                );
                let deployment = self
                    .api
                    .create_deployment(&CreateDeploymentRequest {
                        git_ref: ctx.git_ref.clone(),
                        environment: environment.clone(),
                        auto_merge: false,
                        required_contexts: Vec::new(),
                        transient_environment: args.transient,
                        task: ctx.task.clone(),
                        description: ctx.core.description.clone(),
                        payload: args.payload.clone(),
                    })
                    .await?;
                info!(
                    "created deployment {} for {} @ {}",
                    deployment.id, environment, ctx.git_ref
                );
                deployment.id
            }
        };

        let state = fsm.write(LifecycleEvent::Begin)?;

        let status = self
            .api
            .create_deployment_status(
                deployment_id,
                &CreateDeploymentStatusRequest {
                    state,
                    log_url: Some(ctx.core.logs_url.clone()),
                    description: ctx.core.description.clone(),
                    environment_url: None,
                    auto_inactive: None,
                },
            )
            .await?;
        info!(
            "created deployment status {} with status \"{}\"",
            status.id, state
        );

        Ok(StartedDeployment {
            environment,
            deployment_id,
            status_id: status.id,
            url,
        })
    }
}
