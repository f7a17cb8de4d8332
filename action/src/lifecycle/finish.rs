//! Finish step: write the final status of one or more deployments

use github_models::{CreateDeploymentStatusRequest, DeploymentState};
use tracing::{debug, info};

use crate::config::FinishArgs;
use crate::errors::ActionError;
use crate::lifecycle::fsm::{DeploymentFsm, LifecycleEvent};
use crate::lifecycle::targets::{fan_out, DeploymentTarget};
use crate::lifecycle::Controller;

/// Status values accepted by the finish step
pub const ACCEPTED_STATUSES: &[&str] = &[
    "success",
    "failure",
    "cancelled",
    "error",
    "inactive",
    "in_progress",
    "queued",
    "pending",
];

/// Map a requested status onto the state written to GitHub.
///
/// GitHub has no cancelled state, so `cancelled` becomes `inactive`.
pub fn resolve_state(status: &str) -> Result<DeploymentState, ActionError> {
    if !ACCEPTED_STATUSES.contains(&status) {
        return Err(ActionError::ValidationError(status.to_string()));
    }
    match status {
        "cancelled" => Ok(DeploymentState::Inactive),
        other => other
            .parse()
            .map_err(|_| ActionError::ValidationError(other.to_string())),
    }
}

/// A deployment that received its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedDeployment {
    pub deployment_id: u64,
    pub status_id: u64,
    pub state: DeploymentState,
}

/// Result of the finish step
#[derive(Debug)]
pub enum FinishOutcome {
    /// Statuses written, one per target
    Finished(Vec<FinishedDeployment>),

    /// The requested status was not acceptable; nothing was sent
    Rejected(ActionError),
}

impl Controller {
    /// Write the requested status to every target deployment, concurrently.
    ///
    /// An unacceptable status is not an error of the step: it comes back as
    /// [`FinishOutcome::Rejected`] before any remote call is made.
    pub async fn finish(&self, args: &FinishArgs) -> Result<FinishOutcome, ActionError> {
        let state = match resolve_state(&args.status) {
            Ok(state) => state,
            Err(e) => return Ok(FinishOutcome::Rejected(e)),
        };

        let environments = &self.context.core.environments;
        if args.override_existing {
            if environments.is_empty() {
                debug!("no environment configured, leaving deactivation to auto_inactive");
            } else {
                fan_out(
                    environments.clone(),
                    |env| env.clone(),
                    |env| async move { self.deactivate_environment(&env).await },
                )
                .await?;
            }
        }

        let auto_inactive = args.override_existing || args.auto_inactive;
        let finished = fan_out(
            args.targets.clone(),
            |target| target.id.to_string(),
            |target| self.finish_deployment(target, &args.status, state, auto_inactive),
        )
        .await?;

        Ok(FinishOutcome::Finished(finished))
    }

    async fn finish_deployment(
        &self,
        target: DeploymentTarget,
        requested: &str,
        state: DeploymentState,
        auto_inactive: bool,
    ) -> Result<FinishedDeployment, ActionError> {
        let ctx = &self.context;
        info!(
            "finishing deployment for {} with status {}",
            target.id, requested
        );

        // the latest remote status is not read, including after an override
        let state = DeploymentFsm::existing(None).write(LifecycleEvent::Finish(state))?;

        let status = self
            .api
            .create_deployment_status(
                target.id,
                &CreateDeploymentStatusRequest {
                    state,
                    log_url: Some(ctx.core.logs_url.clone()),
                    description: ctx.core.description.clone(),
                    // only reported for deployments that worked
                    environment_url: target.url.filter(|_| state == DeploymentState::Success),
                    auto_inactive: Some(auto_inactive),
                },
            )
            .await?;
        info!("{} status set to {}", target.id, state);

        Ok(FinishedDeployment {
            deployment_id: target.id,
            status_id: status.id,
            state,
        })
    }
}
