//! Environment-wide deactivation

use github_models::{CreateDeploymentStatusRequest, Deployment, DeploymentState};
use tracing::{debug, info};

use crate::errors::ActionError;
use crate::http::deployments::MAX_PAGE_SIZE;
use crate::lifecycle::fsm::{DeploymentFsm, LifecycleEvent, Transition};
use crate::lifecycle::Controller;

/// Outcome of deactivating one environment
#[derive(Debug, Clone)]
pub struct DeactivateReport {
    pub environment: String,

    /// Every deployment listed for the environment
    pub deployments: Vec<Deployment>,

    /// Number of deployments that got an `inactive` status written
    pub deactivated: usize,
}

impl Controller {
    /// Mark every deployment of `environment` as `inactive`.
    ///
    /// Applies to all deployments of the environment regardless of ref.
    /// Deployments whose latest status is already `inactive` are skipped.
    pub async fn deactivate_environment(
        &self,
        environment: &str,
    ) -> Result<DeactivateReport, ActionError> {
        let deployments = self.api.list_deployments(environment, MAX_PAGE_SIZE).await?;
        if deployments.is_empty() {
            info!("found no existing deployments for env {}", environment);
            return Ok(DeactivateReport {
                environment: environment.to_string(),
                deployments,
                deactivated: 0,
            });
        }

        info!(
            "found {} existing deployments for env \"{}\" - marking all as \"{}\"",
            deployments.len(),
            environment,
            DeploymentState::Inactive
        );

        let mut deactivated = 0;
        for deployment in &deployments {
            let latest = self
                .api
                .list_deployment_statuses(deployment.id, 1)
                .await?
                .first()
                .map(|status| status.state);

            let mut fsm = DeploymentFsm::existing(latest);
            match fsm.process(LifecycleEvent::Deactivate)? {
                Transition::Write(state) => {
                    info!(
                        "setting deployment '{}.{}' ({}) state to \"{}\"",
                        environment, deployment.id, deployment.sha, state
                    );
                    self.api
                        .create_deployment_status(
                            deployment.id,
                            &CreateDeploymentStatusRequest::new(state),
                        )
                        .await?;
                    deactivated += 1;
                }
                _ => {
                    debug!(
                        "deployment '{}.{}' is already inactive",
                        environment, deployment.id
                    );
                }
            }
        }

        info!("{} deployments updated", deactivated);

        Ok(DeactivateReport {
            environment: environment.to_string(),
            deployments,
            deactivated,
        })
    }
}
