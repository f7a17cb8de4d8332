//! Environment deletion

use tracing::{debug, info};

use crate::errors::ActionError;
use crate::lifecycle::Controller;

/// Outcome of deleting one environment
#[derive(Debug, Clone)]
pub struct DeleteReport {
    pub environment: String,

    /// Number of deployments deleted before the environment itself
    pub deleted_deployments: usize,
}

impl Controller {
    /// Delete every deployment of `environment`, then the environment.
    ///
    /// Deployments must be inactive before GitHub lets them go, so the
    /// environment is deactivated first. A 404 on the environment delete
    /// usually means the token lacks admin rights and is reported as
    /// [`ActionError::MissingEnvironmentAccess`].
    pub async fn delete_environment(&self, environment: &str) -> Result<DeleteReport, ActionError> {
        let report = self.deactivate_environment(environment).await?;

        for deployment in &report.deployments {
            info!(
                "{}.{}: deleting deployment ({})",
                environment, deployment.id, deployment.sha
            );
            self.api.delete_deployment(deployment.id).await?;
            debug!("{}.{} deleted", environment, deployment.id);
        }
        info!(
            "{}: {} deployments deleted",
            environment,
            report.deployments.len()
        );

        info!("deleting environment: \"{}\"", environment);
        match self.api.delete_environment(environment).await {
            Ok(()) => info!("{}: environment deleted", environment),
            Err(e) if e.remote_status() == Some(404) => {
                return Err(ActionError::MissingEnvironmentAccess(environment.to_string()));
            }
            Err(e) => return Err(e),
        }

        Ok(DeleteReport {
            environment: environment.to_string(),
            deleted_deployments: report.deployments.len(),
        })
    }
}
