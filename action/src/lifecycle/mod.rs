//! Deployment lifecycle controller
//!
//! Each step of the action maps to one operation here. Operations take the
//! resolved [`DeploymentContext`] and talk to GitHub only through
//! [`DeploymentsApi`], so they can run against a fake in tests.

pub mod deactivate;
pub mod delete;
pub mod finish;
pub mod fsm;
pub mod start;
pub mod targets;

use std::sync::Arc;

use crate::config::DeploymentContext;
use crate::http::deployments::DeploymentsApi;

pub use deactivate::DeactivateReport;
pub use delete::DeleteReport;
pub use finish::{FinishOutcome, FinishedDeployment};
pub use start::StartedDeployment;

/// Runs lifecycle operations for one invocation
pub struct Controller {
    api: Arc<dyn DeploymentsApi>,
    context: DeploymentContext,
}

impl Controller {
    pub fn new(api: Arc<dyn DeploymentsApi>, context: DeploymentContext) -> Self {
        Self { api, context }
    }

    pub fn context(&self) -> &DeploymentContext {
        &self.context
    }
}
