//! Step dispatch
//!
//! One invocation runs exactly one step, chosen by the `step` input.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, error, info};

use crate::ci::inputs::InputSource;
use crate::ci::outputs::{annotate_error, OutputSink};
use crate::config::{FinishArgs, StartArgs};
use crate::errors::ActionError;
use crate::lifecycle::targets::{fan_out, DeploymentTarget};
use crate::lifecycle::{Controller, FinishOutcome};

/// Status id reported when the finish step wrote nothing
pub const NO_STATUS_ID: i64 = -1;

/// Lifecycle step selected for this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Start,
    Finish,
    DeactivateEnv,
    DeleteEnv,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::Finish => "finish",
            Step::DeactivateEnv => "deactivate-env",
            Step::DeleteEnv => "delete-env",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(Step::Start),
            "finish" => Ok(Step::Finish),
            "deactivate-env" => Ok(Step::DeactivateEnv),
            "delete-env" => Ok(Step::DeleteEnv),
            other => Err(ActionError::UnknownStep(other.to_string())),
        }
    }
}

/// Parse `raw_step` and run it
pub async fn dispatch(
    raw_step: &str,
    controller: &Controller,
    inputs: &dyn InputSource,
    outputs: &dyn OutputSink,
) -> Result<(), ActionError> {
    let step: Step = raw_step.parse()?;
    run(step, controller, inputs, outputs).await
}

/// Run one step and publish its outputs
pub async fn run(
    step: Step,
    controller: &Controller,
    inputs: &dyn InputSource,
    outputs: &dyn OutputSink,
) -> Result<(), ActionError> {
    let ctx = controller.context();

    match step {
        Step::Start => {
            let args = StartArgs::collect(inputs)?;
            log_args(controller, step, &args);

            let started = controller.start(&args).await?;

            let deployments: Vec<DeploymentTarget> = started
                .iter()
                .map(|s| DeploymentTarget::new(s.deployment_id, s.url.clone()))
                .collect();
            let environments: Vec<&str> = started.iter().map(|s| s.environment.as_str()).collect();

            // scalar outputs describe the first environment
            if let Some(first) = started.first() {
                outputs.set_output("deployment_id", &first.deployment_id.to_string())?;
                outputs.set_output("status_id", &first.status_id.to_string())?;
                outputs.set_output("env", &first.environment)?;
            }
            outputs.set_output("envs", &serde_json::to_string(&environments)?)?;
            outputs.set_output("deployments", &serde_json::to_string(&deployments)?)?;
        }

        Step::Finish => {
            let args = FinishArgs::collect(inputs)?;
            log_args(controller, step, &args);

            match controller.finish(&args).await? {
                FinishOutcome::Finished(finished) => {
                    let status_ids: Vec<u64> = finished.iter().map(|f| f.status_id).collect();
                    if let Some(first) = status_ids.first() {
                        outputs.set_output("status_id", &first.to_string())?;
                    }
                    outputs.set_output("status_ids", &serde_json::to_string(&status_ids)?)?;
                }
                FinishOutcome::Rejected(e) => {
                    // reported, but the step itself does not fail
                    error!("{}", e);
                    annotate_error(&e.to_string());
                    outputs.set_output("status_id", &NO_STATUS_ID.to_string())?;
                }
            }
        }

        Step::DeactivateEnv => {
            let environments = ctx.require_environments()?.to_vec();
            log_args(controller, step, &environments);

            let reports = fan_out(
                environments,
                |env| env.clone(),
                |env| async move { controller.deactivate_environment(&env).await },
            )
            .await?;
            for report in reports {
                debug!(
                    "{}: {} of {} deployments deactivated",
                    report.environment,
                    report.deactivated,
                    report.deployments.len()
                );
            }
        }

        Step::DeleteEnv => {
            let environments = ctx.require_environments()?.to_vec();
            log_args(controller, step, &environments);

            let reports = fan_out(
                environments,
                |env| env.clone(),
                |env| async move { controller.delete_environment(&env).await },
            )
            .await?;
            for report in reports {
                debug!(
                    "{}: removed with {} deployments",
                    report.environment, report.deleted_deployments
                );
            }
        }
    }

    Ok(())
}

fn log_args<A: fmt::Debug>(controller: &Controller, step: Step, args: &A) {
    let ctx = controller.context();
    if ctx.log_args {
        info!("'{}' arguments {:?} {:?}", step, args, ctx.core);
    } else {
        debug!("'{}' arguments {:?} {:?}", step, args, ctx.core);
    }
}
