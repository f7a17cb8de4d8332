//! Invocation run

use std::sync::Arc;

use tracing::debug;

use crate::ci::event::EventContext;
use crate::ci::inputs::InputSource;
use crate::ci::outputs::OutputSink;
use crate::config::DeploymentContext;
use crate::errors::ActionError;
use crate::http::client::HttpClient;
use crate::lifecycle::Controller;
use crate::steps::{self, Step};

/// Run one invocation of the action against the GitHub API
pub async fn run(
    inputs: &dyn InputSource,
    event: &EventContext,
    outputs: &dyn OutputSink,
) -> Result<(), ActionError> {
    // an unknown step fails before any configuration or remote work
    let step: Step = inputs.required("step")?.parse()?;

    let context = DeploymentContext::collect(inputs, event)?;
    debug!(
        "running '{}' for {}/{} @ {}",
        step, context.owner, context.repo, context.git_ref
    );

    let client = HttpClient::new(&context.api, &context.owner, &context.repo)?;
    let controller = Controller::new(Arc::new(client), context);

    steps::run(step, &controller, inputs, outputs).await
}
