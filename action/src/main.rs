//! GitHub Deployments action - Entry Point
//!
//! Runs one lifecycle step (start, finish, deactivate-env, delete-env) of a
//! GitHub deployment from inside a workflow job.

use std::env;
use std::process::ExitCode;

use deployments_action::app::run::run;
use deployments_action::ci::event::EventContext;
use deployments_action::ci::inputs::{EnvInputs, InputSource};
use deployments_action::ci::outputs::GithubOutput;
use deployments_action::errors::ActionError;
use deployments_action::logs::{fail, init_logging, LogOptions};
use deployments_action::utils::version_info;

#[tokio::main]
async fn main() -> ExitCode {
    // Print version and exit
    if env::args().skip(1).any(|arg| arg == "--version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{version}"),
            Err(e) => eprintln!("{e}"),
        }
        return ExitCode::SUCCESS;
    }

    let inputs = EnvInputs;

    // Initialize logging
    let log_options = LogOptions {
        json_format: inputs.boolean("log_json", false),
        ..LogOptions::for_step(inputs.boolean("debug", false))
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    let event = EventContext::from_env();
    let outputs = GithubOutput::from_env();

    match run(&inputs, &event, &outputs).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e {
                ActionError::ConfigError(_)
                | ActionError::UnknownStep(_)
                | ActionError::MissingEnvironmentAccess(_) => e.to_string(),
                other => format!("unexpected error encountered: {other}"),
            };
            fail(&message);
            ExitCode::FAILURE
        }
    }
}
