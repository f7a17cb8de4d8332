//! Lifecycle controller tests against the in-memory API

use std::sync::Arc;

use deployments_action::config::{FinishArgs, StartArgs};
use deployments_action::errors::ActionError;
use deployments_action::lifecycle::finish::ACCEPTED_STATUSES;
use deployments_action::lifecycle::FinishOutcome;
use github_models::DeploymentState;
use tokio_test::{assert_err, assert_ok};

use crate::common::{controller, inputs, Call, FakeApi};

#[tokio::test]
async fn test_start_creates_deployment_and_in_progress_status() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[("env", "staging"), ("ref", "abc123"), ("override", "false")]);
    let controller = controller(&api, &inputs);

    let started = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap();

    assert_eq!(started.len(), 1);
    assert_eq!(started[0].environment, "staging");

    let created = api.created_deployments();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].git_ref, "abc123");
    assert_eq!(created[0].environment, "staging");
    assert!(created[0].required_contexts.is_empty());
    assert!(!created[0].auto_merge);

    let writes = api.status_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, started[0].deployment_id);
    assert_eq!(writes[0].1.state, DeploymentState::InProgress);
    assert_eq!(
        writes[0].1.log_url.as_deref(),
        Some("https://github.com/octo/app/commit/abc123/checks")
    );
}

#[tokio::test]
async fn test_start_without_override_never_deactivates() {
    let api = Arc::new(
        FakeApi::new().with_deployment(1, "staging", Some(DeploymentState::Success)),
    );
    let inputs = inputs(&[("env", "staging"), ("override", "false")]);
    let controller = controller(&api, &inputs);

    assert_ok!(controller.start(&StartArgs::collect(&inputs).unwrap()).await);

    assert!(api
        .position(|c| matches!(c, Call::ListDeployments(_)))
        .is_none());
    assert_eq!(api.status_writes().len(), 1);
}

#[tokio::test]
async fn test_start_with_override_deactivates_before_creating() {
    let api = Arc::new(
        FakeApi::new().with_deployment(1, "staging", Some(DeploymentState::Success)),
    );
    let inputs = inputs(&[("env", "staging")]);
    let controller = controller(&api, &inputs);

    let started = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap();

    let listed = api
        .position(|c| matches!(c, Call::ListDeployments(env) if env == "staging"))
        .unwrap();
    let deactivated = api
        .position(|c| matches!(c, Call::CreateStatus(1, r) if r.state == DeploymentState::Inactive))
        .unwrap();
    let created = api
        .position(|c| matches!(c, Call::CreateDeployment(_)))
        .unwrap();
    assert!(listed < deactivated);
    assert!(deactivated < created);

    let last = api.status_writes().pop().unwrap();
    assert_eq!(last.0, started[0].deployment_id);
    assert_eq!(last.1.state, DeploymentState::InProgress);
}

#[tokio::test]
async fn test_start_reuses_existing_deployment() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[("env", "staging"), ("deployment_id", "77"), ("override", "false")]);
    let controller = controller(&api, &inputs);

    let started = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap();

    assert_eq!(started[0].deployment_id, 77);
    assert!(api.created_deployments().is_empty());
    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::CreateStatus(77, ref r) if r.state == DeploymentState::InProgress));
}

#[tokio::test]
async fn test_start_forwards_payload_task_and_transient() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[
        ("env", "preview"),
        ("override", "false"),
        ("transient", "true"),
        ("task", "deploy:migrations"),
        ("desc", "preview for PR"),
        ("payload", r#"{"pr": 7}"#),
    ]);
    let controller = controller(&api, &inputs);

    assert_ok!(controller.start(&StartArgs::collect(&inputs).unwrap()).await);

    let created = &api.created_deployments()[0];
    assert!(created.transient_environment);
    assert_eq!(created.task.as_deref(), Some("deploy:migrations"));
    assert_eq!(created.description.as_deref(), Some("preview for PR"));
    assert_eq!(created.payload, Some(serde_json::json!({ "pr": 7 })));
}

#[tokio::test]
async fn test_start_fans_out_over_environments() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[
        ("envs", r#"["staging", "qa"]"#),
        ("env_urls", "https://staging.example.com,https://qa.example.com"),
        ("override", "false"),
    ]);
    let controller = controller(&api, &inputs);

    let started = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap();

    assert_eq!(started.len(), 2);
    assert_eq!(started[0].environment, "staging");
    assert_eq!(started[0].url.as_deref(), Some("https://staging.example.com"));
    assert_eq!(started[1].environment, "qa");
    assert_ne!(started[0].deployment_id, started[1].deployment_id);
    assert_eq!(api.created_deployments().len(), 2);
    assert_eq!(api.status_writes().len(), 2);
}

#[tokio::test]
async fn test_start_repeated_environment_runs_once() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[("envs", "staging,staging"), ("override", "false")]);
    let controller = controller(&api, &inputs);

    let started = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap();

    assert_eq!(started.len(), 1);
    assert_eq!(api.created_deployments().len(), 1);
    assert_eq!(api.status_writes().len(), 1);
}

#[tokio::test]
async fn test_start_env_url_with_comma() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[
        ("env", "staging"),
        ("env_url", "https://app.example.com/?ids=1,2"),
        ("override", "false"),
    ]);
    let controller = controller(&api, &inputs);

    let started = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap();
    assert_eq!(started[0].url.as_deref(), Some("https://app.example.com/?ids=1,2"));
}

#[tokio::test]
async fn test_start_reports_failed_branches_without_rollback() {
    let api = Arc::new(FakeApi::new().fail_create_for("qa"));
    let inputs = inputs(&[("envs", "staging, qa, prod"), ("override", "false")]);
    let controller = controller(&api, &inputs);

    let err = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap_err();

    match err {
        ActionError::BatchError { total, failures } => {
            assert_eq!(total, 3);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, "qa");
            assert_eq!(failures[0].1.remote_status(), Some(409));
        }
        other => panic!("unexpected error: {other}"),
    }

    // the other environments still got their deployments
    let environments: Vec<String> = api
        .created_deployments()
        .into_iter()
        .map(|d| d.environment)
        .collect();
    assert!(environments.contains(&"staging".to_string()));
    assert!(environments.contains(&"prod".to_string()));
    assert_eq!(api.status_writes().len(), 2);
}

#[tokio::test]
async fn test_start_rejects_reused_id_across_environments() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[("envs", "a,b"), ("deployment_id", "5")]);
    let controller = controller(&api, &inputs);

    let err = controller
        .start(&StartArgs::collect(&inputs).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::ConfigError(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_start_requires_environment() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[]);
    let controller = controller(&api, &inputs);

    assert_err!(controller.start(&StartArgs::collect(&inputs).unwrap()).await);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_finish_cancelled_writes_inactive_without_url() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[
        ("deployment_id", "42"),
        ("status", "CANCELLED"),
        ("env_url", "https://x"),
    ]);
    let controller = controller(&api, &inputs);

    let outcome = controller
        .finish(&FinishArgs::collect(&inputs).unwrap())
        .await
        .unwrap();
    assert!(matches!(outcome, FinishOutcome::Finished(ref f) if f.len() == 1));

    let writes = api.status_writes();
    assert_eq!(writes.len(), 1);
    let (id, request) = &writes[0];
    assert_eq!(*id, 42);
    assert_eq!(request.state, DeploymentState::Inactive);
    assert_eq!(request.environment_url, None);
    // override defaults on for finish
    assert_eq!(request.auto_inactive, Some(true));
}

#[tokio::test]
async fn test_finish_success_reports_environment_url() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[
        ("deployment_id", "42"),
        ("status", "success"),
        ("env_url", "https://staging.example.com"),
        ("override", "false"),
    ]);
    let controller = controller(&api, &inputs);

    assert_ok!(controller.finish(&FinishArgs::collect(&inputs).unwrap()).await);

    let (_, request) = &api.status_writes()[0];
    assert_eq!(request.state, DeploymentState::Success);
    assert_eq!(
        request.environment_url.as_deref(),
        Some("https://staging.example.com")
    );
    assert_eq!(request.auto_inactive, Some(false));
}

#[tokio::test]
async fn test_finish_environment_url_only_for_success() {
    for status in ACCEPTED_STATUSES {
        let api = Arc::new(FakeApi::new());
        let inputs = inputs(&[
            ("deployment_id", "9"),
            ("status", *status),
            ("env_url", "https://x"),
        ]);
        let controller = controller(&api, &inputs);

        assert_ok!(controller.finish(&FinishArgs::collect(&inputs).unwrap()).await);

        let (_, request) = &api.status_writes()[0];
        assert_eq!(
            request.environment_url.is_some(),
            request.state == DeploymentState::Success,
            "status {}",
            status
        );
        assert_ne!(request.state.as_str(), "cancelled");
    }
}

#[tokio::test]
async fn test_finish_rejects_unknown_status_without_remote_calls() {
    let api = Arc::new(FakeApi::new().with_deployment(1, "prod", Some(DeploymentState::Success)));
    let inputs = inputs(&[("env", "prod"), ("deployment_id", "1"), ("status", "rolled-back")]);
    let controller = controller(&api, &inputs);

    let outcome = controller
        .finish(&FinishArgs::collect(&inputs).unwrap())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        FinishOutcome::Rejected(ActionError::ValidationError(ref s)) if s == "rolled-back"
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_finish_batch_uses_each_url() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[
        ("status", "success"),
        (
            "deployments",
            r#"[{"id": 1, "url": "https://one"}, {"id": 2, "url": "https://two"}, {"id": 3}]"#,
        ),
        ("override", "false"),
    ]);
    let controller = controller(&api, &inputs);

    let outcome = controller
        .finish(&FinishArgs::collect(&inputs).unwrap())
        .await
        .unwrap();
    let FinishOutcome::Finished(finished) = outcome else {
        panic!("finish was rejected");
    };
    assert_eq!(
        finished.iter().map(|f| f.deployment_id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let mut writes = api.status_writes();
    writes.sort_by_key(|(id, _)| *id);
    let urls: Vec<Option<&str>> = writes
        .iter()
        .map(|(_, r)| r.environment_url.as_deref())
        .collect();
    assert_eq!(urls, vec![Some("https://one"), Some("https://two"), None]);
}

#[tokio::test]
async fn test_finish_override_deactivates_environment_first() {
    let api = Arc::new(
        FakeApi::new()
            .with_deployment(1, "prod", Some(DeploymentState::Success))
            .with_deployment(2, "prod", Some(DeploymentState::InProgress)),
    );
    let inputs = inputs(&[("env", "prod"), ("deployment_id", "2"), ("status", "success")]);
    let controller = controller(&api, &inputs);

    assert_ok!(controller.finish(&FinishArgs::collect(&inputs).unwrap()).await);

    let writes = api.status_writes();
    assert_eq!(writes.len(), 3);
    let (id, last) = writes.last().unwrap();
    assert_eq!(*id, 2);
    assert_eq!(last.state, DeploymentState::Success);
    assert!(writes[..2]
        .iter()
        .all(|(_, r)| r.state == DeploymentState::Inactive));
}

#[tokio::test]
async fn test_deactivate_skips_inactive_deployments() {
    let api = Arc::new(
        FakeApi::new()
            .with_deployment(1, "prod", Some(DeploymentState::Success))
            .with_deployment(2, "prod", Some(DeploymentState::Inactive))
            .with_deployment(3, "prod", Some(DeploymentState::Failure))
            .with_deployment(4, "staging", Some(DeploymentState::Success)),
    );
    let inputs = inputs(&[("env", "prod")]);
    let controller = controller(&api, &inputs);

    let report = controller.deactivate_environment("prod").await.unwrap();

    assert_eq!(report.deployments.len(), 3);
    assert_eq!(report.deactivated, 2);

    let mut written: Vec<u64> = api.status_writes().iter().map(|(id, _)| *id).collect();
    written.sort();
    assert_eq!(written, vec![1, 3]);
    assert!(api
        .status_writes()
        .iter()
        .all(|(_, r)| r.state == DeploymentState::Inactive));
}

#[tokio::test]
async fn test_deactivate_deployment_without_status() {
    let api = Arc::new(FakeApi::new().with_deployment(5, "prod", None));
    let inputs = inputs(&[("env", "prod")]);
    let controller = controller(&api, &inputs);

    let report = controller.deactivate_environment("prod").await.unwrap();
    assert_eq!(report.deactivated, 1);
}

#[tokio::test]
async fn test_deactivate_empty_environment() {
    let api = Arc::new(FakeApi::new());
    let inputs = inputs(&[("env", "prod")]);
    let controller = controller(&api, &inputs);

    let report = controller.deactivate_environment("prod").await.unwrap();
    assert_eq!(report.deactivated, 0);
    assert_eq!(api.calls(), vec![Call::ListDeployments("prod".to_string())]);
}

#[tokio::test]
async fn test_delete_environment_deactivates_then_deletes() {
    let api = Arc::new(
        FakeApi::new()
            .with_deployment(1, "review-7", Some(DeploymentState::Success))
            .with_deployment(2, "review-7", Some(DeploymentState::Inactive)),
    );
    let inputs = inputs(&[("env", "review-7")]);
    let controller = controller(&api, &inputs);

    let report = controller.delete_environment("review-7").await.unwrap();
    assert_eq!(report.deleted_deployments, 2);

    let deactivated = api
        .position(|c| matches!(c, Call::CreateStatus(1, _)))
        .unwrap();
    let first_delete = api
        .position(|c| matches!(c, Call::DeleteDeployment(_)))
        .unwrap();
    let env_delete = api
        .position(|c| matches!(c, Call::DeleteEnvironment(e) if e == "review-7"))
        .unwrap();
    assert!(deactivated < first_delete);
    assert!(first_delete < env_delete);
    assert_eq!(
        api.calls()
            .iter()
            .filter(|c| matches!(c, Call::DeleteDeployment(_)))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_delete_environment_404_hints_at_token_scope() {
    let api = Arc::new(FakeApi::new().fail_delete_environment(404));
    let inputs = inputs(&[("env", "review-7")]);
    let controller = controller(&api, &inputs);

    let err = controller.delete_environment("review-7").await.unwrap_err();
    assert!(matches!(err, ActionError::MissingEnvironmentAccess(ref e) if e == "review-7"));
    assert!(err.to_string().contains("repo scope"));
}

#[tokio::test]
async fn test_delete_environment_other_failures_stay_remote_errors() {
    let api = Arc::new(FakeApi::new().fail_delete_environment(500));
    let inputs = inputs(&[("env", "review-7")]);
    let controller = controller(&api, &inputs);

    let err = controller.delete_environment("review-7").await.unwrap_err();
    assert_eq!(err.remote_status(), Some(500));
}
