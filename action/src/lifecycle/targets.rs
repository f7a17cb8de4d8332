//! Batches of deployment targets and concurrent fan-out over them

use std::future::Future;

use futures::future::join_all;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::error;

use crate::errors::ActionError;

/// A deployment paired with the environment URL to report for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DeploymentTarget {
    pub fn new(id: u64, url: Option<String>) -> Self {
        Self { id, url }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_id(self) -> Result<u64, String> {
        match self {
            RawId::Number(id) => Ok(id),
            RawId::Text(text) => parse_deployment_id(&text),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?
        .into_id()
        .map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Full(DeploymentTarget),
    Bare(RawId),
}

/// Parse a deployment id as it appears in inputs
pub fn parse_deployment_id(raw: &str) -> Result<u64, String> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid deployment id: {:?}", raw))
}

/// Parse a list input: either a JSON array of strings or a comma-delimited string.
///
/// Entries are trimmed and empty entries dropped.
pub fn parse_list(raw: &str) -> Result<Vec<String>, ActionError> {
    let raw = raw.trim();
    let items: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str(raw)
            .map_err(|e| ActionError::ConfigError(format!("invalid JSON list {}: {}", raw, e)))?
    } else {
        raw.split(',').map(str::to_string).collect()
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

/// Parse a JSON batch of deployments: `[{"id": 1, "url": "..."}, 2, "3"]`
pub fn parse_deployment_targets(raw: &str) -> Result<Vec<DeploymentTarget>, ActionError> {
    let parsed: Vec<RawTarget> = serde_json::from_str(raw.trim()).map_err(|e| {
        ActionError::ConfigError(format!("invalid deployments batch {}: {}", raw.trim(), e))
    })?;

    parsed
        .into_iter()
        .map(|target| match target {
            RawTarget::Full(target) => Ok(target),
            RawTarget::Bare(id) => id
                .into_id()
                .map(|id| DeploymentTarget::new(id, None))
                .map_err(ActionError::ConfigError),
        })
        .collect()
}

/// Run `op` for every target concurrently.
///
/// Every branch runs to completion. Results keep the order of `targets`; if
/// any branch fails, all failures are returned together in a
/// [`ActionError::BatchError`] labelled by `label`. A single target is run
/// directly and its error returned unwrapped.
pub async fn fan_out<T, R, L, F, Fut>(
    mut targets: Vec<T>,
    label: L,
    op: F,
) -> Result<Vec<R>, ActionError>
where
    L: Fn(&T) -> String,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, ActionError>>,
{
    let total = targets.len();
    if total == 1 {
        if let Some(target) = targets.pop() {
            return op(target).await.map(|r| vec![r]);
        }
    }

    let labels: Vec<String> = targets.iter().map(&label).collect();
    let results = join_all(targets.into_iter().map(op)).await;

    let mut successes = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (label, result) in labels.into_iter().zip(results) {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => {
                error!("{}: {}", label, e);
                failures.push((label, e));
            }
        }
    }

    if failures.is_empty() {
        Ok(successes)
    } else {
        Err(ActionError::BatchError { total, failures })
    }
}
