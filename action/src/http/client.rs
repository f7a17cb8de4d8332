//! HTTP client implementation

use std::time::Duration;

use github_models::ErrorResponse;
use http::StatusCode;
use reqwest::{header, Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ApiSettings;
use crate::errors::ActionError;

const API_VERSION: &str = "2022-11-28";

/// HTTP client for one repository's REST resources
pub struct HttpClient {
    client: Client,
    base_url: Url,
    owner: String,
    repo: String,
    token: SecretString,
}

impl HttpClient {
    /// Create a new HTTP client scoped to `owner/repo`
    pub fn new(settings: &ApiSettings, owner: &str, repo: &str) -> Result<Self, ActionError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("deployments-action/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(settings.base_url.trim_end_matches('/')).map_err(|e| {
            ActionError::ConfigError(format!("invalid API URL {}: {}", settings.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ActionError::ConfigError(format!(
                "invalid API URL {}",
                settings.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: settings.token.clone(),
        })
    }

    /// URL of `/repos/{owner}/{repo}/{segments...}`, each segment percent-encoded
    pub fn repo_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str()])
                .extend(segments);
        }
        url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ActionError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        let response = check_status(response, None).await?;
        Ok(response.json().await?)
    }

    /// Make a POST request that must answer with `expected`
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        expected: StatusCode,
    ) -> Result<T, ActionError> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .send()
            .await?;

        let response = check_status(response, Some(expected)).await?;
        Ok(response.json().await?)
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: Url) -> Result<(), ActionError> {
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        check_status(response, None).await?;
        Ok(())
    }
}

/// Turn unexpected responses into [`ActionError::RemoteError`].
///
/// Without `expected`, any 2xx status is accepted.
async fn check_status(
    response: Response,
    expected: Option<StatusCode>,
) -> Result<Response, ActionError> {
    let status = response.status();
    let accepted = match expected {
        Some(expected) => status == expected,
        None => status.is_success(),
    };
    if accepted {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    debug!("HTTP request to {} failed: {} - {}", url, status, message);

    Err(ActionError::RemoteError {
        status: status.as_u16(),
        message,
    })
}
