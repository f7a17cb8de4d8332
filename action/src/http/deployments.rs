//! Deployment API client

use async_trait::async_trait;
use github_models::{
    CreateDeploymentRequest, CreateDeploymentStatusRequest, Deployment, DeploymentStatus,
};
use http::StatusCode;

use crate::errors::ActionError;
use crate::http::client::HttpClient;

/// Largest page the deployments API serves
pub const MAX_PAGE_SIZE: u8 = 100;

/// Remote operations on a repository's deployments
#[async_trait]
pub trait DeploymentsApi: Send + Sync {
    /// Create a deployment; anything but `201 Created` is an error
    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<Deployment, ActionError>;

    /// Attach a status to a deployment
    async fn create_deployment_status(
        &self,
        deployment_id: u64,
        request: &CreateDeploymentStatusRequest,
    ) -> Result<DeploymentStatus, ActionError>;

    /// First page of deployments for an environment, newest first
    async fn list_deployments(
        &self,
        environment: &str,
        per_page: u8,
    ) -> Result<Vec<Deployment>, ActionError>;

    /// First page of statuses for a deployment, newest first
    async fn list_deployment_statuses(
        &self,
        deployment_id: u64,
        per_page: u8,
    ) -> Result<Vec<DeploymentStatus>, ActionError>;

    /// Delete an inactive deployment
    async fn delete_deployment(&self, deployment_id: u64) -> Result<(), ActionError>;

    /// Delete an environment
    async fn delete_environment(&self, environment: &str) -> Result<(), ActionError>;
}

#[async_trait]
impl DeploymentsApi for HttpClient {
    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<Deployment, ActionError> {
        let url = self.repo_url(&["deployments"]);
        self.post(url, request, StatusCode::CREATED).await
    }

    async fn create_deployment_status(
        &self,
        deployment_id: u64,
        request: &CreateDeploymentStatusRequest,
    ) -> Result<DeploymentStatus, ActionError> {
        let id = deployment_id.to_string();
        let url = self.repo_url(&["deployments", id.as_str(), "statuses"]);
        self.post(url, request, StatusCode::CREATED).await
    }

    async fn list_deployments(
        &self,
        environment: &str,
        per_page: u8,
    ) -> Result<Vec<Deployment>, ActionError> {
        let mut url = self.repo_url(&["deployments"]);
        url.query_pairs_mut()
            .append_pair("environment", environment)
            .append_pair("per_page", &per_page.min(MAX_PAGE_SIZE).to_string());
        self.get(url).await
    }

    async fn list_deployment_statuses(
        &self,
        deployment_id: u64,
        per_page: u8,
    ) -> Result<Vec<DeploymentStatus>, ActionError> {
        let id = deployment_id.to_string();
        let mut url = self.repo_url(&["deployments", id.as_str(), "statuses"]);
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.min(MAX_PAGE_SIZE).to_string());
        self.get(url).await
    }

    async fn delete_deployment(&self, deployment_id: u64) -> Result<(), ActionError> {
        let id = deployment_id.to_string();
        self.delete(self.repo_url(&["deployments", id.as_str()])).await
    }

    async fn delete_environment(&self, environment: &str) -> Result<(), ActionError> {
        self.delete(self.repo_url(&["environments", environment])).await
    }
}
