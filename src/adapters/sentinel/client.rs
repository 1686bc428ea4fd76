use std::time::Duration;

use crate::adapters::http::{build_client, build_runtime};
use crate::adapters::sentinel::credentials::AzureCredentials;
use crate::core::errors::Result;

/// The Log Analytics workspace backing Sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace_name: String,
}

/// Blocking client for Microsoft Sentinel: log ingestion through a Data
/// Collection Rule and custom table management on the workspace.
pub struct SentinelClient {
    pub(super) http: reqwest::Client,
    pub(super) runtime: tokio::runtime::Runtime,
    pub(super) credentials: AzureCredentials,
    pub(super) workspace: Workspace,
}

impl SentinelClient {
    pub fn new(
        credentials: AzureCredentials,
        workspace: Workspace,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            runtime: build_runtime()?,
            credentials,
            workspace,
        })
    }
}
