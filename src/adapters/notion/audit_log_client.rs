use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};

use crate::adapters::http::{build_client, build_runtime, decode_json, read_body, transport};
use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::audit_log_page::{AuditLogPage, AuditLogRequest};
use crate::core::traits::audit_source::AuditLogSource;

const AUDIT_LOG_ENDPOINT: &str = "https://www.notion.so/api/v3/searchAuditLogForOrganization";

/// Service name used in errors.
pub const NOTION_SERVICE: &str = "Notion audit log API";

/// Blocking client for Notion's organization audit log search endpoint.
pub struct NotionAuditLogClient {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    token: SecretString,
}

impl NotionAuditLogClient {
    /// Create a client authenticating with `token`.
    pub fn new(token: SecretString, request_timeout: Duration) -> Result<Self> {
        if token.expose_secret().trim().is_empty() {
            return Err(Notion2SenError::InvalidConfig {
                detail: "no Notion API token provided".into(),
            });
        }

        Ok(Self {
            http: build_client(request_timeout)?,
            runtime: build_runtime()?,
            token,
        })
    }
}

impl NotionAuditLogClient {
    /// Build the HTTP request for one search call without sending it.
    pub fn build_request(&self, request: &AuditLogRequest) -> Result<reqwest::Request> {
        self.http
            .post(AUDIT_LOG_ENDPOINT)
            .header(CONTENT_TYPE, "application/json")
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(request)
            .build()
            .map_err(|e| transport(NOTION_SERVICE, e))
    }
}

impl AuditLogSource for NotionAuditLogClient {
    fn fetch_page(&self, request: &AuditLogRequest) -> Result<AuditLogPage> {
        let http_request = self.build_request(request)?;

        self.runtime.block_on(async {
            let response = self
                .http
                .execute(http_request)
                .await
                .map_err(|e| transport(NOTION_SERVICE, e))?;

            let body = read_body(NOTION_SERVICE, response).await?;
            decode_json(NOTION_SERVICE, &body)
        })
    }
}
