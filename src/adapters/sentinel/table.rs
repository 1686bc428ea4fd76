use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::info;

use crate::adapters::http::{read_body, transport};
use crate::adapters::sentinel::client::{SentinelClient, Workspace};
use crate::adapters::sentinel::credentials::MANAGEMENT_SCOPE;
use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::flat_record::FLAT_RECORD_KEYS;

/// Custom Log Analytics table receiving the audit logs.
pub const TABLE_NAME: &str = "NotionAuditLogs_CL";

const MANAGEMENT_URL: &str = "https://management.azure.com";
const TABLES_API_VERSION: &str = "2022-10-01";
const MANAGEMENT_SERVICE: &str = "Azure Resource Manager";

/// ARM URL of a table in the workspace.
pub fn table_url(workspace: &Workspace, table: &str) -> String {
    format!(
        "{MANAGEMENT_URL}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.OperationalInsights/workspaces/{}/tables/{table}?api-version={TABLES_API_VERSION}",
        workspace.subscription_id, workspace.resource_group, workspace.workspace_name
    )
}

/// Table resource body: one column per flat record key and the retention
/// period.
pub fn table_definition(table: &str, retention_days: u32) -> Value {
    let columns: Vec<Value> = FLAT_RECORD_KEYS
        .iter()
        .map(|name| {
            let kind = if *name == "TimeGenerated" { "datetime" } else { "string" };
            json!({"name": name, "type": kind})
        })
        .collect();

    json!({
        "properties": {
            "schema": {
                "name": table,
                "columns": columns
            },
            "retentionInDays": retention_days,
            "totalRetentionInDays": retention_days
        }
    })
}

impl SentinelClient {
    /// Create or update the audit log table with the given retention.
    pub fn create_table(&self, retention_days: u32) -> Result<()> {
        let url = table_url(&self.workspace, TABLE_NAME);
        let body = table_definition(TABLE_NAME, retention_days);

        self.runtime.block_on(async {
            let token = self
                .credentials
                .access_token(&self.http, MANAGEMENT_SCOPE)
                .await?;

            let response = self
                .http
                .put(&url)
                .bearer_auth(token.expose_secret())
                .header(CONTENT_TYPE, "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| transport(MANAGEMENT_SERVICE, e))?;
            read_body(MANAGEMENT_SERVICE, response).await?;

            Ok::<(), Notion2SenError>(())
        })?;

        info!(
            table = TABLE_NAME,
            workspace = %self.workspace.workspace_name,
            retention_days,
            "Sentinel table is up to date"
        );
        Ok(())
    }
}
