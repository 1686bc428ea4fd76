use serde::{Deserialize, Serialize};

use super::audit_event::{AuditEvent, null_as_default};

/// Number of events requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Opaque pagination token handed out by the audit log API.
///
/// The pipeline never looks inside it; it is echoed back verbatim on the
/// next request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(pub serde_json::Value);

/// Sort order accepted by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    CreatedNewest,
}

/// Body of one `searchAuditLogForOrganization` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<PageCursor>,
    pub limit: u32,
    pub filters: AuditLogFilters,
    pub sort: SortOrder,
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogFilters {
    pub time_range: TimeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    /// Lower bound in epoch milliseconds.
    pub starting: i64,
}

impl AuditLogRequest {
    /// Build the request for one page, newest events first.
    pub fn page(organization_id: &str, starting_ms: i64, cursor: Option<PageCursor>) -> Self {
        Self {
            cursor,
            limit: PAGE_SIZE,
            filters: AuditLogFilters {
                time_range: TimeRange {
                    starting: starting_ms,
                },
            },
            sort: SortOrder::CreatedNewest,
            organization_id: organization_id.to_string(),
        }
    }
}

/// One page of results from the search endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    /// Total-count hint; informational only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<AuditEvent>,
    pub has_more_results: bool,
    #[serde(default)]
    pub next_cursor: Option<PageCursor>,
}
