use crate::core::errors::Result;
use crate::core::models::audit_log_page::{AuditLogPage, AuditLogRequest};

/// Port for the remote audit log search API.
///
/// One call is one request and one page. Pagination is driven by
/// `PaginatedFetcher`, never by the implementation.
pub trait AuditLogSource: Send + Sync {
    /// Submit a single search request and decode the returned page.
    fn fetch_page(&self, request: &AuditLogRequest) -> Result<AuditLogPage>;
}
