use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::audit_event::AuditEvent;
use crate::core::models::audit_log_page::{AuditLogRequest, PageCursor};
use crate::core::services::cancel::CancelFlag;
use crate::core::traits::audit_source::AuditLogSource;

/// Service name used in pagination protocol errors.
const PAGINATION: &str = "Notion audit log pagination";

/// Guards on a single `fetch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Maximum number of pages requested before giving up.
    pub max_pages: usize,
    /// Wall-clock budget for the whole loop, checked between pages.
    pub run_budget: Option<Duration>,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            run_budget: Some(Duration::from_secs(600)),
        }
    }
}

/// Walks the audit log search API page by page until the source reports
/// no more results.
pub struct PaginatedFetcher<S: AuditLogSource> {
    pub source: S,
    pub organization_id: String,
    pub limits: FetchLimits,
    pub cancel: CancelFlag,
}

impl<S: AuditLogSource> PaginatedFetcher<S> {
    /// Fetch every event at or after `lookback`, in source order.
    ///
    /// Pages are requested strictly one after another since each request
    /// carries the previous page's cursor. Any failure discards the events
    /// gathered so far.
    pub fn fetch(&self, lookback: DateTime<Utc>) -> Result<Vec<AuditEvent>> {
        let starting = lookback.timestamp_millis();
        let started = Instant::now();

        let mut events = Vec::new();
        let mut cursor: Option<PageCursor> = None;
        let mut sent_cursors: Vec<PageCursor> = Vec::new();
        let mut pages = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Notion2SenError::Cancelled);
            }
            if pages >= self.limits.max_pages {
                return Err(Notion2SenError::PaginationLimit {
                    max_pages: self.limits.max_pages,
                });
            }
            if let Some(budget) = self.limits.run_budget
                && started.elapsed() > budget
            {
                return Err(Notion2SenError::RunTimeout {
                    budget_secs: budget.as_secs(),
                });
            }

            let request = AuditLogRequest::page(&self.organization_id, starting, cursor.take());
            let page = self.source.fetch_page(&request)?;
            pages += 1;

            debug!(
                page = pages,
                total = page.total,
                results = page.results.len(),
                cursor = ?request.cursor,
                "fetched audit log page"
            );

            events.extend(page.results);

            if !page.has_more_results {
                debug!(pages, events = events.len(), "no more results");
                return Ok(events);
            }

            let next = page.next_cursor.ok_or_else(|| Notion2SenError::Protocol {
                service: PAGINATION,
                reason: format!("page {pages} reported more results but returned no cursor"),
            })?;

            if let Some(sent) = request.cursor {
                sent_cursors.push(sent);
            }
            if sent_cursors.contains(&next) {
                return Err(Notion2SenError::Protocol {
                    service: PAGINATION,
                    reason: format!("page {pages} returned a cursor that was already used"),
                });
            }

            cursor = Some(next);
        }
    }
}
