//! In-memory fakes for the source and sink ports.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::json;

use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::audit_event::{Actor, AuditEvent};
use crate::core::models::audit_log_page::{AuditLogPage, AuditLogRequest, PageCursor};
use crate::core::models::destination::Destination;
use crate::core::models::flat_record::FlatRecord;
use crate::core::services::cancel::CancelFlag;
use crate::core::traits::audit_source::AuditLogSource;
use crate::core::traits::log_sink::LogSink;

/// Build a minimal event with the given id and timestamp.
pub fn event(id: &str, server_timestamp: i64) -> AuditEvent {
    AuditEvent {
        id: id.to_string(),
        action_name: "page_viewed".to_string(),
        server_timestamp,
        organization_id: "org-1".to_string(),
        version: 1,
        target: None,
        changes: serde_json::Value::Null,
        actor: Actor {
            actor_id: format!("actor-{id}"),
            actor_type: "user".to_string(),
            ..Actor::default()
        },
    }
}

/// Build a page of `count` events whose ids start at `first_id`.
pub fn page(first_id: usize, count: usize, next: Option<&str>) -> AuditLogPage {
    AuditLogPage {
        total: count as u64,
        results: (first_id..first_id + count)
            .map(|n| event(&format!("evt-{n}"), 1_700_000_000 - n as i64))
            .collect(),
        has_more_results: next.is_some(),
        next_cursor: next.map(|c| PageCursor(json!([c]))),
    }
}

/// Source that replays scripted responses and records every request.
pub struct FakeSource {
    responses: Mutex<VecDeque<Result<AuditLogPage>>>,
    pub requests: Mutex<Vec<AuditLogRequest>>,
    cancel_when_drained: Option<CancelFlag>,
}

impl FakeSource {
    pub fn new(responses: Vec<Result<AuditLogPage>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            cancel_when_drained: None,
        }
    }

    /// Raise `flag` while serving the last scripted response.
    pub fn cancelling_when_drained(mut self, flag: CancelFlag) -> Self {
        self.cancel_when_drained = Some(flag);
        self
    }

    pub fn requests(&self) -> Vec<AuditLogRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl AuditLogSource for FakeSource {
    fn fetch_page(&self, request: &AuditLogRequest) -> Result<AuditLogPage> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        let response = responses.pop_front();
        if responses.is_empty()
            && let Some(flag) = &self.cancel_when_drained
        {
            flag.cancel();
        }
        response.unwrap_or_else(|| {
            Err(Notion2SenError::Protocol {
                service: "fake source",
                reason: "no scripted response left".into(),
            })
        })
    }
}

/// Sink that keeps every batch it receives.
#[derive(Default)]
pub struct FakeSink {
    pub batches: Mutex<Vec<Vec<FlatRecord>>>,
}

impl FakeSink {
    pub fn batches(&self) -> Vec<Vec<FlatRecord>> {
        self.batches.lock().unwrap().clone()
    }
}

impl LogSink for FakeSink {
    fn send(&self, _destination: &Destination, records: &[FlatRecord]) -> Result<()> {
        self.batches.lock().unwrap().push(records.to_vec());
        Ok(())
    }
}

pub fn destination() -> Destination {
    Destination {
        endpoint: "https://dce.example.ingest.monitor.azure.com".to_string(),
        rule_id: "dcr-0000".to_string(),
        stream_name: "Custom-NotionAuditLogs_CL".to_string(),
    }
}
