use chrono::{DateTime, Datelike};

use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::audit_event::AuditEvent;
use crate::core::models::flat_record::FlatRecord;

/// ISO 8601, UTC, second precision.
///
/// Only four-digit years render in this shape.
const TIME_GENERATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Converts audit events into the flat five-column Sentinel schema.
pub struct Flattener;

impl Flattener {
    /// Flatten a batch, preserving order.
    ///
    /// The first event that cannot be encoded fails the whole batch;
    /// no partial output is returned.
    pub fn flatten(&self, events: &[AuditEvent]) -> Result<Vec<FlatRecord>> {
        events.iter().map(|event| self.flatten_event(event)).collect()
    }

    /// Flatten one event. Fields outside the five-column schema are dropped.
    pub fn flatten_event(&self, event: &AuditEvent) -> Result<FlatRecord> {
        let actor = serde_json::to_string(&event.actor).map_err(|e| {
            Notion2SenError::Serialization {
                detail: format!("could not encode actor of event {}: {e}", event.id),
            }
        })?;

        let changes = serde_json::to_string(&event.changes).map_err(|e| {
            Notion2SenError::Serialization {
                detail: format!("could not encode changes of event {}: {e}", event.id),
            }
        })?;

        Ok(FlatRecord {
            time_generated: format_timestamp(event.server_timestamp).map_err(|e| {
                Notion2SenError::Serialization {
                    detail: format!("event {}: {e}", event.id),
                }
            })?,
            action: event.action_name.clone(),
            actor,
            changes,
            id: event.id.clone(),
        })
    }
}

/// Format epoch seconds as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(epoch_secs: i64) -> std::result::Result<String, String> {
    DateTime::from_timestamp(epoch_secs, 0)
        .filter(|dt| (0..=9999).contains(&dt.year()))
        .map(|dt| dt.format(TIME_GENERATED_FORMAT).to_string())
        .ok_or_else(|| format!("timestamp {epoch_secs} is out of range"))
}
