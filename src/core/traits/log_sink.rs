use crate::core::errors::Result;
use crate::core::models::destination::Destination;
use crate::core::models::flat_record::FlatRecord;

/// Port for shipping flattened records to a telemetry backend.
///
/// Implementations live in `adapters` (e.g. `SentinelClient`, `StdoutSink`).
/// Splitting into size-limited requests is the implementation's job.
pub trait LogSink: Send + Sync {
    /// Ship the whole batch. Called once per pipeline run.
    fn send(&self, destination: &Destination, records: &[FlatRecord]) -> Result<()>;
}
