use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{error, info};

use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::destination::Destination;
use crate::core::services::flattener::Flattener;
use crate::core::services::paginated_fetcher::PaginatedFetcher;
use crate::core::traits::audit_source::AuditLogSource;
use crate::core::traits::log_sink::LogSink;

/// Per-run settings handed to the pipeline at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// How far back from "now" to fetch events.
    pub lookback: Duration,
    pub destination: Destination,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Lower time bound used for the fetch.
    pub since: DateTime<Utc>,
    /// Number of records handed to the sink.
    pub records: usize,
}

/// Fetch, flatten, ship. One full batch per run, all or nothing.
pub struct Pipeline<S: AuditLogSource, K: LogSink> {
    pub fetcher: PaginatedFetcher<S>,
    pub flattener: Flattener,
    pub sink: K,
    pub settings: PipelineSettings,
}

impl<S: AuditLogSource, K: LogSink> Pipeline<S, K> {
    /// Run the pipeline once with the lookback window ending at `now`.
    ///
    /// The first error from any stage ends the run; the sink is only
    /// called once the whole batch has been fetched and flattened.
    pub fn run(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let since = lookback_start(now, self.settings.lookback)?;
        info!(%since, "retrieving Notion audit logs");

        let events = self
            .fetcher
            .fetch(since)
            .inspect_err(|e| error!(stage = "fetch", error = %e, "pipeline stage failed"))?;
        info!(events = events.len(), "fetched audit events");

        let records = self
            .flattener
            .flatten(&events)
            .inspect_err(|e| error!(stage = "flatten", error = %e, "pipeline stage failed"))?;

        if self.fetcher.cancel.is_cancelled() {
            return Err(Notion2SenError::Cancelled);
        }

        self.sink
            .send(&self.settings.destination, &records)
            .inspect_err(|e| error!(stage = "send", error = %e, "pipeline stage failed"))?;
        info!(records = records.len(), "shipped audit logs");

        Ok(RunSummary {
            since,
            records: records.len(),
        })
    }
}

/// `now - lookback`, rejecting windows chrono cannot represent.
pub fn lookback_start(now: DateTime<Utc>, lookback: Duration) -> Result<DateTime<Utc>> {
    TimeDelta::from_std(lookback)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| Notion2SenError::InvalidConfig {
            detail: format!("lookback of {}s is out of range", lookback.as_secs()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::audit_log_page::AuditLogPage;
    use crate::core::models::flat_record::FLAT_RECORD_KEYS;
    use crate::core::services::cancel::CancelFlag;
    use crate::core::services::paginated_fetcher::FetchLimits;
    use crate::core::services::test_support::{FakeSink, FakeSource, destination, event, page};
    use chrono::TimeZone;

    fn pipeline(source: FakeSource) -> Pipeline<FakeSource, FakeSink> {
        Pipeline {
            fetcher: PaginatedFetcher {
                source,
                organization_id: "org-1".to_string(),
                limits: FetchLimits::default(),
                cancel: CancelFlag::new(),
            },
            flattener: Flattener,
            sink: FakeSink::default(),
            settings: PipelineSettings {
                lookback: Duration::from_secs(24 * 3600),
                destination: destination(),
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
    }

    #[test]
    fn ships_two_pages_in_one_call() {
        let p = pipeline(FakeSource::new(vec![
            Ok(page(0, 100, Some("c1"))),
            Ok(page(100, 50, None)),
        ]));

        let summary = p.run(now()).unwrap();
        assert_eq!(summary.records, 150);
        assert_eq!(summary.since, Utc.with_ymd_and_hms(2023, 11, 13, 22, 13, 20).unwrap());

        let requests = p.fetcher.source.requests();
        assert_eq!(requests.len(), 2);
        assert!(
            requests
                .iter()
                .all(|r| r.filters.time_range.starting == 1_699_913_600_000)
        );

        let batches = p.sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 150);
        for record in &batches[0] {
            let value = serde_json::to_value(record).unwrap();
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), FLAT_RECORD_KEYS.len());
            assert!(FLAT_RECORD_KEYS.iter().all(|k| object.contains_key(*k)));
        }
        assert_eq!(batches[0][0].id, "evt-0");
        assert_eq!(batches[0][149].id, "evt-149");
    }

    #[test]
    fn fetch_failure_sends_nothing() {
        let p = pipeline(FakeSource::new(vec![
            Ok(page(0, 100, Some("c1"))),
            Err(Notion2SenError::Transport {
                service: "fake source",
                reason: "connection reset".into(),
            }),
        ]));

        let err = p.run(now()).unwrap_err();
        assert!(matches!(err, Notion2SenError::Transport { .. }));
        assert!(p.sink.batches().is_empty());
    }

    #[test]
    fn flatten_failure_sends_nothing() {
        let p = pipeline(FakeSource::new(vec![Ok(AuditLogPage {
            total: 2,
            results: vec![event("ok", 1), event("bad", i64::MAX)],
            has_more_results: false,
            next_cursor: None,
        })]));

        let err = p.run(now()).unwrap_err();
        assert!(matches!(err, Notion2SenError::Serialization { .. }));
        assert!(p.sink.batches().is_empty());
    }

    #[test]
    fn empty_window_still_calls_sink_once() {
        let p = pipeline(FakeSource::new(vec![Ok(page(0, 0, None))]));

        let summary = p.run(now()).unwrap();
        assert_eq!(summary.records, 0);
        assert_eq!(p.sink.batches(), vec![Vec::new()]);
    }

    #[test]
    fn cancelled_run_never_reaches_sink() {
        let p = pipeline(FakeSource::new(vec![Ok(page(0, 1, None))]));
        p.fetcher.cancel.cancel();

        assert!(matches!(p.run(now()), Err(Notion2SenError::Cancelled)));
        assert!(p.sink.batches().is_empty());
    }

    #[test]
    fn cancel_during_last_page_skips_send() {
        let mut p = pipeline(FakeSource::new(Vec::new()));
        p.fetcher.source = FakeSource::new(vec![
            Ok(page(0, 100, Some("c1"))),
            Ok(page(100, 5, None)),
        ])
        .cancelling_when_drained(p.fetcher.cancel.clone());

        assert!(matches!(p.run(now()), Err(Notion2SenError::Cancelled)));
        assert_eq!(p.fetcher.source.requests().len(), 2);
        assert!(p.sink.batches().is_empty());
    }

    #[test]
    fn lookback_out_of_range_is_config_error() {
        let err = lookback_start(now(), Duration::from_secs(u64::MAX)).unwrap_err();
        assert!(matches!(err, Notion2SenError::InvalidConfig { .. }));
    }
}
