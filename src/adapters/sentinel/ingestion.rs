use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::adapters::http::{read_body, transport};
use crate::adapters::sentinel::client::SentinelClient;
use crate::adapters::sentinel::credentials::INGESTION_SCOPE;
use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::destination::Destination;
use crate::core::models::flat_record::FlatRecord;
use crate::core::traits::log_sink::LogSink;

const INGESTION_SERVICE: &str = "Azure Monitor Logs Ingestion API";
const INGESTION_API_VERSION: &str = "2023-01-01";

/// Upper bound for one ingestion request body.
pub const MAX_PAYLOAD_BYTES: usize = 1_000_000;

/// Upload URL for a stream of a Data Collection Rule.
pub fn ingestion_url(destination: &Destination) -> String {
    format!(
        "{}/dataCollectionRules/{}/streams/{}?api-version={INGESTION_API_VERSION}",
        destination.endpoint.trim_end_matches('/'),
        destination.rule_id,
        destination.stream_name
    )
}

/// Serialize records into JSON array bodies no larger than `max_bytes`,
/// preserving order.
pub fn chunk_payloads(records: &[FlatRecord], max_bytes: usize) -> Result<Vec<String>> {
    let mut payloads = Vec::new();
    let mut current = String::from("[");

    for record in records {
        let json = serde_json::to_string(record).map_err(|e| Notion2SenError::Serialization {
            detail: format!("could not encode record {}: {e}", record.id),
        })?;
        if json.len() + 2 > max_bytes {
            return Err(Notion2SenError::Serialization {
                detail: format!(
                    "record {} is {} bytes, over the {max_bytes} byte ingestion limit",
                    record.id,
                    json.len()
                ),
            });
        }

        let needs_comma = current.len() > 1;
        if current.len() + usize::from(needs_comma) + json.len() + 1 > max_bytes {
            current.push(']');
            payloads.push(std::mem::replace(&mut current, String::from("[")));
        } else if needs_comma {
            current.push(',');
        }
        current.push_str(&json);
    }

    if current.len() > 1 {
        current.push(']');
        payloads.push(current);
    }

    Ok(payloads)
}

/// Note in a batch failure how many earlier batches were already accepted.
fn with_progress(err: Notion2SenError, accepted: usize, batches: usize) -> Notion2SenError {
    if accepted == 0 {
        return err;
    }
    let progress = format!(" ({accepted} of {batches} batches were already ingested)");
    match err {
        Notion2SenError::Transport { service, reason } => Notion2SenError::Transport {
            service,
            reason: reason + &progress,
        },
        Notion2SenError::Protocol { service, reason } => Notion2SenError::Protocol {
            service,
            reason: reason + &progress,
        },
        other => other,
    }
}

impl LogSink for SentinelClient {
    fn send(&self, destination: &Destination, records: &[FlatRecord]) -> Result<()> {
        if records.is_empty() {
            info!("no audit logs to ship");
            return Ok(());
        }

        if destination.is_none() {
            return Err(Notion2SenError::InvalidConfig {
                detail: "no Data Collection Endpoint to ship to (MS_DCR_ENDPOINT)".into(),
            });
        }

        let payloads = chunk_payloads(records, MAX_PAYLOAD_BYTES)?;
        let url = ingestion_url(destination);
        let batches = payloads.len();

        self.runtime.block_on(async {
            let token = self
                .credentials
                .access_token(&self.http, INGESTION_SCOPE)
                .await?;

            for (index, payload) in payloads.into_iter().enumerate() {
                let bytes = payload.len();
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(token.expose_secret())
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload)
                    .send()
                    .await
                    .map_err(|e| with_progress(transport(INGESTION_SERVICE, e), index, batches))?;
                read_body(INGESTION_SERVICE, response)
                    .await
                    .map_err(|e| with_progress(e, index, batches))?;

                debug!(batch = index + 1, batches, bytes, "uploaded ingestion batch");
            }

            Ok::<(), Notion2SenError>(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, padding: usize) -> FlatRecord {
        FlatRecord {
            time_generated: "2023-11-14T22:13:20Z".into(),
            action: "page_viewed".into(),
            actor: "{}".into(),
            changes: "x".repeat(padding),
            id: id.into(),
        }
    }

    #[test]
    fn later_batch_failure_reports_accepted_batches() {
        let failure = || Notion2SenError::Protocol {
            service: INGESTION_SERVICE,
            reason: "status 503".into(),
        };

        let first = with_progress(failure(), 0, 3).to_string();
        assert!(!first.contains("already ingested"));

        let later = with_progress(failure(), 2, 3).to_string();
        assert!(later.contains("status 503 (2 of 3 batches were already ingested)"));
    }

    #[test]
    fn refuses_empty_destination_before_any_request() {
        use crate::adapters::sentinel::client::Workspace;
        use crate::adapters::sentinel::credentials::AzureCredentials;
        use secrecy::SecretString;
        use std::time::Duration;

        let client = SentinelClient::new(
            AzureCredentials {
                tenant_id: "tenant-1".into(),
                client_id: "app-1".into(),
                client_secret: SecretString::from("secret".to_string()),
            },
            Workspace {
                subscription_id: "sub-1".into(),
                resource_group: "rg-1".into(),
                workspace_name: "ws-1".into(),
            },
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client
            .send(&Destination::none(), &[record("a", 0)])
            .unwrap_err();
        assert!(matches!(err, Notion2SenError::InvalidConfig { .. }));
        assert!(client.send(&Destination::none(), &[]).is_ok());
    }

    #[test]
    fn url_targets_rule_stream() {
        let destination = Destination {
            endpoint: "https://dce-1.westeurope-1.ingest.monitor.azure.com/".into(),
            rule_id: "dcr-123".into(),
            stream_name: "Custom-NotionAuditLogs_CL".into(),
        };
        assert_eq!(
            ingestion_url(&destination),
            "https://dce-1.westeurope-1.ingest.monitor.azure.com/dataCollectionRules/dcr-123/streams/Custom-NotionAuditLogs_CL?api-version=2023-01-01"
        );
    }

    #[test]
    fn small_batch_is_one_payload() {
        let records = vec![record("a", 0), record("b", 0)];
        let payloads = chunk_payloads(&records, MAX_PAYLOAD_BYTES).unwrap();

        assert_eq!(payloads.len(), 1);
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["ID"], "b");
    }

    #[test]
    fn splits_under_limit_and_keeps_order() {
        let records: Vec<FlatRecord> = (0..20).map(|i| record(&format!("r{i}"), 100)).collect();
        let payloads = chunk_payloads(&records, 600).unwrap();

        assert!(payloads.len() > 1);
        let mut ids = Vec::new();
        for payload in &payloads {
            assert!(payload.len() <= 600);
            let parsed: Vec<serde_json::Value> = serde_json::from_str(payload).unwrap();
            ids.extend(parsed.iter().map(|v| v["ID"].as_str().unwrap().to_string()));
        }
        let expected: Vec<String> = (0..20).map(|i| format!("r{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn oversized_record_is_rejected() {
        let err = chunk_payloads(&[record("huge", 2_000)], 1_000).unwrap_err();
        assert!(matches!(err, Notion2SenError::Serialization { .. }));
        assert!(err.to_string().contains("huge"));
    }

    #[test]
    fn empty_batch_has_no_payloads() {
        assert!(chunk_payloads(&[], MAX_PAYLOAD_BYTES).unwrap().is_empty());
    }
}
