use chrono::Utc;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::info;

use crate::adapters::notion::audit_log_client::NotionAuditLogClient;
use crate::adapters::stdout_sink::StdoutSink;
use crate::cli::commands::sentinel_helpers;
use crate::cli::logging::{self, Verbosity};
use crate::cli::{context, output};
use crate::core::errors::Result;
use crate::core::models::destination::Destination;
use crate::core::services::cancel::CancelFlag;
use crate::core::services::flattener::Flattener;
use crate::core::services::paginated_fetcher::{FetchLimits, PaginatedFetcher};
use crate::core::services::pipeline::{Pipeline, PipelineSettings};

/// Execute `notion2sen run`.
///
/// Validates all configuration up front, optionally provisions the
/// Sentinel table, then fetches, flattens and ships one batch. With
/// `dry_run` the batch goes to stdout and no Microsoft settings are needed.
pub fn execute(config_path: Option<&str>, dry_run: bool, verbosity: Verbosity) -> Result<()> {
    let config = context::load_config(config_path)?;
    logging::init(config.log_level(), verbosity);

    let notion = config.notion_settings()?;
    let microsoft = if dry_run {
        None
    } else {
        Some(config.microsoft_settings()?)
    };

    let cancel = CancelFlag::new();
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, cancel.handle())?;
    }

    let fetcher = PaginatedFetcher {
        source: NotionAuditLogClient::new(notion.api_token, notion.request_timeout)?,
        organization_id: notion.organization_id,
        limits: FetchLimits {
            max_pages: notion.max_pages,
            run_budget: Some(notion.run_timeout),
        },
        cancel,
    };

    let Some(microsoft) = microsoft else {
        let pipeline = Pipeline {
            fetcher,
            flattener: Flattener,
            sink: StdoutSink,
            settings: PipelineSettings {
                lookback: notion.lookback,
                destination: Destination::none(),
            },
        };
        let summary = pipeline.run(Utc::now())?;
        info!(
            records = summary.records,
            since = %summary.since,
            "dry run complete, nothing shipped"
        );
        return Ok(());
    };

    let target = sentinel_helpers::connect(microsoft, notion.request_timeout)?;
    if target.update_table {
        target.client.create_table(target.retention_days)?;
    }

    let pipeline = Pipeline {
        fetcher,
        flattener: Flattener,
        sink: target.client,
        settings: PipelineSettings {
            lookback: notion.lookback,
            destination: target.destination,
        },
    };
    let summary = pipeline.run(Utc::now())?;

    output::success(&format!(
        "Shipped {} audit logs since {} to Sentinel",
        summary.records,
        summary.since.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    Ok(())
}
