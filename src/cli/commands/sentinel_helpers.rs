use std::time::Duration;

use crate::adapters::sentinel::client::{SentinelClient, Workspace};
use crate::adapters::sentinel::credentials::AzureCredentials;
use crate::config::app_config::MicrosoftSettings;
use crate::core::errors::Result;
use crate::core::models::destination::Destination;

/// Sentinel client plus the values a run still needs from the settings.
pub struct SentinelTarget {
    pub client: SentinelClient,
    pub destination: Destination,
    pub update_table: bool,
    pub retention_days: u32,
}

/// Split validated Microsoft settings into a ready-to-use client and the
/// per-run shipping parameters.
pub fn connect(settings: MicrosoftSettings, timeout: Duration) -> Result<SentinelTarget> {
    let MicrosoftSettings {
        tenant_id,
        client_id,
        client_secret,
        subscription_id,
        resource_group,
        workspace_name,
        destination,
        update_table,
        retention_days,
    } = settings;

    let client = SentinelClient::new(
        AzureCredentials {
            tenant_id,
            client_id,
            client_secret,
        },
        Workspace {
            subscription_id,
            resource_group,
            workspace_name,
        },
        timeout,
    )?;

    Ok(SentinelTarget {
        client,
        destination,
        update_table,
        retention_days,
    })
}
