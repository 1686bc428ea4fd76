use crate::adapters::sentinel::table::TABLE_NAME;
use crate::cli::commands::sentinel_helpers;
use crate::cli::logging::{self, Verbosity};
use crate::cli::{context, output};
use crate::core::errors::Result;

/// Execute `notion2sen create-table`.
///
/// Creates the audit log table on the Sentinel workspace, or updates its
/// schema and retention if it already exists. Needs no Notion settings.
pub fn execute(config_path: Option<&str>, verbosity: Verbosity) -> Result<()> {
    let config = context::load_config(config_path)?;
    logging::init(config.log_level(), verbosity);

    let microsoft = config.microsoft_settings()?;
    let timeout = config.request_timeout()?;
    let target = sentinel_helpers::connect(microsoft, timeout)?;

    target.client.create_table(target.retention_days)?;

    output::success(&format!(
        "Table {TABLE_NAME} ready with {} days retention",
        target.retention_days
    ));
    Ok(())
}
