use crate::cli::{context, output};
use crate::core::errors::{Notion2SenError, Result};

/// Execute `notion2sen check`.
///
/// Validates both configuration sections and prints what a run would
/// use. Secrets are never printed. Nothing is contacted over the network.
pub fn execute(config_path: Option<&str>) -> Result<()> {
    let config = context::load_config(config_path)?;
    let mut failures = 0;

    output::header("notion2sen check");

    println!("\n  Notion");
    match config.notion_settings() {
        Ok(notion) => {
            output::success("Notion settings are valid");
            output::field("organization", &notion.organization_id);
            output::field("lookback", &format_duration(notion.lookback));
            output::field("request timeout", &format_duration(notion.request_timeout));
            output::field("run timeout", &format_duration(notion.run_timeout));
            output::field("max pages", &notion.max_pages.to_string());
        }
        Err(e) => {
            failures += 1;
            output::error(&e.to_string());
        }
    }

    println!("\n  Microsoft Sentinel");
    match config.microsoft_settings() {
        Ok(ms) => {
            output::success("Microsoft settings are valid");
            output::field("tenant", &ms.tenant_id);
            output::field("workspace", &ms.workspace_name);
            output::field("endpoint", &ms.destination.endpoint);
            output::field("rule", &ms.destination.rule_id);
            output::field("stream", &ms.destination.stream_name);
            if ms.update_table {
                output::field("retention", &format!("{} days", ms.retention_days));
            } else {
                output::warning("Table provisioning disabled (microsoft.update_table)");
            }
        }
        Err(e) => {
            failures += 1;
            output::error(&e.to_string());
        }
    }

    output::field("log level", config.log_level());

    if failures > 0 {
        return Err(Notion2SenError::InvalidConfig {
            detail: format!("{failures} configuration section(s) failed validation"),
        });
    }

    println!();
    output::success("Configuration OK");
    Ok(())
}

/// Render a duration the way it is written in config files.
fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if d.subsec_millis() != 0 {
        format!("{}ms", d.as_millis())
    } else if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}
