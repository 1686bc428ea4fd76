/// All domain errors for notion2sen.
///
/// Each variant provides enough context to tell which stage of a run
/// failed and what to check next.
#[derive(Debug, thiserror::Error)]
pub enum Notion2SenError {
    #[error(
        "Could not reach {service}: {reason}\n\n  \
         Check network connectivity and proxy settings.\n  \
         The run was aborted; rerun it once the service is reachable."
    )]
    Transport { service: &'static str, reason: String },

    #[error("Unexpected response from {service}: {reason}")]
    Protocol { service: &'static str, reason: String },

    #[error("Serialization failed: {detail}")]
    Serialization { detail: String },

    #[error(
        "Invalid configuration: {detail}\n\n  \
         Values are read from the YAML config file and can be overridden\n  \
         with environment variables (e.g. NOT_API_TOKEN, MS_DCR_ENDPOINT).\n  \
         Run 'notion2sen check' to validate your configuration."
    )]
    InvalidConfig { detail: String },

    #[error(
        "Pagination stopped after {max_pages} pages\n\n  \
         The audit log API kept reporting more results.\n  \
         Shorten the lookback window or raise notion.max_pages (NOT_MAX_PAGES)."
    )]
    PaginationLimit { max_pages: usize },

    #[error(
        "Fetching audit logs exceeded the run budget of {budget_secs}s\n\n  \
         Shorten the lookback window or raise notion.run_timeout (NOT_RUN_TIMEOUT)."
    )]
    RunTimeout { budget_secs: u64 },

    #[error("Run cancelled by signal; nothing was shipped")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Notion2SenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_makes_no_delivery_claim() {
        let err = Notion2SenError::Transport {
            service: "Azure Monitor Logs Ingestion API",
            reason: "connection reset".into(),
        };
        let message = err.to_string();

        assert!(message.contains("connection reset"));
        assert!(!message.contains("nothing was shipped"));
    }
}
