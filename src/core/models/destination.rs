/// Where a batch of flat records is shipped to: a Data Collection
/// Endpoint, the Data Collection Rule bound to it, and the stream
/// declared by that rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub endpoint: String,
    pub rule_id: String,
    pub stream_name: String,
}

impl Destination {
    /// Empty destination for sinks that write locally and ignore it.
    pub fn none() -> Self {
        Self {
            endpoint: String::new(),
            rule_id: String::new(),
            stream_name: String::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.endpoint.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_no_endpoint() {
        assert!(Destination::none().is_none());
        assert!(
            !Destination {
                endpoint: "https://dce.example.ingest.monitor.azure.com".into(),
                rule_id: "dcr-1".into(),
                stream_name: "Custom-NotionAuditLogs_CL".into(),
            }
            .is_none()
        );
    }
}
