use std::io::Write;

use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::destination::Destination;
use crate::core::models::flat_record::FlatRecord;
use crate::core::traits::log_sink::LogSink;

/// Sink for `run --dry-run`: prints each record as one JSON line on stdout.
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn send(&self, _destination: &Destination, records: &[FlatRecord]) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        write_json_lines(&mut out, records)?;
        out.flush()?;
        Ok(())
    }
}

/// Write records as JSON lines.
pub fn write_json_lines<W: Write>(out: &mut W, records: &[FlatRecord]) -> Result<()> {
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| Notion2SenError::Serialization {
            detail: format!("could not encode record {}: {e}", record.id),
        })?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_record() {
        let records = vec![
            FlatRecord {
                time_generated: "2023-11-14T22:13:20Z".into(),
                action: "user_login".into(),
                actor: r#"{"name":"A"}"#.into(),
                changes: "null".into(),
                id: "evt-1".into(),
            },
            FlatRecord {
                time_generated: "2023-11-14T22:13:21Z".into(),
                action: "user_logout".into(),
                actor: "{}".into(),
                changes: "null".into(),
                id: "evt-2".into(),
            },
        ];

        let mut buf = Vec::new();
        write_json_lines(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["ID"], "evt-1");
        assert_eq!(first["Actor"], r#"{"name":"A"}"#);
    }
}
