use serde::Serialize;

/// The exact key set of a flattened record, in column order.
pub const FLAT_RECORD_KEYS: [&str; 5] = ["TimeGenerated", "Action", "Actor", "Changes", "ID"];

/// One audit event flattened into the Sentinel table schema.
///
/// Every value is a string; nested structures are carried as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    /// `YYYY-MM-DDTHH:MM:SSZ` in UTC.
    #[serde(rename = "TimeGenerated")]
    pub time_generated: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Actor")]
    pub actor: String,
    #[serde(rename = "Changes")]
    pub changes: String,
    #[serde(rename = "ID")]
    pub id: String,
}
