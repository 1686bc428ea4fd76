use serde::{Deserialize, Deserializer, Serialize};

/// A single audit event as returned by the Notion audit log API.
///
/// Only `id` and `serverTimestamp` are mandatory; every other field
/// tolerates being absent or `null` because the API omits actor metadata
/// it does not have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_name: String,
    /// Event time in epoch seconds.
    pub server_timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    /// Free-form before/after deltas. Absent and `null` both decode to `Value::Null`.
    #[serde(default)]
    pub changes: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor: Actor,
}

/// The object an audited action was performed on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub organization: Option<TargetRef>,
}

/// A `{table, id}` pointer into Notion's record store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub table: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

/// Who performed the action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: ActorMeta,
}

/// Request context recorded alongside the actor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_role: String,
}

/// Decode an explicit JSON `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
