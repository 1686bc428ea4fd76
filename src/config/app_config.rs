use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::config::duration::parse_duration;
use crate::core::errors::{Notion2SenError, Result};
use crate::core::models::destination::Destination;

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const DEFAULT_LOOKBACK: &str = "24h";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub const DEFAULT_RUN_TIMEOUT: &str = "10m";
pub const DEFAULT_MAX_PAGES: usize = 1000;
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// Retention bounds accepted by Log Analytics tables.
const RETENTION_DAYS_RANGE: std::ops::RangeInclusive<u32> = 4..=730;

/// Shortest accepted value for required string settings.
const MIN_VALUE_LEN: usize = 3;

/// Raw configuration as read from YAML and the environment.
///
/// Every field is optional here; `notion_settings()` and
/// `microsoft_settings()` apply defaults and validate.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogSection,
    pub notion: NotionSection,
    pub microsoft: MicrosoftSection,
}

/// The `log:` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: Option<String>,
}

/// The `notion:` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotionSection {
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_token: Option<SecretString>,
    pub organisation_id: Option<String>,
    pub lookback: Option<String>,
    pub request_timeout: Option<String>,
    pub run_timeout: Option<String>,
    pub max_pages: Option<usize>,
}

/// The `microsoft:` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MicrosoftSection {
    pub app_id: Option<String>,
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret_key: Option<SecretString>,
    pub tenant_id: Option<String>,
    pub subscription_id: Option<String>,
    pub dcr: DcrSection,
    pub resource_group: Option<String>,
    pub workspace_name: Option<String>,
    pub update_table: Option<bool>,
    pub retention_days: Option<u32>,
}

/// The `microsoft.dcr:` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DcrSection {
    pub endpoint: Option<String>,
    pub rule_id: Option<String>,
    pub stream_name: Option<String>,
}

/// Validated Notion-side settings.
#[derive(Debug)]
pub struct NotionSettings {
    pub api_token: SecretString,
    pub organization_id: String,
    pub lookback: Duration,
    pub request_timeout: Duration,
    pub run_timeout: Duration,
    pub max_pages: usize,
}

/// Validated Microsoft-side settings.
#[derive(Debug)]
pub struct MicrosoftSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace_name: String,
    pub destination: Destination,
    pub update_table: bool,
    pub retention_days: u32,
}

impl AppConfig {
    /// Load configuration from a YAML file, then overlay the process
    /// environment.
    ///
    /// A missing file is only an error when the path was given explicitly;
    /// the default `config.yml` may be absent for environment-only setups.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        let mut config = Self::from_file(path, explicit)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse the YAML file at `path`, or return defaults when it is absent
    /// and `required` is false.
    pub fn from_file(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(Notion2SenError::InvalidConfig {
                    detail: format!("config file not found at '{}'", path.display()),
                });
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            Notion2SenError::InvalidConfig { detail } => Notion2SenError::InvalidConfig {
                detail: format!("failed to parse '{}': {detail}", path.display()),
            },
            other => other,
        })
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(content).map_err(|e| Notion2SenError::InvalidConfig {
            detail: e.to_string(),
        })
    }

    /// Override fields from environment variables found through `lookup`.
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("LOG_LEVEL") {
            self.log.level = Some(v);
        }

        let notion = &mut self.notion;
        if let Some(v) = var("NOT_API_TOKEN") {
            notion.api_token = Some(SecretString::from(v));
        }
        if let Some(v) = var("NOT_ORG_ID") {
            notion.organisation_id = Some(v);
        }
        if let Some(v) = var("NOT_LOOKBACK") {
            notion.lookback = Some(v);
        }
        if let Some(v) = var("NOT_REQUEST_TIMEOUT") {
            notion.request_timeout = Some(v);
        }
        if let Some(v) = var("NOT_RUN_TIMEOUT") {
            notion.run_timeout = Some(v);
        }
        if let Some(v) = var("NOT_MAX_PAGES") {
            notion.max_pages = Some(parse_env("NOT_MAX_PAGES", &v)?);
        }

        let ms = &mut self.microsoft;
        if let Some(v) = var("MS_APP_ID") {
            ms.app_id = Some(v);
        }
        if let Some(v) = var("MS_SECRET_KEY") {
            ms.secret_key = Some(SecretString::from(v));
        }
        if let Some(v) = var("MS_TENANT_ID") {
            ms.tenant_id = Some(v);
        }
        if let Some(v) = var("MS_SUB_ID") {
            ms.subscription_id = Some(v);
        }
        if let Some(v) = var("MS_DCR_ENDPOINT") {
            ms.dcr.endpoint = Some(v);
        }
        if let Some(v) = var("MS_DCR_RULE") {
            ms.dcr.rule_id = Some(v);
        }
        if let Some(v) = var("MS_DCR_STREAM") {
            ms.dcr.stream_name = Some(v);
        }
        if let Some(v) = var("MS_RSG_ID") {
            ms.resource_group = Some(v);
        }
        if let Some(v) = var("MS_WS_NAME") {
            ms.workspace_name = Some(v);
        }
        if let Some(v) = var("MS_UPDATE_TABLE") {
            ms.update_table = Some(parse_bool("MS_UPDATE_TABLE", &v)?);
        }
        if let Some(v) = var("MS_RETENTION_DAYS") {
            ms.retention_days = Some(parse_env("MS_RETENTION_DAYS", &v)?);
        }

        Ok(())
    }

    /// Configured log level, defaulting to `debug`.
    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Timeout applied to every HTTP request, validated on its own for
    /// commands that never touch the Notion side.
    pub fn request_timeout(&self) -> Result<Duration> {
        let mut problems = Vec::new();
        self.checked_request_timeout(&mut problems)
            .ok_or_else(|| invalid(problems))
    }

    fn checked_request_timeout(&self, problems: &mut Vec<String>) -> Option<Duration> {
        positive_duration(
            self.notion
                .request_timeout
                .as_deref()
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            "notion.request_timeout",
            problems,
        )
    }

    /// Validate and resolve the settings needed to read the audit log.
    pub fn notion_settings(&self) -> Result<NotionSettings> {
        let n = &self.notion;
        let mut problems = Vec::new();

        let api_token = required_secret(
            n.api_token.as_ref(),
            "notion.api_token",
            "NOT_API_TOKEN",
            &mut problems,
        );
        let organization_id = required(
            n.organisation_id.as_deref(),
            "notion.organisation_id",
            "NOT_ORG_ID",
            &mut problems,
        );
        let lookback = positive_duration(
            n.lookback.as_deref().unwrap_or(DEFAULT_LOOKBACK),
            "notion.lookback",
            &mut problems,
        );
        let request_timeout = self.checked_request_timeout(&mut problems);
        let run_timeout = positive_duration(
            n.run_timeout.as_deref().unwrap_or(DEFAULT_RUN_TIMEOUT),
            "notion.run_timeout",
            &mut problems,
        );
        let max_pages = n.max_pages.unwrap_or(DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            problems.push("notion.max_pages (NOT_MAX_PAGES) must be at least 1".to_string());
        }

        match (api_token, organization_id, lookback, request_timeout, run_timeout) {
            (
                Some(api_token),
                Some(organization_id),
                Some(lookback),
                Some(request_timeout),
                Some(run_timeout),
            ) if problems.is_empty() => {
                Ok(NotionSettings {
                    api_token,
                    organization_id,
                    lookback,
                    request_timeout,
                    run_timeout,
                    max_pages,
                })
            }
            _ => Err(invalid(problems)),
        }
    }

    /// Validate and resolve the settings needed to ship to Sentinel.
    pub fn microsoft_settings(&self) -> Result<MicrosoftSettings> {
        let m = &self.microsoft;
        let mut problems = Vec::new();

        let client_id = required(
            m.app_id.as_deref(),
            "microsoft.app_id",
            "MS_APP_ID",
            &mut problems,
        );
        let client_secret = required_secret(
            m.secret_key.as_ref(),
            "microsoft.secret_key",
            "MS_SECRET_KEY",
            &mut problems,
        );
        let tenant_id = required(
            m.tenant_id.as_deref(),
            "microsoft.tenant_id",
            "MS_TENANT_ID",
            &mut problems,
        );
        let subscription_id = required(
            m.subscription_id.as_deref(),
            "microsoft.subscription_id",
            "MS_SUB_ID",
            &mut problems,
        );
        let endpoint = required(
            m.dcr.endpoint.as_deref(),
            "microsoft.dcr.endpoint",
            "MS_DCR_ENDPOINT",
            &mut problems,
        );
        let rule_id = required(
            m.dcr.rule_id.as_deref(),
            "microsoft.dcr.rule_id",
            "MS_DCR_RULE",
            &mut problems,
        );
        let stream_name = required(
            m.dcr.stream_name.as_deref(),
            "microsoft.dcr.stream_name",
            "MS_DCR_STREAM",
            &mut problems,
        );
        let resource_group = required(
            m.resource_group.as_deref(),
            "microsoft.resource_group",
            "MS_RSG_ID",
            &mut problems,
        );
        let workspace_name = required(
            m.workspace_name.as_deref(),
            "microsoft.workspace_name",
            "MS_WS_NAME",
            &mut problems,
        );
        let retention_days = m.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS);
        if !RETENTION_DAYS_RANGE.contains(&retention_days) {
            problems.push(format!(
                "microsoft.retention_days (MS_RETENTION_DAYS) must be between {} and {}, got {retention_days}",
                RETENTION_DAYS_RANGE.start(),
                RETENTION_DAYS_RANGE.end()
            ));
        }

        if !problems.is_empty() {
            return Err(invalid(problems));
        }

        // All required values are present once `problems` is empty.
        let (
            Some(client_id),
            Some(client_secret),
            Some(tenant_id),
            Some(subscription_id),
            Some(endpoint),
            Some(rule_id),
            Some(stream_name),
            Some(resource_group),
            Some(workspace_name),
        ) = (
            client_id,
            client_secret,
            tenant_id,
            subscription_id,
            endpoint,
            rule_id,
            stream_name,
            resource_group,
            workspace_name,
        )
        else {
            return Err(invalid(problems));
        };

        Ok(MicrosoftSettings {
            tenant_id,
            client_id,
            client_secret,
            subscription_id,
            resource_group,
            workspace_name,
            destination: Destination {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                rule_id,
                stream_name,
            },
            update_table: m.update_table.unwrap_or(false),
            retention_days,
        })
    }
}

fn invalid(problems: Vec<String>) -> Notion2SenError {
    Notion2SenError::InvalidConfig {
        detail: problems.join("; "),
    }
}

fn required(
    value: Option<&str>,
    key: &str,
    env: &str,
    problems: &mut Vec<String>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if v.chars().count() >= MIN_VALUE_LEN => Some(v.to_string()),
        _ => {
            problems.push(format!(
                "{key} ({env}) is required and must be at least {MIN_VALUE_LEN} characters"
            ));
            None
        }
    }
}

fn required_secret(
    value: Option<&SecretString>,
    key: &str,
    env: &str,
    problems: &mut Vec<String>,
) -> Option<SecretString> {
    match value.map(|s| s.expose_secret().trim()) {
        Some(v) if v.chars().count() >= MIN_VALUE_LEN => Some(SecretString::from(v.to_string())),
        _ => {
            problems.push(format!(
                "{key} ({env}) is required and must be at least {MIN_VALUE_LEN} characters"
            ));
            None
        }
    }
}

fn positive_duration(raw: &str, key: &str, problems: &mut Vec<String>) -> Option<Duration> {
    match parse_duration(raw) {
        Ok(d) if !d.is_zero() => Some(d),
        Ok(_) => {
            problems.push(format!("{key} must be greater than zero"));
            None
        }
        Err(e) => {
            problems.push(format!("{key}: {e}"));
            None
        }
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Notion2SenError::InvalidConfig {
            detail: format!("invalid {name} value '{value}': {e}"),
        })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Notion2SenError::InvalidConfig {
            detail: format!("invalid {name} value '{value}': expected true or false"),
        }),
    }
}

fn deserialize_secret<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}
