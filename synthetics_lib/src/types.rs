//! Request and response types for the Synthetics REST API (v3).
//!
//! Decoding is lenient: missing or `null` fields fall back to their defaults and
//! unrecognised enum values are kept verbatim in `Other`, so additions on the
//! server side never break existing callers and are written back unchanged.
//! Nothing here validates field values; the API is the only authority on what
//! it accepts.

use crate::error::Error;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Kind of synthetic check.
///
/// Values this crate does not know are kept verbatim in `Other` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MonitorType {
    /// Ping: a single HEAD/GET against the URI.
    Simple,
    /// Loads the URI in a real browser.
    Browser,
    ScriptApi,
    ScriptBrowser,
    Other(String),
}

impl Default for MonitorType {
    fn default() -> Self {
        MonitorType::Other(String::new())
    }
}

impl MonitorType {
    pub fn as_str(&self) -> &str {
        match self {
            MonitorType::Simple => "SIMPLE",
            MonitorType::Browser => "BROWSER",
            MonitorType::ScriptApi => "SCRIPT_API",
            MonitorType::ScriptBrowser => "SCRIPT_BROWSER",
            MonitorType::Other(s) => s,
        }
    }

    /// Script-based monitors carry a script instead of (or in addition to) a URI.
    pub fn is_scripted(&self) -> bool {
        matches!(self, MonitorType::ScriptApi | MonitorType::ScriptBrowser)
    }
}

impl From<String> for MonitorType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SIMPLE" => MonitorType::Simple,
            "BROWSER" => MonitorType::Browser,
            "SCRIPT_API" => MonitorType::ScriptApi,
            "SCRIPT_BROWSER" => MonitorType::ScriptBrowser,
            _ => MonitorType::Other(s),
        }
    }
}

impl From<MonitorType> for String {
    fn from(t: MonitorType) -> Self {
        match t {
            MonitorType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a monitor is running. Unknown values are kept in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MonitorStatus {
    Enabled,
    /// Running, but alerts are suppressed.
    Muted,
    Disabled,
    Other(String),
}

impl Default for MonitorStatus {
    fn default() -> Self {
        MonitorStatus::Other(String::new())
    }
}

impl MonitorStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MonitorStatus::Enabled => "ENABLED",
            MonitorStatus::Muted => "MUTED",
            MonitorStatus::Disabled => "DISABLED",
            MonitorStatus::Other(s) => s,
        }
    }
}

impl From<String> for MonitorStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ENABLED" => MonitorStatus::Enabled,
            "MUTED" => MonitorStatus::Muted,
            "DISABLED" => MonitorStatus::Disabled,
            _ => MonitorStatus::Other(s),
        }
    }
}

impl From<MonitorStatus> for String {
    fn from(s: MonitorStatus) -> Self {
        match s {
            MonitorStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-monitor check settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorOptions {
    /// Text that must appear in the response body (SIMPLE and BROWSER only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_string: Option<String>,
    #[serde(rename = "verifySSL", skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,
    #[serde(rename = "bypassHEADRequest", skip_serializing_if = "Option::is_none")]
    pub bypass_head_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treat_redirect_as_failure: Option<bool>,
}

/// A configured synthetic check against a target URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Monitor {
    /// Assigned by the service on creation.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub monitor_type: MonitorType,
    /// Minutes between checks.
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: MonitorStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub sla_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<MonitorOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Response of `GET /monitors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorListResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub monitors: Vec<Monitor>,
}

/// Payload of `POST /monitors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMonitorArgs {
    pub name: String,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    pub frequency: u32,
    /// Not used by SCRIPT_API monitors.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uri: String,
    pub locations: Vec<String>,
    pub status: MonitorStatus,
    pub sla_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<MonitorOptions>,
}

/// Payload of `PUT /monitors/{id}`. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMonitorArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub monitor_type: Option<MonitorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MonitorStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<MonitorOptions>,
}

impl UpdateMonitorArgs {
    /// True when no field is set (the request would change nothing).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// New script text for `PUT /monitors/{id}/script`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMonitorScriptArgs {
    pub script_text: String,
}

/// Wire form of a monitor script: base64 text inside a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScriptPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub script_text: String,
}

impl ScriptPayload {
    pub(crate) fn encode(text: &str) -> Self {
        Self {
            script_text: base64::engine::general_purpose::STANDARD.encode(text.as_bytes()),
        }
    }

    pub(crate) fn decode(&self) -> Result<String, Error> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.script_text.trim().as_bytes())
            .map_err(|e| Error::Decode(format!("script is not valid base64: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| Error::Decode(format!("script is not UTF-8: {}", e)))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
