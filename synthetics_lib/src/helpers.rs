//! Helpers for API key resolution and Synthetics URL handling.

use crate::config::API_KEY_ENV;
use crate::secret::SecretBackend;
use url::Url;

/// Source from which the API key was obtained (for diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    OnePassword,
    Bitwarden,
    Keepassxc,
}

impl From<SecretBackend> for ApiKeySource {
    fn from(backend: SecretBackend) -> Self {
        match backend {
            SecretBackend::OnePassword => ApiKeySource::OnePassword,
            SecretBackend::Bitwarden => ApiKeySource::Bitwarden,
            SecretBackend::Keepassxc => ApiKeySource::Keepassxc,
        }
    }
}

/// Resolve the API key: `NEWRELIC_API_KEY` first, then each secret backend in turn.
pub fn get_api_key() -> Result<(String, ApiKeySource), String> {
    if let Ok(k) = std::env::var(API_KEY_ENV) {
        let k = k.trim();
        if !k.is_empty() {
            return Ok((k.to_string(), ApiKeySource::Environment));
        }
    }
    for backend in SecretBackend::ALL {
        if let Some(k) = backend.read() {
            return Ok((k, backend.into()));
        }
    }
    Err(format!(
        "API key not found. Set {} or configure a secret backend: NEWRELIC_OP_ENTRY_PATH (1Password), \
         NEWRELIC_BW_ITEM_ID (Bitwarden), or NEWRELIC_KPXC_DB+NEWRELIC_KPXC_ENTRY (KeePassXC).",
        API_KEY_ENV
    ))
}

/// Extract the monitor ID from the `Location` header of a create response.
///
/// Accepts absolute URLs (`https://.../monitors/<id>`) and bare paths (`/monitors/<id>`).
pub fn monitor_id_from_location(location: &str) -> Option<String> {
    let location = location.trim();
    let path = match Url::parse(location) {
        Ok(u) => u.path().to_string(),
        Err(_) => location.split(['?', '#']).next().unwrap_or("").to_string(),
    };
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let idx = segments.iter().rposition(|s| *s == "monitors")?;
    segments
        .get(idx + 1)
        .filter(|s| !s.is_empty())
        .and_then(|s| urlencoding::decode(s).ok())
        .map(|s| s.into_owned())
}

/// Path of a single monitor, with the ID percent-encoded as one segment.
pub(crate) fn monitor_path(id: &str) -> String {
    format!("/monitors/{}", urlencoding::encode(id))
}
