//! HTTP client for the New Relic Synthetics REST API.

use crate::config::ClientConfig;
use crate::error::{ApiError, AuthError, Error};
use crate::helpers::{monitor_id_from_location, monitor_path};
use crate::types::{
    CreateMonitorArgs, Monitor, MonitorListResponse, ScriptPayload, UpdateMonitorArgs,
    UpdateMonitorScriptArgs,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LOCATION, USER_AGENT};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-Api-Key";

/// Synthetics API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    headers: HeaderMap,
    http: HttpClient,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the production API with the given key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        Self::configure(|c| c.api_key = api_key)
    }

    /// Create a client from defaults adjusted by `options`.
    ///
    /// ```no_run
    /// let client = synthetics_lib::Client::configure(|c| {
    ///     c.api_key = "my-key".to_string();
    ///     c.base_url = "https://staging.example.com/synthetics/api/v3".to_string();
    /// })?;
    /// # Ok::<(), synthetics_lib::Error>(())
    /// ```
    pub fn configure<F>(options: F) -> Result<Self, Error>
    where
        F: FnOnce(&mut ClientConfig),
    {
        let mut config = ClientConfig::default();
        options(&mut config);
        Self::with_config(config)
    }

    /// Create a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, Error> {
        let base_url = config.resolved_base_url()?;

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::Config("API key is not a valid header value".to_string()))?;
        api_key.set_sensitive(true);
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| Error::Config("user agent is not a valid header value".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(USER_AGENT, user_agent);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            headers,
            http,
        })
    }

    /// Base URL requests are sent to (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a single monitor by ID.
    pub async fn get_monitor(&self, id: &str) -> Result<Monitor, Error> {
        let url = self.url(&monitor_path(id));
        let res = self.send(self.http.get(&url)).await?;
        read_json(res)
            .await?
            .ok_or_else(|| Error::Decode(format!("empty body for monitor {}", id)))
    }

    /// List monitors. `offset` and `count` are passed to the API as-is.
    pub async fn get_all_monitors(
        &self,
        offset: u32,
        count: u32,
    ) -> Result<MonitorListResponse, Error> {
        let url = format!(
            "{}/monitors?offset={}&count={}",
            self.base_url, offset, count
        );
        let res = self.send(self.http.get(&url)).await?;
        Ok(read_json(res).await?.unwrap_or_default())
    }

    /// Create a monitor and return it as stored by the service.
    ///
    /// The service may answer `201` with only a `Location` header; the new
    /// monitor is then fetched by the ID in that header.
    pub async fn create_monitor(&self, args: &CreateMonitorArgs) -> Result<Monitor, Error> {
        let url = self.url("/monitors");
        let res = self.send(self.http.post(&url).json(args)).await?;
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        if let Some(monitor) = read_json::<Monitor>(res).await? {
            return Ok(monitor);
        }
        let id = location
            .as_deref()
            .and_then(monitor_id_from_location)
            .ok_or_else(|| {
                Error::Decode("create response has neither a body nor a Location header".to_string())
            })?;
        debug!(%id, "monitor created, fetching");
        self.get_monitor(&id).await
    }

    /// Update a monitor and return its new state.
    ///
    /// On `204 No Content` the monitor is re-read.
    pub async fn update_monitor(
        &self,
        id: &str,
        args: &UpdateMonitorArgs,
    ) -> Result<Monitor, Error> {
        let url = self.url(&monitor_path(id));
        let res = self.send(self.http.put(&url).json(args)).await?;
        match read_json::<Monitor>(res).await? {
            Some(monitor) => Ok(monitor),
            None => self.get_monitor(id).await,
        }
    }

    /// Delete a monitor.
    pub async fn delete_monitor(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&monitor_path(id));
        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    /// Get the script of a scripted monitor as plain text.
    pub async fn get_monitor_script(&self, id: &str) -> Result<String, Error> {
        let url = self.url(&format!("{}/script", monitor_path(id)));
        let res = self.send(self.http.get(&url)).await?;
        let payload: ScriptPayload = read_json(res)
            .await?
            .ok_or_else(|| Error::Decode(format!("empty script body for monitor {}", id)))?;
        payload.decode()
    }

    /// Replace the script of a scripted monitor.
    pub async fn update_monitor_script(
        &self,
        id: &str,
        args: &UpdateMonitorScriptArgs,
    ) -> Result<(), Error> {
        let url = self.url(&format!("{}/script", monitor_path(id)));
        let body = ScriptPayload::encode(&args.script_text);
        self.send(self.http.put(&url).json(&body)).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.headers(self.headers.clone())
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, Error> {
        let req = self.auth(req).build()?;
        let method = req.method().clone();
        let url = req.url().clone();
        debug!(%method, %url, "synthetics request");

        let res = self.http.execute(req).await?;
        let status = res.status();
        debug!(%method, %url, status = status.as_u16(), "synthetics response");
        if status.is_success() {
            return Ok(res);
        }

        let body = match res.text().await {
            Ok(b) => b,
            Err(e) => {
                debug!(%method, %url, error = %e, "cannot read error body");
                String::new()
            }
        };
        let data: Option<Value> = serde_json::from_str(&body).ok();
        warn!(%method, %url, status = status.as_u16(), "synthetics request failed");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(AuthError {
                message: "Authentication failed. Check your API key.".to_string(),
                status_code: status.as_u16(),
            }));
        }
        let message = data
            .as_ref()
            .and_then(error_message)
            .or_else(|| status.canonical_reason().map(String::from))
            .unwrap_or_else(|| "API request failed".to_string());
        Err(Error::Api(ApiError::new(
            message,
            Some(status.as_u16()),
            data,
        )))
    }
}

/// Decode a JSON body; `None` when the body is empty.
async fn read_json<T: DeserializeOwned>(res: Response) -> Result<Option<T>, Error> {
    let body = res.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&body)
        .map(Some)
        .map_err(|e| Error::Decode(e.to_string()))
}

/// Message from an error body: `{"error": ".."}` or `{"errors": [{"error": ".."}]}`.
fn error_message(data: &Value) -> Option<String> {
    let single = data.get("error").and_then(|e| e.as_str());
    let first = || {
        data.get("errors")
            .and_then(|e| e.as_array())
            .and_then(|a| a.first())
            .and_then(|e| e.get("error").or_else(|| e.get("message")))
            .and_then(|m| m.as_str())
    };
    single.or_else(first).map(String::from)
}
