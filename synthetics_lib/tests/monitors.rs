//! Client tests against a mocked Synthetics API.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use synthetics_lib::{
    Client, CreateMonitorArgs, Error, MonitorStatus, MonitorType, UpdateMonitorArgs,
    UpdateMonitorScriptArgs,
};
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn client(server: &MockServer) -> Client {
    Client::configure(|c| {
        c.api_key = "NEWRELIC_API_KEY".to_string();
        c.base_url = server.uri();
    })
    .unwrap()
}

fn monitor_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": "test-monitor",
        "type": "SCRIPT_BROWSER",
        "frequency": 60,
        "uri": "https://dollarshaveclub.com",
        "locations": ["AWS_US_WEST_1"],
        "status": "ENABLED",
        "slaThreshold": 7
    })
}

#[tokio::test]
async fn get_monitor_matches_payload() {
    let server = MockServer::start().await;
    let id = "asdf-asdf-asdf-asdf";
    Mock::given(method("GET"))
        .and(path(format!("/monitors/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(monitor_json(id)))
        .expect(1)
        .mount(&server)
        .await;

    let m = client(&server).get_monitor(id).await.unwrap();
    assert_eq!(m.id, id);
    assert_eq!(m.name, "test-monitor");
    assert_eq!(m.monitor_type, MonitorType::ScriptBrowser);
    assert_eq!(m.frequency, 60);
    assert_eq!(m.uri, "https://dollarshaveclub.com");
    assert_eq!(m.locations, vec!["AWS_US_WEST_1"]);
    assert_eq!(m.status, MonitorStatus::Enabled);
    assert_eq!(m.sla_threshold, 7.0);
}

#[tokio::test]
async fn base_url_override_targets_other_host() {
    let server = MockServer::start().await;
    // Zero-value monitor as an unconfigured server would send it.
    let empty = json!({
        "id": "", "name": "", "type": "", "frequency": 0, "uri": "",
        "locations": null, "status": "", "slaThreshold": 0
    });
    Mock::given(method("GET"))
        .and(path("/monitors/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(&server);
    assert_eq!(c.base_url(), server.uri());
    let m = c.get_monitor("test").await.unwrap();
    assert!(m.id.is_empty());
    assert!(m.locations.is_empty());
}

#[tokio::test]
async fn base_url_with_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/synthetics/api/v3/monitors/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monitor_json("abc")))
        .expect(1)
        .mount(&server)
        .await;

    let c = Client::configure(|c| {
        c.api_key = "k".to_string();
        c.base_url = format!("{}/synthetics/api/v3/", server.uri());
    })
    .unwrap();
    assert_eq!(c.get_monitor("abc").await.unwrap().id, "abc");
}

#[tokio::test]
async fn api_key_sent_as_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/monitors/abc"))
        .and(header("X-Api-Key", "secret-key"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monitor_json("abc")))
        .expect(1)
        .mount(&server)
        .await;

    let c = Client::configure(|c| {
        c.api_key = "secret-key".to_string();
        c.base_url = server.uri();
    })
    .unwrap();
    c.get_monitor("abc").await.unwrap();
}

#[tokio::test]
async fn get_all_monitors_passes_offset_and_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/monitors"))
        .and(query_param("offset", "20"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "monitors": [monitor_json("a"), monitor_json("b")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client(&server).get_all_monitors(20, 10).await.unwrap();
    assert_eq!(list.count, 2);
    let ids: Vec<&str> = list.monitors.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn unauthorized_and_forbidden_are_auth_errors() {
    for status in [401u16, 403] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = client(&server).get_monitor("abc").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)), "{status}: got {err:?}");
        assert_eq!(err.status_code(), Some(status));
    }
}

#[tokio::test]
async fn not_found_is_api_error_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/monitors/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Monitor not found"})),
        )
        .mount(&server)
        .await;

    match client(&server).get_monitor("missing").await {
        Err(Error::Api(e)) => {
            assert_eq!(e.status_code, Some(404));
            assert_eq!(e.message, "Monitor not found");
            assert!(e.response_data.is_some());
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).delete_monitor("abc").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("Internal Server Error"));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let c = Client::configure(|c| {
        c.api_key = "k".to_string();
        c.base_url = "http://127.0.0.1:1".to_string();
    })
    .unwrap();
    let err = c.get_monitor("abc").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server).get_monitor("abc").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn create_returns_body_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/monitors"))
        .and(body_json(json!({
            "name": "test-monitor",
            "type": "SCRIPT_BROWSER",
            "frequency": 60,
            "uri": "https://dollarshaveclub.com",
            "locations": ["AWS_US_WEST_1"],
            "status": "ENABLED",
            "slaThreshold": 7.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(monitor_json("new-id")))
        .expect(1)
        .mount(&server)
        .await;

    let m = client(&server)
        .create_monitor(&create_args())
        .await
        .unwrap();
    assert_eq!(m.id, "new-id");
}

#[tokio::test]
async fn create_without_body_or_location_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_monitor(&create_args())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/monitors/abc"))
        .and(body_json(json!({"frequency": 15})))
        .respond_with(ResponseTemplate::new(200).set_body_json(monitor_json("abc")))
        .expect(1)
        .mount(&server)
        .await;

    let args = UpdateMonitorArgs {
        frequency: Some(15),
        ..Default::default()
    };
    client(&server).update_monitor("abc", &args).await.unwrap();
}

#[tokio::test]
async fn script_is_base64_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/monitors/abc/script"))
        .and(body_json(json!({"scriptText": "Zm9yIHt9"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/monitors/abc/script"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scriptText": "Zm9yIHt9"})))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(&server);
    c.update_monitor_script(
        "abc",
        &UpdateMonitorScriptArgs {
            script_text: "for {}".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(c.get_monitor_script("abc").await.unwrap(), "for {}");
}

fn create_args() -> CreateMonitorArgs {
    CreateMonitorArgs {
        name: "test-monitor".to_string(),
        monitor_type: MonitorType::ScriptBrowser,
        frequency: 60,
        uri: "https://dollarshaveclub.com".to_string(),
        locations: vec!["AWS_US_WEST_1".to_string()],
        status: MonitorStatus::Enabled,
        sla_threshold: 7.0,
        options: None,
    }
}

/// In-memory stand-in for the service, answering the way the real API does:
/// `201` + `Location` on create, `204` on update, delete, and script writes.
#[derive(Clone, Default)]
struct FakeSynthetics {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    next_id: u32,
    monitors: HashMap<String, Value>,
    scripts: HashMap<String, String>,
}

impl Respond for FakeSynthetics {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        let segments: Vec<&str> = request
            .url
            .path()
            .trim_matches('/')
            .split('/')
            .collect();
        match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["monitors"]) => {
                state.next_id += 1;
                let id = format!("monitor-{}", state.next_id);
                let mut body: Value = serde_json::from_slice(&request.body).unwrap();
                body["id"] = json!(id);
                state.monitors.insert(id.clone(), body);
                ResponseTemplate::new(201)
                    .insert_header("Location", format!("https://synthetics.test/monitors/{}", id))
            }
            ("GET", ["monitors", id]) => match state.monitors.get(*id) {
                Some(m) => ResponseTemplate::new(200).set_body_json(m),
                None => ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})),
            },
            ("PUT", ["monitors", id]) => {
                let patch: Value = serde_json::from_slice(&request.body).unwrap();
                match state.monitors.get_mut(*id) {
                    Some(Value::Object(m)) => {
                        if let Value::Object(fields) = patch {
                            m.extend(fields);
                        }
                        ResponseTemplate::new(204)
                    }
                    _ => ResponseTemplate::new(404),
                }
            }
            ("DELETE", ["monitors", id]) => {
                state.scripts.remove(*id);
                match state.monitors.remove(*id) {
                    Some(_) => ResponseTemplate::new(204),
                    None => ResponseTemplate::new(404),
                }
            }
            ("PUT", ["monitors", id, "script"]) => {
                let body: Value = serde_json::from_slice(&request.body).unwrap();
                let text = body["scriptText"].as_str().unwrap_or_default().to_string();
                state.scripts.insert(id.to_string(), text);
                ResponseTemplate::new(204)
            }
            ("GET", ["monitors", id, "script"]) => match state.scripts.get(*id) {
                Some(s) => ResponseTemplate::new(200).set_body_json(json!({"scriptText": s})),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

#[tokio::test]
async fn create_read_update_script_delete_flow() {
    let server = MockServer::start().await;
    Mock::given(path_regex("^/monitors"))
        .respond_with(FakeSynthetics::default())
        .mount(&server)
        .await;
    let c = client(&server);

    let created = c.create_monitor(&create_args()).await.unwrap();
    assert_eq!(created.id, "monitor-1");
    assert_eq!(created.name, "test-monitor");

    let fetched = c.get_monitor(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = c
        .update_monitor(
            &fetched.id,
            &UpdateMonitorArgs {
                frequency: Some(30),
                status: Some(MonitorStatus::Muted),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.frequency, 30);
    assert_eq!(updated.status, MonitorStatus::Muted);
    assert_eq!(updated.name, "test-monitor");

    c.update_monitor_script(
        &updated.id,
        &UpdateMonitorScriptArgs {
            script_text: "for {}".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(c.get_monitor_script(&updated.id).await.unwrap(), "for {}");

    c.delete_monitor(&updated.id).await.unwrap();
    let err = c.get_monitor(&updated.id).await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}
