//! Output formatting: plain text (human-readable) and JSON.

use serde::Serialize;
use std::fmt::Write;
use synthetics_lib::{Monitor, MonitorListResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Key-value lines for one monitor, a table for lists
    #[default]
    Plain,
    /// JSON (pretty-printed)
    Json,
}

const NAME_WIDTH: usize = 32;

/// One monitor as aligned `key  value` lines.
pub fn format_monitor(m: &Monitor) -> String {
    let mut rows: Vec<(&str, String)> = vec![
        ("id", m.id.clone()),
        ("name", m.name.clone()),
        ("type", m.monitor_type.to_string()),
        ("status", m.status.to_string()),
        ("frequency", format!("{} min", m.frequency)),
        ("uri", or_dash(&m.uri)),
        ("locations", or_dash(&m.locations.join(", "))),
        ("sla_threshold", m.sla_threshold.to_string()),
    ];
    if let Some(o) = &m.options {
        if let Some(s) = &o.validation_string {
            rows.push(("validation_string", s.clone()));
        }
        if let Some(v) = o.verify_ssl {
            rows.push(("verify_ssl", v.to_string()));
        }
        if let Some(v) = o.bypass_head_request {
            rows.push(("bypass_head_request", v.to_string()));
        }
        if let Some(v) = o.treat_redirect_as_failure {
            rows.push(("treat_redirect_as_failure", v.to_string()));
        }
    }
    if let Some(t) = &m.created_at {
        rows.push(("created_at", t.clone()));
    }
    if let Some(t) = &m.modified_at {
        rows.push(("modified_at", t.clone()));
    }

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (k, v) in rows {
        let _ = writeln!(out, "{:<width$}  {}", k, v, width = width);
    }
    out
}

/// Monitor list as a table, followed by the total count reported by the API.
pub fn format_monitor_list(list: &MonitorListResponse) -> String {
    let mut out = String::new();
    if list.monitors.is_empty() {
        let _ = writeln!(out, "<no monitors>");
    } else {
        let id_width = list
            .monitors
            .iter()
            .map(|m| m.id.chars().count())
            .max()
            .unwrap_or(0)
            .max(2);
        let header = format!(
            "{:<id_w$}  {:<name_w$}  {:<14}  {:<8}  {:>5}  LOCATIONS",
            "ID",
            "NAME",
            "TYPE",
            "STATUS",
            "FREQ",
            id_w = id_width,
            name_w = NAME_WIDTH
        );
        let _ = writeln!(out, "{}", header);
        let _ = writeln!(out, "{}", "-".repeat(header.len()));
        for m in &list.monitors {
            let _ = writeln!(
                out,
                "{:<id_w$}  {:<name_w$}  {:<14}  {:<8}  {:>5}  {}",
                m.id,
                truncate(&m.name, NAME_WIDTH),
                m.monitor_type.as_str(),
                m.status.as_str(),
                m.frequency,
                m.locations.join(","),
                id_w = id_width,
                name_w = NAME_WIDTH
            );
        }
    }
    let _ = writeln!(out, "count: {}", list.count);
    out
}

/// Next step after creating a scripted monitor, which starts without a script.
pub fn script_hint(m: &Monitor) -> Option<String> {
    m.monitor_type.is_scripted().then(|| {
        format!(
            "{} monitor created without a script; upload one with `synthetics set-script {}`",
            m.monitor_type, m.id
        )
    })
}

/// Format value as JSON (pretty).
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max {
        s
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
