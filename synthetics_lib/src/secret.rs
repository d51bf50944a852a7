//! Secret-manager backends for reading the New Relic API key.
//!
//! Each backend is configured through `NEWRELIC_*` environment variables and
//! shells out to the vendor CLI (`op`, `bw`, `keepassxc-cli`). A backend that is
//! not configured, or whose CLI fails, yields nothing.

use std::process::{Command, Stdio};
use tracing::debug;

/// A password manager the API key can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    OnePassword,
    Bitwarden,
    Keepassxc,
}

/// Fully resolved CLI invocation for one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretCommand {
    pub program: &'static str,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl SecretBackend {
    /// Lookup order used by [`crate::get_api_key`].
    pub const ALL: [SecretBackend; 3] = [
        SecretBackend::OnePassword,
        SecretBackend::Bitwarden,
        SecretBackend::Keepassxc,
    ];

    /// Build the CLI call for this backend from `lookup`, or `None` when the
    /// backend's variables are not set.
    ///
    /// - 1Password: `NEWRELIC_OP_ENTRY_PATH` (`op://Vault/Item`), or
    ///   `NEWRELIC_OP_VAULT` + `NEWRELIC_OP_ITEM`; field from `NEWRELIC_OP_FIELD`
    ///   (default `API_KEY`).
    /// - Bitwarden: `NEWRELIC_BW_ITEM_ID`; optional `NEWRELIC_BW_SESSION`.
    /// - KeePassXC: `NEWRELIC_KPXC_DB` + `NEWRELIC_KPXC_ENTRY`; attribute from
    ///   `NEWRELIC_KPXC_ATTRIBUTE` (default `Password`).
    pub fn command<F>(self, lookup: F) -> Option<SecretCommand>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        match self {
            SecretBackend::OnePassword => {
                let field = lookup("NEWRELIC_OP_FIELD").unwrap_or_else(|| "API_KEY".to_string());
                let field = field.trim();
                if field.is_empty() {
                    return None;
                }
                let uri = match var("NEWRELIC_OP_ENTRY_PATH") {
                    Some(path) => format!("{}/{}", path.trim_end_matches('/'), field),
                    None => format!(
                        "op://{}/{}/{}",
                        var("NEWRELIC_OP_VAULT")?,
                        var("NEWRELIC_OP_ITEM")?,
                        field
                    ),
                };
                Some(SecretCommand {
                    program: "op",
                    args: vec!["read".to_string(), uri],
                    env: vec![],
                })
            }
            SecretBackend::Bitwarden => {
                let id = var("NEWRELIC_BW_ITEM_ID")?;
                let env = var("NEWRELIC_BW_SESSION")
                    .map(|s| ("BW_SESSION".to_string(), s))
                    .into_iter()
                    .collect();
                Some(SecretCommand {
                    program: "bw",
                    args: vec!["get".to_string(), "password".to_string(), id],
                    env,
                })
            }
            SecretBackend::Keepassxc => {
                let db = var("NEWRELIC_KPXC_DB")?;
                let entry = var("NEWRELIC_KPXC_ENTRY")?;
                let attr = lookup("NEWRELIC_KPXC_ATTRIBUTE").unwrap_or_else(|| "Password".to_string());
                let attr = attr.trim();
                if attr.is_empty() {
                    return None;
                }
                Some(SecretCommand {
                    program: "keepassxc-cli",
                    args: vec![
                        "show".to_string(),
                        "-a".to_string(),
                        attr.to_string(),
                        db,
                        entry,
                    ],
                    env: vec![],
                })
            }
        }
    }

    /// Read the key using the process environment. `None` if unconfigured or the CLI failed.
    pub fn read(self) -> Option<String> {
        self.command(|name| std::env::var(name).ok())?.run()
    }
}

impl SecretCommand {
    /// Run the command; stderr is discarded so nothing secret leaks into output.
    pub fn run(&self) -> Option<String> {
        let out = Command::new(self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output();
        let out = match out {
            Ok(o) => o,
            Err(e) => {
                debug!(program = self.program, error = %e, "secret backend not runnable");
                return None;
            }
        };
        if !out.status.success() {
            debug!(program = self.program, status = %out.status, "secret backend failed");
            return None;
        }
        String::from_utf8(out.stdout)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
