//! New Relic Synthetics CLI: manage monitors and their scripts from the terminal.

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use synthetics_lib::{
    get_api_key, Client, ClientConfig, CreateMonitorArgs, MonitorOptions, MonitorStatus,
    MonitorType, UpdateMonitorArgs, UpdateMonitorScriptArgs,
};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "synthetics")]
#[command(about = "New Relic Synthetics CLI: manage monitors and their scripts", long_about = None)]
struct Cli {
    /// Output format: plain (human-readable), json (structured).
    #[arg(short, long, default_value = "plain", value_enum)]
    output: OutputFormatArg,

    /// Synthetics API base URL. Defaults to NEWRELIC_SYNTHETICS_API_URL, else production.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Plain,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum MonitorTypeArg {
    Simple,
    Browser,
    ScriptApi,
    ScriptBrowser,
}

impl From<MonitorTypeArg> for MonitorType {
    fn from(t: MonitorTypeArg) -> Self {
        match t {
            MonitorTypeArg::Simple => MonitorType::Simple,
            MonitorTypeArg::Browser => MonitorType::Browser,
            MonitorTypeArg::ScriptApi => MonitorType::ScriptApi,
            MonitorTypeArg::ScriptBrowser => MonitorType::ScriptBrowser,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Enabled,
    Muted,
    Disabled,
}

impl From<StatusArg> for MonitorStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Enabled => MonitorStatus::Enabled,
            StatusArg::Muted => MonitorStatus::Muted,
            StatusArg::Disabled => MonitorStatus::Disabled,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List monitors
    Monitors {
        #[arg(long, default_value = "0")]
        offset: u32,
        #[arg(long, default_value = "100")]
        count: u32,
    },
    /// Show one monitor
    Monitor { id: String },
    /// Create a monitor
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_enum)]
        monitor_type: MonitorTypeArg,
        /// Minutes between checks
        #[arg(long, default_value = "10")]
        frequency: u32,
        /// Target URI (not used by script-api monitors)
        #[arg(long, default_value = "")]
        uri: String,
        /// Location code, e.g. AWS_US_WEST_1 (repeatable)
        #[arg(long = "location", required = true)]
        locations: Vec<String>,
        #[arg(long, value_enum, default_value = "enabled")]
        status: StatusArg,
        #[arg(long, default_value = "7")]
        sla_threshold: f64,
        /// Text the response must contain
        #[arg(long)]
        validation_string: Option<String>,
        #[arg(long)]
        verify_ssl: bool,
    },
    /// Update fields of a monitor; only the given flags are sent
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type", value_enum)]
        monitor_type: Option<MonitorTypeArg>,
        #[arg(long)]
        frequency: Option<u32>,
        #[arg(long)]
        uri: Option<String>,
        /// Replaces all locations (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        sla_threshold: Option<f64>,
    },
    /// Delete a monitor
    Delete { id: String },
    /// Print the script of a scripted monitor
    Script { id: String },
    /// Replace the script of a scripted monitor (reads stdin without --file)
    SetScript {
        id: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("synthetics {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let (api_key, source) = match get_api_key() {
        Ok(k) => k,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?source, "API key resolved");

    let client = match Client::with_config(client_config(api_key, cli.base_url)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let format = match cli.output {
        OutputFormatArg::Plain => output::OutputFormat::Plain,
        OutputFormatArg::Json => output::OutputFormat::Json,
    };

    match run(&client, cli.command, format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Environment-derived config with the resolved key and an optional `--base-url` on top.
fn client_config(api_key: String, base_url: Option<String>) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    config.api_key = api_key;
    if let Some(url) = base_url {
        config.base_url = url;
    }
    config
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    output::format_json(value).map_err(|e| e.to_string())
}

async fn run(client: &Client, cmd: Commands, format: output::OutputFormat) -> Result<(), String> {
    match cmd {
        Commands::Monitors { offset, count } => {
            let list = client
                .get_all_monitors(offset, count)
                .await
                .map_err(|e| e.to_string())?;
            match format {
                output::OutputFormat::Plain => print!("{}", output::format_monitor_list(&list)),
                output::OutputFormat::Json => println!("{}", to_json(&list)?),
            }
        }
        Commands::Monitor { id } => {
            let m = client.get_monitor(&id).await.map_err(|e| e.to_string())?;
            match format {
                output::OutputFormat::Plain => print!("{}", output::format_monitor(&m)),
                output::OutputFormat::Json => println!("{}", to_json(&m)?),
            }
        }
        Commands::Create {
            name,
            monitor_type,
            frequency,
            uri,
            locations,
            status,
            sla_threshold,
            validation_string,
            verify_ssl,
        } => {
            let options = (validation_string.is_some() || verify_ssl).then(|| MonitorOptions {
                validation_string,
                verify_ssl: verify_ssl.then_some(true),
                ..Default::default()
            });
            let args = CreateMonitorArgs {
                name,
                monitor_type: monitor_type.into(),
                frequency,
                uri,
                locations,
                status: status.into(),
                sla_threshold,
                options,
            };
            let m = client
                .create_monitor(&args)
                .await
                .map_err(|e| e.to_string())?;
            match format {
                output::OutputFormat::Plain => {
                    print!("{}", output::format_monitor(&m));
                    if let Some(hint) = output::script_hint(&m) {
                        eprintln!("{}", hint);
                    }
                }
                output::OutputFormat::Json => println!("{}", to_json(&m)?),
            }
        }
        Commands::Update {
            id,
            name,
            monitor_type,
            frequency,
            uri,
            locations,
            status,
            sla_threshold,
        } => {
            let args = UpdateMonitorArgs {
                name,
                monitor_type: monitor_type.map(Into::into),
                frequency,
                uri,
                locations: (!locations.is_empty()).then_some(locations),
                status: status.map(Into::into),
                sla_threshold,
                options: None,
            };
            if args.is_empty() {
                return Err("nothing to update: pass at least one field flag".to_string());
            }
            let m = client
                .update_monitor(&id, &args)
                .await
                .map_err(|e| e.to_string())?;
            match format {
                output::OutputFormat::Plain => print!("{}", output::format_monitor(&m)),
                output::OutputFormat::Json => println!("{}", to_json(&m)?),
            }
        }
        Commands::Delete { id } => {
            client
                .delete_monitor(&id)
                .await
                .map_err(|e| e.to_string())?;
            match format {
                output::OutputFormat::Plain => println!("Deleted monitor {}", id),
                output::OutputFormat::Json => {
                    println!("{}", to_json(&serde_json::json!({"id": id, "deleted": true}))?)
                }
            }
        }
        Commands::Script { id } => {
            let script = client
                .get_monitor_script(&id)
                .await
                .map_err(|e| e.to_string())?;
            match format {
                output::OutputFormat::Plain => println!("{}", script),
                output::OutputFormat::Json => {
                    println!("{}", to_json(&serde_json::json!({"id": id, "script": script}))?)
                }
            }
        }
        Commands::SetScript { id, file } => {
            let script_text = match file {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buf)
                        .await
                        .map_err(|e| format!("cannot read stdin: {}", e))?;
                    buf
                }
            };
            client
                .update_monitor_script(&id, &UpdateMonitorScriptArgs { script_text })
                .await
                .map_err(|e| e.to_string())?;
            match format {
                output::OutputFormat::Plain => println!("Updated script of monitor {}", id),
                output::OutputFormat::Json => {
                    println!("{}", to_json(&serde_json::json!({"id": id, "updated": true}))?)
                }
            }
        }
        Commands::Version => {}
    }
    Ok(())
}
