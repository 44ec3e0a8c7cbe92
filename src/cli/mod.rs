//! # Command Line Interface
//!
//! Runs one lifecycle invocation per process and prints its progress event
//! as JSON on stdout. `handle` takes a full framework request (from a file
//! or stdin); `create`, `read` and `delete` build one from flags.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::config::{ConnectionConfig, ObservabilityConfig};
use crate::handler::{self, Action, HandlerRequest, ProgressEvent, ResourceModel, SecretDataField};
use crate::observability::init_logging;
use crate::resource::{SecretLifecycle, DEFAULT_MOUNT_PATH};
use crate::secrets::{SecretData, SecretString};

#[derive(Parser)]
#[command(name = "vault-secret")]
#[command(about = "Create, read and delete a versioned secret in a Vault KV v2 store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store address (overrides VAULT_ADDR)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Store token (overrides VAULT_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds (overrides VAULT_CLIENT_TIMEOUT)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Handle a framework request read from a file or stdin
    Handle {
        /// Path to the request JSON; stdin when omitted
        #[arg(long)]
        request: Option<PathBuf>,
    },

    /// Write a new secret version and read it back
    Create {
        #[command(flatten)]
        target: SecretTarget,

        /// Secret entry as KEY=VALUE; repeatable. A value is generated when omitted
        #[arg(long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// Length of the generated value
        #[arg(long)]
        length: Option<NonZeroUsize>,
    },

    /// Read one version of a secret
    Read {
        #[command(flatten)]
        target: SecretTarget,

        #[arg(long)]
        version: u64,
    },

    /// Soft-delete one version of a secret
    Delete {
        #[command(flatten)]
        target: SecretTarget,

        #[arg(long)]
        version: u64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SecretTarget {
    /// Secret path inside the mount (e.g. "app/db")
    #[arg(long)]
    pub path: String,

    /// KV v2 mount path
    #[arg(long, default_value = DEFAULT_MOUNT_PATH)]
    pub mount: String,
}

/// Run CLI commands. Returns whether the invocation succeeded.
pub async fn run_cli() -> Result<bool> {
    let cli = Cli::parse();

    let mut observability = ObservabilityConfig::from_env();
    if cli.verbose {
        observability.log_level = "debug".to_string();
    }
    observability.json_logging |= cli.json_logs;
    init_logging(&observability)?;

    let connection = connection_from(&cli)?;
    let request = match cli.command {
        Commands::Handle { request } => read_request(request.as_ref())?,
        command => request_from_command(command)?,
    };

    let event = handler::dispatch(&SecretLifecycle::new(), request, &connection).await;
    print_event(&event)?;
    Ok(event.is_success())
}

/// Environment connection with flag overrides applied.
fn connection_from(cli: &Cli) -> Result<ConnectionConfig> {
    let mut connection = ConnectionConfig::from_env()?;
    if let Some(server) = &cli.server {
        connection.server = server.clone();
    }
    if let Some(token) = &cli.token {
        connection.token = Some(SecretString::new(token.as_str()));
    }
    if let Some(timeout) = cli.timeout {
        connection.timeout_seconds = timeout;
    }
    Ok(connection)
}

/// Read a framework request from `path`, or from stdin when `None`.
pub fn read_request(path: Option<&PathBuf>) -> Result<HandlerRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw).context("Failed to read request from stdin")?;
            raw
        }
    };

    serde_json::from_str(&raw).context("Failed to parse handler request")
}

/// Build the request a flag-driven subcommand stands for.
pub fn request_from_command(command: Commands) -> Result<HandlerRequest> {
    let (action, target, data, length, version) = match command {
        Commands::Create { target, data, length } => {
            (Action::Create, target, parse_pairs(&data)?, length, None)
        }
        Commands::Read { target, version } => {
            (Action::Read, target, SecretData::new(), None, Some(version))
        }
        Commands::Delete { target, version } => {
            (Action::Delete, target, SecretData::new(), None, Some(version))
        }
        Commands::Handle { .. } => anyhow::bail!("handle requests are read, not built from flags"),
    };

    let model = ResourceModel {
        secret_path: Some(target.path),
        secret_data: Some(SecretDataField::Map(data)).filter(|_| action == Action::Create),
        secret_engine_mount_path: Some(target.mount),
        secret_length: length.map(|n| n.get() as u64),
        version,
        ..Default::default()
    };

    Ok(HandlerRequest {
        action,
        desired_resource_state: Some(model),
        previous_resource_state: None,
        type_configuration: None,
    })
}

/// Parse repeated `KEY=VALUE` flags; the first `=` splits.
pub fn parse_pairs(pairs: &[String]) -> Result<SecretData> {
    let mut data = SecretData::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .with_context(|| "Secret data must be given as KEY=VALUE")?;
        data.insert(key.to_string(), value.to_string());
    }
    Ok(data)
}

fn print_event(event: &ProgressEvent) -> Result<()> {
    let json = serde_json::to_string_pretty(event).context("Failed to serialize progress event")?;
    println!("{}", json);
    Ok(())
}
