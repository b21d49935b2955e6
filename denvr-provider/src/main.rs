//! denvr-provider: run one lifecycle request for a Denvr Cloud resource.
//!
//! Reads the plan and record JSON files, calls the control plane and writes
//! the new record back (or removes it when the resource is gone).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use denvr_api::{DenvrConfig, HttpClient};
use denvr_provider::host::{self, Report};
use denvr_provider::{AppLifecycle, Diagnostic, Operation, VmLifecycle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Denvr Cloud lifecycle provider
#[derive(Parser, Debug)]
#[command(name = "denvr-provider", version, about)]
struct Args {
    /// Config file (defaults to $DENVR_CONFIG or ~/.config/denvr.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the resource described by --plan and write its record
    Create(Target),
    /// Refresh the record from the control plane
    Read(Target),
    /// Store a new plan over the record
    Update(Target),
    /// Destroy the resource and remove its record
    Delete(Target),
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Resource kind
    #[arg(long, value_enum)]
    kind: Kind,

    /// Record file
    #[arg(long)]
    state: PathBuf,

    /// Desired-state file (create and update)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Status that marks the resource as ready
    #[arg(long, default_value = denvr_provider::DEFAULT_READY_LABEL)]
    ready_label: String,

    /// Status that ends a wait with an error (repeatable)
    #[arg(long = "failure-label")]
    failure_labels: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Vm,
    App,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "denvr_provider=info,denvr_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(report) => {
            if !report.unapplied.is_empty() {
                eprintln!(
                    "Warning: changed attributes were not applied remotely: {}",
                    report.unapplied.join(", ")
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<Diagnostic>() {
                Some(diag) => eprintln!("Error: {}\n{}", diag.summary, diag.detail),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<Report> {
    let mut config = match args.config {
        Some(ref path) => DenvrConfig::from_file(path)?,
        None => DenvrConfig::load()?,
    };
    if args.config.is_some() {
        config.apply_env();
    }
    info!(server = config.server(), "Using control plane");

    let client = Arc::new(HttpClient::new(config).context("failed to create API client")?);

    let (operation, target) = match args.command {
        Command::Create(t) => (Operation::Create, t),
        Command::Read(t) => (Operation::Read, t),
        Command::Update(t) => (Operation::Update, t),
        Command::Delete(t) => (Operation::Delete, t),
    };
    let plan = target.plan.as_deref();

    match target.kind {
        Kind::Vm => {
            let lifecycle = VmLifecycle::new(client)
                .with_ready_label(target.ready_label)
                .with_failure_labels(target.failure_labels);
            host::run(&lifecycle, operation, &target.state, plan).await
        }
        Kind::App => {
            let lifecycle = AppLifecycle::new(client)
                .with_ready_label(target.ready_label)
                .with_failure_labels(target.failure_labels);
            host::run(&lifecycle, operation, &target.state, plan).await
        }
    }
}
