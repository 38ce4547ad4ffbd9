use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use workflow_engine::config::EngineConfig;
use workflow_engine::engine_paths;
use workflow_engine::event_store::{EventStore, FileEventLog};
use workflow_engine::handlers::{EngineHandlers, HandlerResponse};
use workflow_engine::snapshot::{FsObjectStore, SnapshotResolver, SnapshotWriter};
use workflow_engine::structured_logger::{EngineLogger, StructuredLogger, TracingLogger};

#[derive(Parser)]
#[command(name = "workflow-engine")]
#[command(about = "Idempotent workflow events and latest-snapshot reads")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("WORKFLOW_ENGINE_GIT_SHA"), ")"))]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Config file (defaults to ~/.workflow-engine/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish an event at most once
    Publish {
        #[command(subcommand)]
        event: PublishEvent,
    },
    /// Print the most recent snapshot of a workflow
    ReadLatest {
        workflow_id: String,
    },
    /// Store a workflow aggregate as a new snapshot
    WriteSnapshot {
        /// JSON file holding the aggregate
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum PublishEvent {
    /// JobCreated event
    Job {
        /// Event data as a JSON object
        #[arg(long)]
        data: String,
    },
    /// WorkflowCreated event
    Workflow {
        /// Event data as a JSON object
        #[arg(long)]
        data: String,
    },
}

fn get_run_id() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_logger(config: &EngineConfig) -> Result<Arc<dyn EngineLogger>> {
    if !config.logging.structured {
        return Ok(Arc::new(TracingLogger));
    }
    let logs_dir = config.logs_dir()?;
    let logger = StructuredLogger::new(&get_run_id(), &logs_dir)
        .with_context(|| format!("Failed to open structured log in {}", logs_dir.display()))?;
    tracing::debug!(path = %logger.path().display(), "structured logging enabled");
    Ok(Arc::new(logger))
}

fn build_handlers(config: &EngineConfig) -> Result<EngineHandlers<FileEventLog, FsObjectStore>> {
    let logger = build_logger(config)?;

    let log_path = config.event_log_path()?;
    engine_paths::ensure_parent_dir(&log_path)?;
    let snapshot_root = engine_paths::ensure_dir(&config.snapshot_root()?)?;

    let store = Arc::new(FsObjectStore::new(snapshot_root));
    let resolver_config = config.resolver_config();
    Ok(EngineHandlers::new(
        EventStore::new(FileEventLog::new(log_path), logger.clone()),
        SnapshotResolver::new(resolver_config.clone(), store.clone(), logger.clone()),
        SnapshotWriter::new(resolver_config, store, logger),
    ))
}

fn parse_json_arg(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("--data is not valid JSON")
}

fn read_json_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => engine_paths::default_config_path()?,
    };
    let config = EngineConfig::load_or_default(&config_path)?;
    tracing::debug!(config = %config_path.display(), "configuration loaded");
    let handlers = build_handlers(&config)?;

    let response: HandlerResponse = match cli.command {
        Command::Publish {
            event: PublishEvent::Job { data },
        } => handlers.publish_job_created(Some(&parse_json_arg(&data)?)).await,
        Command::Publish {
            event: PublishEvent::Workflow { data },
        } => {
            handlers
                .publish_workflow_created(Some(&parse_json_arg(&data)?))
                .await
        }
        Command::ReadLatest { workflow_id } => handlers.read_latest_workflow(&workflow_id).await,
        Command::WriteSnapshot { file } => handlers.write_snapshot(Some(&read_json_file(&file)?)).await,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
