#![deny(unsafe_code)]

//! Quillpad CLI: run the daemon, talk to it, or run the pipeline offline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use quillpad_config::AppConfig;
use quillpad_core::assist::{AiAction, AssistRequest, Assistant};
use quillpad_core::cache::{DisabledCacheStore, SystemClock};
use quillpad_core::context::{ContextPipeline, ProcessedContext};
use quillpad_core::document::{EditorState, extract_blocks};
use quillpad_core::ipc::{IpcClient, socket_path_from_config};
use quillpad_core::llm::create_provider;
use quillpad_core::{Daemon, LogCollector};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Quillpad: bounded document context for writing assistants.
#[derive(Parser)]
#[command(name = "quillpad", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "quillpad.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Quillpad daemon.
    Start,

    /// Stop a running Quillpad daemon.
    Stop,

    /// Show daemon status.
    Status,

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },

    /// Show recent daemon log entries.
    Logs {
        /// Only the newest N entries.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Extract blocks from a serialized editor state.
    Extract {
        /// Editor state JSON file.
        input: PathBuf,

        /// Pretty-print the block array.
        #[arg(long)]
        pretty: bool,
    },

    /// Turn a serialized block array into bounded context text.
    Process {
        /// Block array JSON file.
        input: PathBuf,

        /// Send to the running daemon instead of processing locally.
        #[arg(long)]
        daemon: bool,
    },

    /// Build (and, with a provider configured, send) an assist request.
    Assist {
        /// Editor action, e.g. FixSpellingGrammar or ChatWithSelectedString.
        #[arg(short, long, default_value = "default")]
        action: String,

        /// The user's prompt or selected text.
        #[arg(short, long)]
        prompt: String,

        /// Block array JSON file used as context.
        #[arg(long)]
        context: Option<PathBuf>,

        /// Send to the running daemon instead of running locally.
        #[arg(long)]
        daemon: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config).await;
    let (level, buffer) = match &loaded {
        Ok((config, _)) => (config.logging.level.clone(), config.logging.buffer_capacity),
        Err(_) => ("info".to_string(), 1),
    };
    let filter = match cli.verbose {
        0 => level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let collector = LogCollector::new(buffer);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(collector.clone())
        .init();

    let (config, found) = loaded?;
    if !found {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Start => cmd_start(config, collector).await?,
        Commands::Stop => cmd_stop(&config).await?,
        Commands::Status => cmd_status(&config).await?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
        Commands::Logs { limit } => cmd_logs(&config, limit).await?,
        Commands::Extract { input, pretty } => println!("{}", extract_file(&input, pretty).await?),
        Commands::Process { input, daemon } => cmd_process(&config, &input, daemon).await?,
        Commands::Assist {
            action,
            prompt,
            context,
            daemon,
        } => {
            let context = match context {
                Some(path) => Some(read_input(&path).await?),
                None => None,
            };
            let request = AssistRequest {
                prompt,
                action: AiAction::from_name(&action),
                context,
            };
            cmd_assist(&config, &request, daemon).await?;
        }
    }

    Ok(())
}

async fn cmd_start(config: AppConfig, collector: LogCollector) -> Result<()> {
    info!("Starting Quillpad daemon");
    let daemon = Daemon::new(config).with_log_reader(collector.reader());
    daemon.run().await?;
    Ok(())
}

fn client_for(config: &AppConfig) -> IpcClient {
    IpcClient::new(socket_path_from_config(config))
}

async fn cmd_stop(config: &AppConfig) -> Result<()> {
    let client = client_for(config);
    if !client.daemon_available() {
        println!("Daemon is not running.");
        return Ok(());
    }
    let resp = client.stop().await?;
    println!("{}", resp.message);
    Ok(())
}

async fn cmd_status(config: &AppConfig) -> Result<()> {
    let client = client_for(config);
    if !client.daemon_available() {
        println!("Daemon is not running.");
        return Ok(());
    }
    let status = client.status().await?;
    println!("Quillpad {} ({})", status.version, status.git_hash);
    println!("  pid:        {}", status.pid);
    println!("  uptime:     {}s", status.uptime_secs);
    println!("  socket:     {}", status.socket_path);
    println!("  cache:      {}", status.cache_backend);
    println!("  max tokens: {}", status.max_tokens);
    println!(
        "  provider:   {}",
        status.llm_provider.as_deref().unwrap_or("none")
    );
    Ok(())
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str = toml::to_string_pretty(config).context("failed to render config")?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

async fn cmd_logs(config: &AppConfig, limit: Option<usize>) -> Result<()> {
    let logs = client_for(config).logs(limit).await?;
    for entry in logs.entries {
        if entry.fields.is_empty() {
            println!("{} {:>5} {}: {}", entry.timestamp_ms, entry.level, entry.target, entry.message);
        } else {
            println!(
                "{} {:>5} {}: {} {}",
                entry.timestamp_ms, entry.level, entry.target, entry.message, entry.fields
            );
        }
    }
    Ok(())
}

async fn cmd_process(config: &AppConfig, input: &Path, via_daemon: bool) -> Result<()> {
    let raw = read_input(input).await?;
    if via_daemon {
        let resp = client_for(config).process_context(&raw).await?;
        info!(outcome = %resp.outcome, estimated_tokens = resp.estimated_tokens, "context processed by daemon");
        println!("{}", resp.text);
    } else {
        let processed = process_offline(config, &raw).await;
        info!(outcome = processed.outcome.as_str(), "context processed");
        println!("{}", processed.text);
    }
    Ok(())
}

async fn cmd_assist(config: &AppConfig, request: &AssistRequest, via_daemon: bool) -> Result<()> {
    if via_daemon {
        let resp = client_for(config).assist(request).await?;
        match resp.response {
            Some(reply) => println!("{}", reply.message.content),
            None => println!("{}", serde_json::to_string_pretty(&resp.request)?),
        }
        return Ok(());
    }

    let provider = create_provider(&config.llm).map(Arc::from);
    if provider.is_none() {
        warn!("no provider configured, printing the chat request instead");
    }
    let assistant = Assistant::new(offline_pipeline(config), provider, config.llm.clone());
    let outcome = assistant.run(request).await?;
    match outcome.response {
        Some(reply) => println!("{}", reply.message.content),
        None => println!("{}", serde_json::to_string_pretty(&outcome.prepared.request)?),
    }
    Ok(())
}

/// A pipeline for one-shot use: no cache worth keeping across a single run.
fn offline_pipeline(config: &AppConfig) -> ContextPipeline {
    ContextPipeline::new(
        &config.context,
        &config.cache,
        Arc::new(DisabledCacheStore),
        Arc::new(SystemClock),
    )
}

async fn process_offline(config: &AppConfig, raw: &str) -> ProcessedContext {
    offline_pipeline(config).process(raw).await
}

async fn extract_file(path: &Path, pretty: bool) -> Result<String> {
    let raw = read_input(path).await?;
    let state = EditorState::parse(&raw)
        .with_context(|| format!("'{}' is not an editor state", path.display()))?;
    let blocks = extract_blocks(state.root());
    let json = if pretty {
        serde_json::to_string_pretty(&blocks)?
    } else {
        serde_json::to_string(&blocks)?
    };
    Ok(json)
}

async fn read_input(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))
}

/// Load the config file, or defaults when it does not exist. The flag is
/// whether the file was found.
async fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let config = AppConfig::load(path)
            .await
            .with_context(|| format!("invalid config '{}'", path.display()))?;
        Ok((config, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}
