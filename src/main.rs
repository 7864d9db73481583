//! jirabridge CLI - MCP server and cookie tooling for Jira

use anyhow::Context;
use clap::Parser;
use jirabridge::config::{self, Config};
use jirabridge::cookies::{self, SavedCookies};
use jirabridge::jira::{self, JiraManager, Sources};
use serde_json::Value;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "jirabridge")]
#[command(author = "jirabridge contributors")]
#[command(version)]
#[command(about = "jirabridge - MCP server for Jira using browser session cookies", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to cookie file
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Convert a cookie file of any supported format to the cookie-manager layout
    #[arg(long, value_name = "FILE")]
    convert: Option<PathBuf>,

    /// Output path for --convert (default: cookies.json beside the input,
    /// or <name>.converted.json when the input is already cookies.json)
    #[arg(short, long, value_name = "FILE", requires = "convert")]
    output: Option<PathBuf>,

    /// Check that the cookies authenticate against Jira, then exit
    #[arg(long)]
    check: bool,

    /// Initialize a new config file with defaults
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&args)?;

    if args.init {
        let config_path = config::expand_path(
            args.config
                .as_deref()
                .unwrap_or_else(|| Path::new(config::CONFIG_CANDIDATES[0])),
        );
        if config_path.exists() {
            tracing::warn!("Config file already exists: {}", config_path.display());
            return Ok(());
        }
        Config::create_default(&config_path)?;
        tracing::info!("Created default config at: {}", config_path.display());
        return Ok(());
    }

    if let Some(source) = &args.convert {
        return convert(source, args.output.as_deref());
    }

    let sources = Sources {
        config_file: args.config.clone(),
        cookie_file: args.cookies.clone(),
    };

    if args.check {
        return check(&sources).await;
    }

    // MCP server mode - communicate over stdio
    jirabridge::mcp::run_mcp_server(JiraManager::new(sources)).await?;
    Ok(())
}

/// Logs go to stderr; stdout is reserved for protocol messages
fn init_logging(args: &Args) -> anyhow::Result<Option<WorkerGuard>> {
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("jirabridge={}", log_level).into());

    let (file_layer, guard) = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(config::expand_path(path))
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Rewrite a cookie file in the cookie-manager layout, listing what was found
fn convert(source: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let source = config::expand_path(source);
    let (document, extraction) = cookies::load_cookie_file(&source)?;

    println!("Detected format: {}", extraction.format);
    println!("Found {} cookies:", extraction.cookies.len());
    for (name, value) in cookies::display_order(&extraction.cookies) {
        println!("  {}: {}", name, cookies::mask_value(value));
    }
    for warning in &extraction.warnings {
        println!("Warning: {}", warning);
    }
    if !extraction.cookies.contains_key(cookies::CRITICAL_COOKIE) {
        println!(
            "Warning: {} is missing; Jira will likely reject this session",
            cookies::CRITICAL_COOKIE
        );
    }

    if extraction.cookies.is_empty() {
        anyhow::bail!("No cookies found in {}", source.display());
    }

    let output = output
        .map(config::expand_path)
        .unwrap_or_else(|| cookies::default_output_path(&source));
    let domain = document
        .get("domain")
        .and_then(Value::as_str)
        .map(str::to_string);

    SavedCookies::new(extraction.cookies, domain)
        .with_source(&source, extraction.format)
        .save(&output)?;
    println!("Saved to {}", output.display());

    Ok(())
}

/// Authenticate once and report who the cookies belong to
async fn check(sources: &Sources) -> anyhow::Result<()> {
    let client = jira::open_session(sources)?;
    let me = client
        .myself()
        .await
        .with_context(|| format!("Authentication check against {} failed", client.base_url()))?;

    let field = |name: &str| {
        me.get(name)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string()
    };
    println!("Connected to {}", client.base_url());
    println!("  User:  {}", field("displayName"));
    println!("  Email: {}", field("emailAddress"));

    Ok(())
}
