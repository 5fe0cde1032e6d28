//! Atelier daemon.
//!
//! Loads configuration, discovers templates, starts the agent scheduler and
//! runs until interrupted.

use atelier::config::RuntimeConfig;
use atelier::runtime::Runtime;
use atelier::template::adapters::TemplateLibrary;
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "atelierd")]
#[command(version, about = "Atelier agent template runtime")]
struct Args {
    /// Path to a JSON configuration file.
    #[arg(long, env = "ATELIER_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Additional template directories, scanned after configured ones.
    #[arg(long = "template-dir", env = "ATELIER_TEMPLATE_DIRS", value_delimiter = ',')]
    template_dirs: Vec<Utf8PathBuf>,

    /// Override for the concurrency ceiling.
    #[arg(long, env = "ATELIER_MAX_AGENTS")]
    max_agents: Option<usize>,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "ATELIER_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON.
    #[arg(long, env = "ATELIER_LOG_JSON")]
    log_json: bool,
}

fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_owned()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn load_config(args: &Args) -> Result<RuntimeConfig, BoxError> {
    let mut config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    config
        .discovery
        .source_locations
        .extend(args.template_dirs.iter().cloned());
    if let Some(max_agents) = args.max_agents {
        config.scheduler = config.scheduler.with_max_concurrent_agents(max_agents);
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    let level = &args.log_level;
    init_tracing(&format!("atelier={level},atelierd={level}"), args.log_json);

    let config = load_config(&args)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        locations = ?config.discovery.source_locations,
        max_agents = config.scheduler.max_concurrent_agents,
        "starting atelierd"
    );

    let runtime = Runtime::new(config, TemplateLibrary::with_builtins());
    let report = runtime.init();
    info!(
        discovered = report.discovered,
        registered = report.registered,
        "templates loaded"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    runtime.shutdown().await;
    Ok(())
}
