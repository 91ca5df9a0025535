use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scout_common::observability::{init_logging, LogConfig};
use scout_config::{ScoutConfig, ScoutConfigLoader};
use scout_drivers::scout_browser::driver::FantocciniFactory;
use scout_web::Pipeline;
use tracing::info;

use scout_app::server::{self, AppState};

/// Careers page discovery service.
#[derive(Parser, Debug)]
#[command(name = "scout", version, about)]
struct Args {
    /// YAML configuration file; ignored when it does not exist.
    #[arg(long, env = "SCOUT_CONFIG", default_value = "scout.yaml")]
    config: PathBuf,

    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    bind: Option<String>,

    /// Mirror log events to stderr.
    #[arg(long)]
    log_stderr: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins)
    let cfg: ScoutConfig = ScoutConfigLoader::new()
        .with_optional_file(&args.config)
        .load()
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    // 2) Logging from the `logging` section
    let log_path = init_logging(LogConfig {
        app_name: "scout",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr || args.log_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;

    let bind = args.bind.unwrap_or_else(|| cfg.server.bind.clone());
    info!(
        target: "scout.server",
        config = %args.config.display(),
        log_file = %log_path.display(),
        webdriver = %cfg.browser.webdriver_url,
        mode = ?cfg.extraction.mode,
        "scout.start"
    );

    let sessions = Arc::new(FantocciniFactory::new(cfg.browser.clone()));
    let pipeline = Pipeline::new(&cfg, sessions).context("failed to build pipeline")?;
    let state = AppState::new(pipeline, cfg.environment.clone());

    server::serve(state, &bind).await
}
