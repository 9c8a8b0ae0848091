//! scout binary -- composition root.
//!
//! Ties the crates together:
//! 1. Load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the scan context (store, ledger, queue, extractor)
//! 4. Dispatch the subcommand -- the long-running daemon or a one-shot
//!
//! Message sources and notifiers are external collaborators; none ship
//! in this binary. The daemon runs with whichever ones are wired in
//! (today: none) and logs the channels left unconfigured, exactly like
//! a deployment whose credentials are missing.

mod cli;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scout_core::config::ScoutConfig;
use scout_core::error::Result;
use scout_scan::{ReminderService, ScanContext, ScanOrchestrator};

use cli::{CliArgs, Command};

fn main() {
    let args = CliArgs::parse();

    let config_path = args.resolve_config_path();
    let config = ScoutConfig::load_or_default(&config_path);

    init_tracing(args.log_level.as_deref().unwrap_or(&config.general.log_level));

    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    if let Err(e) = dispatch(args, config, &data_dir) {
        eprintln!("scout: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn dispatch(args: CliArgs, config: ScoutConfig, data_dir: &Path) -> Result<()> {
    let ctx = Arc::new(ScanContext::new(config, data_dir)?);

    match args.command {
        Command::Run => run_daemon(ctx),
        Command::Scan => run_manual_scan(ctx),
        Command::Extract { file, source } => run_extract(&ctx, &file, &source),
        Command::Ingest { file, source } => run_ingest(&ctx, file.as_deref(), &source),
        Command::Tasks => print_tasks(&ctx),
    }
}

fn run_daemon(ctx: Arc<ScanContext>) -> Result<()> {
    if ctx.user.full_name.trim().is_empty() {
        warn!("user.full_name is not configured -- only trigger phrases will match");
    }
    for (channel, wired) in [
        ("mail", ctx.mail.is_some()),
        ("chat", ctx.chat.is_some()),
        ("calls", ctx.calls.is_some()),
    ] {
        info!(channel, configured = wired, "scan channel");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let orchestrator = Arc::new(ScanOrchestrator::new(Arc::clone(&ctx)));
        let reminders = Arc::new(ReminderService::new(Arc::clone(&ctx), Vec::new()));

        let scan_task = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.run().await })
        };
        let reminder_task = {
            let reminders = Arc::clone(&reminders);
            tokio::spawn(async move { reminders.run().await })
        };

        info!("scout daemon running -- ctrl-c to stop");
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler failed -- shutting down");
        }

        orchestrator.shutdown();
        reminders.shutdown();
        let _ = scan_task.await;
        let _ = reminder_task.await;
        info!("stopped");
    });
    Ok(())
}

fn run_manual_scan(ctx: Arc<ScanContext>) -> Result<()> {
    // Signal the external agent too; it picks the trigger up from disk.
    ctx.signals.request_scan()?;
    let alive = ctx
        .signals
        .companion_alive(std::time::Duration::from_secs(30));
    info!(companion = alive, "scan trigger written");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let orchestrator = ScanOrchestrator::new(Arc::clone(&ctx));
        orchestrator.run_cycle(true).await;
    });
    Ok(())
}

fn run_extract(ctx: &ScanContext, file: &Path, source: &str) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let candidates = ctx.extractor.extract(source, &content, ctx.today());
    println!("{}", serde_json::to_string_pretty(&candidates)?);
    info!(count = candidates.len(), "extraction complete");
    Ok(())
}

fn run_ingest(ctx: &ScanContext, file: Option<&Path>, source: &str) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let path = ctx.queue.enqueue(&text, source)?;
    println!("queued {}", path.display());
    Ok(())
}

fn print_tasks(ctx: &ScanContext) -> Result<()> {
    let book = ctx.store.load()?;
    println!("{}", serde_json::to_string_pretty(&book)?);
    Ok(())
}
