// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod guest;
pub mod instance;
pub mod logging;
pub mod process;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::fs::RealFileSystem;
use crate::guest::LimaGuest;
use crate::instance::LimaInstance;
use crate::process::{FsNotifyProcess, Process};
use crate::watch::resolve_watch_roots;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - the Lima-backed guest and instance collaborators
/// - the fsnotify process
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(args.config.as_deref().map(Path::new))?;
    if let Some(instance) = args.instance {
        cfg = cfg.with_instance_name(instance)?;
    }
    debug!(?cfg, "effective configuration");

    let instance = Arc::new(
        LimaInstance::new(&cfg.instance.limactl, &cfg.instance.name)
            .with_lima_home(cfg.instance.lima_home.clone()),
    );

    if args.dry_run {
        print_dry_run(&cfg, instance.as_ref()).await?;
        return Ok(());
    }

    let guest = Arc::new(LimaGuest::new(&cfg.instance.limactl, &cfg.instance.name));
    let process = FsNotifyProcess::new(guest, instance, cfg.watcher_options());

    // Ctrl-C → cancellation.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("shutdown requested");
            cancel.cancel();
        });
    }

    info!(process = process.name(), instance = %cfg.instance.name, "starting");
    process.start(cancel).await?;
    info!("stopped");
    Ok(())
}

/// Print the configuration and the roots that would be watched.
async fn print_dry_run(cfg: &ConfigFile, instance: &LimaInstance) -> Result<()> {
    let options = cfg.watcher_options();
    println!("touchbridge dry-run");
    println!("  instance = {}", cfg.instance.name);
    println!("  batch_window = {:?}", options.batch_window);
    println!("  max_batch = {}", options.max_batch);
    println!("  readiness_interval = {:?}", options.readiness_interval);
    println!();

    let roots = resolve_watch_roots(instance, &RealFileSystem).await?;
    println!("watch roots ({}):", roots.len());
    for root in &roots {
        println!("  - {root}");
    }

    debug!("dry-run complete (nothing watched)");
    Ok(())
}
