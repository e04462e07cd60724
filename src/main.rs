//! Binary entrypoint for the headless carousel driver.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use photo_carousel::command::Command;
use photo_carousel::config::Configuration;
use photo_carousel::events::ImageProbed;
use photo_carousel::page::Page;
use photo_carousel::scheduler::{ManualScheduler, TokioScheduler};
use photo_carousel::tasks;

#[derive(Debug, Parser)]
#[command(
    name = "photo-carousel",
    version,
    about = "Headless image carousel driven from stdin"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Advance a virtual clock through this many auto-advance intervals, print
    /// the active slide after each and exit
    #[arg(long = "dry-run", value_name = "TICKS")]
    dry_run: Option<u32>,
    /// Behave as if the platform asked for reduced motion
    #[arg(long = "reduced-motion")]
    reduced_motion: bool,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(
            format!("photo_carousel={level}")
                .parse()
                .context("invalid log directive")?,
        );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        dry_run,
        reduced_motion,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let mut cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    if reduced_motion {
        cfg.page.prefers_reduced_motion = true;
    }
    info!("Loaded configuration from {}", config.display());

    if let Some(ticks) = dry_run {
        return run_dry_run(&cfg, ticks);
    }

    let cancel = CancellationToken::new();
    let (scheduler, timer_rx) = TokioScheduler::channel(cancel.child_token());
    let page = Page::bootstrap(&cfg, scheduler).context("failed to build slider page")?;
    info!(status = %page.status(), "page ready");

    let (command_tx, command_rx) = mpsc::channel::<Command>(16); // stdin -> page
    let (probe_tx, probe_rx) = mpsc::channel::<ImageProbed>(16); // probe -> page
    let (status_tx, _status_rx) = watch::channel(page.status());

    // Ctrl-C cancels everything
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    spawn_stdin_reader(command_tx, cancel.clone())?;

    let probes = tokio::spawn(tasks::probe::run(
        page.probe_requests(),
        probe_tx,
        cancel.clone(),
        cfg.page.image_probe_concurrency,
    ));

    let page = tasks::runner::run(page, timer_rx, command_rx, probe_rx, status_tx, cancel.clone())
        .await
        .context("carousel driver failed")?;
    cancel.cancel();

    match probes.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("probe task error: {e:?}"),
        Err(e) => tracing::error!("join error: {e}"),
    }
    info!(status = %page.status(), "shut down");
    Ok(())
}

/// One command per stdin line; EOF shuts down. A plain thread so a pending
/// read never holds up runtime shutdown.
fn spawn_stdin_reader(commands: mpsc::Sender<Command>, cancel: CancellationToken) -> Result<()> {
    std::thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("stdin watcher failed: {err}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if commands.blocking_send(command).is_err() {
                            return;
                        }
                    }
                    Err(err) => warn!("{err:#}"),
                }
            }
            info!("stdin closed; initiating shutdown");
            cancel.cancel();
        })
        .context("failed to spawn stdin reader")?;
    Ok(())
}

fn run_dry_run(cfg: &Configuration, ticks: u32) -> Result<()> {
    let mut page = Page::bootstrap(cfg, ManualScheduler::new())?;
    let interval = cfg.carousel.auto_advance_interval;

    println!(
        "# carousel dry run\n# slides: {}\n# interval: {}\n# ticks: {}\n",
        page.status().slides,
        humantime::format_duration(interval),
        ticks
    );
    println!(
        "  {:>6}: {}",
        humantime::format_duration(page.scheduler().now()).to_string(),
        page.status()
    );

    for _ in 0..ticks {
        page.advance(interval);
        println!(
            "  {:>6}: {}",
            humantime::format_duration(page.scheduler().now()).to_string(),
            page.status()
        );
    }
    Ok(())
}
