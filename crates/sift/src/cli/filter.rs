//! The `sift filter` command: judge images against a prompt.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use sift_core::{ApiKind, BackendOptions, Config, FilterWorker, WorkerEvent};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the `filter` command.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Image files to judge
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Object or scene to look for (e.g., "a red bicycle")
    #[arg(short, long)]
    pub prompt: String,

    /// Inference server base URL (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Vision model name (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature (overrides config)
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Pin the API flavor ("ollama" or "openai-compatible") instead of probing
    #[arg(long)]
    pub api_type: Option<ApiKind>,

    /// Emit one JSON verdict per line instead of matched paths
    #[arg(long)]
    pub json: bool,
}

/// Execute the filter command.
pub async fn execute(args: FilterArgs, config: &Config) -> anyhow::Result<()> {
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.server.base_url.clone());
    let model = args.model.unwrap_or_else(|| config.server.model.clone());
    let temperature = args.temperature.unwrap_or(config.query.temperature);
    let pinned = args.api_type.or(config.server.api_type);

    // Classify the endpoint once for the whole run
    let client = reqwest::Client::new();
    let probe_timeout = Duration::from_millis(config.query.probe_timeout_ms);
    let kind = sift_core::resolve_api_kind(&client, pinned, &base_url, probe_timeout).await;
    if kind == ApiKind::Unknown {
        anyhow::bail!(
            "could not classify {base_url}: neither the native nor the OpenAI-compatible \
             listing endpoint answered. Check the URL, or pin the flavor with --api-type."
        );
    }
    tracing::info!("using {kind} endpoint at {base_url}, model {model}");

    let options = BackendOptions {
        request_timeout: Duration::from_millis(config.query.request_timeout_ms),
    };
    let worker = FilterWorker::new(kind, &base_url, &model, &args.prompt, temperature, options)?;
    let control = worker.control();

    // Ctrl-C requests a cooperative stop; the in-flight image finishes first
    tokio::spawn({
        let control = control.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, stopping after the current image");
                control.stop();
            }
        }
    });

    let start = std::time::Instant::now();
    let (task, mut events) = worker.spawn(args.images);

    let mut progress: Option<ProgressBar> = None;
    let mut matched_count: u64 = 0;
    let mut failed: u64 = 0;
    let mut processed: u64 = 0;
    let mut stopped = false;

    while let Some(event) = events.recv().await {
        match event {
            WorkerEvent::Started { total } => {
                progress = Some(create_progress_bar(total as u64));
            }
            WorkerEvent::Processing { path, .. } => {
                if let Some(pb) = &progress {
                    pb.set_message(
                        path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                    );
                }
            }
            WorkerEvent::Judged(verdict) => {
                processed += 1;
                if verdict.matched {
                    matched_count += 1;
                }
                if verdict.error.is_some() {
                    failed += 1;
                }
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                if args.json {
                    println!("{}", serde_json::to_string(&verdict)?);
                } else if verdict.matched {
                    match &progress {
                        Some(pb) => pb.suspend(|| println!("{}", verdict.path.display())),
                        None => println!("{}", verdict.path.display()),
                    }
                }
            }
            WorkerEvent::Stopped { processed } => {
                stopped = true;
                tracing::warn!("run stopped after {processed} images");
            }
            WorkerEvent::Finished { matched } => {
                tracing::debug!("{} matched paths collected", matched.len());
            }
        }
    }
    task.await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    print_summary(matched_count, failed, processed, stopped, start.elapsed());

    Ok(())
}

/// Create a progress bar for the filter run.
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the run.
fn print_summary(matched: u64, failed: u64, processed: u64, stopped: bool, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    if stopped {
        eprintln!("          Summary (stopped)");
    } else {
        eprintln!("               Summary");
    }
    eprintln!("  ====================================");
    eprintln!("    Matched:      {:>8}", matched);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Processed:    {:>8}", processed);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}
