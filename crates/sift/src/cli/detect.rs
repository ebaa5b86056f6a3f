//! The `sift detect` command: probe an endpoint and print its API flavor.

use clap::Args;
use sift_core::{ApiKind, Config};
use std::time::Duration;

/// Arguments for the `detect` command.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Inference server base URL (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Execute the detect command.
pub async fn execute(args: DetectArgs, config: &Config) -> anyhow::Result<()> {
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.server.base_url.clone());
    let base = sift_core::normalize_base_url(&base_url);

    let client = reqwest::Client::new();
    let probe_timeout = Duration::from_millis(config.query.probe_timeout_ms);
    let kind = sift_core::detect_api_type(&client, &base, probe_timeout).await;

    println!("{kind}");

    if kind == ApiKind::Unknown {
        anyhow::bail!(
            "neither probe succeeded against {base}; is the server running and reachable?"
        );
    }
    Ok(())
}
