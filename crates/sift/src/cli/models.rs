//! The `sift models` command: list the models an endpoint serves.

use clap::Args;
use sift_core::{ApiKind, BackendOptions, Config, VisionBackend};
use std::time::Duration;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Inference server base URL (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Pin the API flavor instead of probing
    #[arg(long)]
    pub api_type: Option<ApiKind>,
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.server.base_url.clone());
    let pinned = args.api_type.or(config.server.api_type);

    let client = reqwest::Client::new();
    let probe_timeout = Duration::from_millis(config.query.probe_timeout_ms);
    let kind = sift_core::resolve_api_kind(&client, pinned, &base_url, probe_timeout).await;
    if kind == ApiKind::Unknown {
        anyhow::bail!("could not classify {base_url}; nothing to list");
    }

    let backend = sift_core::backend_for(
        kind,
        &base_url,
        &config.server.model,
        BackendOptions {
            request_timeout: Duration::from_millis(config.query.request_timeout_ms),
        },
    )?;

    let models = backend.list_models().await?;
    if models.is_empty() {
        tracing::warn!("{kind} endpoint at {base_url} serves no models");
    }
    for model in models {
        println!("{model}");
    }
    Ok(())
}
