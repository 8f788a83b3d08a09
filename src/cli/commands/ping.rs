use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;

#[derive(Debug, Args)]
pub struct PingArgs {
    #[arg(long, help = "Server base URL (defaults to http://localhost:<API_PORT>)")]
    pub url: Option<String>,
}

pub async fn handle(args: PingArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = args
        .url
        .unwrap_or_else(|| format!("http://localhost:{}", config().api.port));
    let url = format!("{}/health", base.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("failed to build HTTP client")?;

    let started = Instant::now();
    let response = client.get(&url).send().await.with_context(|| format!("{} is unreachable", url))?;
    let status = response.status();
    let body: Value = response.json().await.context("health endpoint returned invalid JSON")?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if !status.is_success() {
        anyhow::bail!("{} responded {} ({})", url, status, body["data"]["store"]);
    }

    output_success(
        output_format,
        &format!("{} is healthy ({} ms)", base, elapsed_ms),
        Some(json!({ "url": url, "status": status.as_u16(), "elapsed_ms": elapsed_ms, "health": body["data"] })),
    )
}
