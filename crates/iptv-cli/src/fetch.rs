//! Resource retrieval for playlists and streams

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// A fetched playlist or stream head
#[derive(Debug)]
pub struct Fetched {
    /// Location the resource was read from
    pub location: String,
    /// Reported content type, absent for local files
    pub content_type: Option<String>,
    pub body: String,
}

/// Read a local file, or fetch an http(s) URL
pub async fn fetch(source: &str) -> anyhow::Result<Fetched> {
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => fetch_remote(url).await,
        Ok(url) => bail!("Unsupported scheme '{}' in {}", url.scheme(), source),
        Err(_) => {
            let body = tokio::fs::read_to_string(source)
                .await
                .with_context(|| format!("Failed to read playlist file: {}", source))?;
            debug!(path = source, bytes = body.len(), "Read local playlist");
            Ok(Fetched {
                location: source.to_string(),
                content_type: None,
                body,
            })
        }
    }
}

async fn fetch_remote(url: Url) -> anyhow::Result<Fetched> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Fetching {}", url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let result = async {
        let response = client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch content: {}", url))?
            .error_for_status()
            .with_context(|| format!("Failed to fetch content: {}", url))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.context("Failed to read response body")?;
        anyhow::Ok((content_type, body))
    }
    .await;
    spinner.finish_and_clear();

    let (content_type, body) = result?;
    info!(
        url = %url,
        content_type = content_type.as_deref().unwrap_or("-"),
        bytes = body.len(),
        "Fetched resource"
    );

    Ok(Fetched {
        location: url.to_string(),
        content_type,
        body,
    })
}
