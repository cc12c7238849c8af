//! CLI command implementations

use crate::fetch::fetch;
use crate::output::{format_channels, format_resolved, OutputFormat};
use iptv_core::{is_playlist_response, resolve_source, search as search_channels, PlaylistParser, ProxyEndpoint};
use tracing::warn;

/// Parse a playlist and list its channels
pub async fn parse(source: &str, parser: &PlaylistParser, format: OutputFormat) -> anyhow::Result<()> {
    let fetched = fetch(source).await?;
    if fetched.content_type.is_some()
        && !is_playlist_response(&fetched.location, fetched.content_type.as_deref())
    {
        warn!(
            content_type = fetched.content_type.as_deref().unwrap_or("-"),
            "Resource does not look like a playlist, parsing anyway"
        );
    }

    let channels = parser.parse(&fetched.body);
    let refs: Vec<_> = channels.iter().collect();
    println!("{}", format_channels(&refs, format));

    if format != OutputFormat::Json {
        println!("\n{} channels", channels.len());
    }
    Ok(())
}

/// List channels whose title or group matches a term
pub async fn search(
    source: &str,
    term: &str,
    parser: &PlaylistParser,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let fetched = fetch(source).await?;
    let channels = parser.parse(&fetched.body);
    let matches = search_channels(&channels, term);

    if matches.is_empty() && format != OutputFormat::Json {
        println!("No channels match '{}'", term);
        return Ok(());
    }
    println!("{}", format_channels(&matches, format));
    Ok(())
}

/// Decide what the player should load for a URL
pub async fn resolve(
    url: &str,
    proxy: &ProxyEndpoint,
    parser: &PlaylistParser,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let fetched = fetch(url).await?;
    let resolved = resolve_source(
        &fetched.location,
        fetched.content_type.as_deref(),
        &fetched.body,
        parser,
        proxy,
    );

    if format != OutputFormat::Json {
        println!(
            "Content type: {}",
            fetched.content_type.as_deref().unwrap_or("unknown")
        );
    }
    println!("{}", format_resolved(&resolved, format));
    Ok(())
}
