//! Source resolution
//!
//! Decides whether a fetched resource is a channel playlist or a single
//! stream, and routes playback URLs through the cross-origin proxy.

use crate::{playlist::PlaylistParser, types::Channel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::form_urlencoded;

/// True when the URL looks like an M3U playlist
pub fn is_playlist_url(url: &str) -> bool {
    url.to_lowercase().contains(".m3u")
}

/// True when a fetched resource should be parsed as a playlist
pub fn is_playlist_response(url: &str, content_type: Option<&str>) -> bool {
    let mpegurl = content_type
        .map(|ct| ct.to_lowercase().contains("mpegurl"))
        .unwrap_or(false);
    mpegurl || url.ends_with(".m3u") || url.ends_with(".m3u8")
}

/// Proxy endpoint that fetches remote resources on the player's behalf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    /// Endpoint path or absolute URL
    pub path: String,
    /// Query parameter carrying the target URL
    pub query_key: String,
}

impl Default for ProxyEndpoint {
    fn default() -> Self {
        Self {
            path: "/api/proxy".to_string(),
            query_key: "url".to_string(),
        }
    }
}

impl ProxyEndpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Proxied form of `target`
    pub fn wrap(&self, target: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.query_key, target)
            .finish();
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.path, separator, query)
    }
}

/// Outcome of resolving a user-supplied URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedSource {
    /// A playlist with at least one channel; the first one is selected
    Playlist {
        channels: Vec<Channel>,
        selected: usize,
        playback_url: String,
    },
    /// Anything else is played as one stream
    Stream { playback_url: String },
}

impl ResolvedSource {
    /// URL to hand to the player
    pub fn playback_url(&self) -> &str {
        match self {
            ResolvedSource::Playlist { playback_url, .. } => playback_url,
            ResolvedSource::Stream { playback_url } => playback_url,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        match self {
            ResolvedSource::Playlist { channels, .. } => channels,
            ResolvedSource::Stream { .. } => &[],
        }
    }

    pub fn selected_channel(&self) -> Option<&Channel> {
        match self {
            ResolvedSource::Playlist {
                channels, selected, ..
            } => channels.get(*selected),
            ResolvedSource::Stream { .. } => None,
        }
    }
}

/// Resolve a fetched resource into something playable
pub fn resolve_source(
    url: &str,
    content_type: Option<&str>,
    body: &str,
    parser: &PlaylistParser,
    proxy: &ProxyEndpoint,
) -> ResolvedSource {
    if is_playlist_response(url, content_type) {
        let channels = parser.parse(body);
        if let Some(first) = channels.first() {
            info!(channels = channels.len(), first = %first.title, "Resolved playlist");
            let playback_url = proxy.wrap(&first.url);
            return ResolvedSource::Playlist {
                channels,
                selected: 0,
                playback_url,
            };
        }
        debug!(url, "Playlist-shaped source yielded no channels, playing as stream");
    }

    info!(url, "Resolved single stream");
    ResolvedSource::Stream {
        playback_url: proxy.wrap(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYLIST: &str = "#EXTM3U\n#EXTINF:-1 group-title=\"News\",One\nhttp://cdn/one.m3u8\n#EXTINF:-1,Two\nhttp://cdn/two.m3u8\n";

    #[test]
    fn test_playlist_detection() {
        assert!(is_playlist_url("http://x/LIST.M3U8"));
        assert!(is_playlist_url("http://x/list.m3u?token=1"));
        assert!(!is_playlist_url("http://x/video.mp4"));

        assert!(is_playlist_response("http://x/a", Some("application/vnd.apple.mpegURL")));
        assert!(is_playlist_response("http://x/a.m3u", None));
        assert!(!is_playlist_response("http://x/a.ts", Some("video/mp2t")));
    }

    #[test]
    fn test_proxy_wrap() {
        let proxy = ProxyEndpoint::default();
        assert_eq!(
            proxy.wrap("http://a.b/c?d=1&e=2"),
            "/api/proxy?url=http%3A%2F%2Fa.b%2Fc%3Fd%3D1%26e%3D2"
        );
        let proxy = ProxyEndpoint::new("https://proxy.local/fetch?v=1");
        assert!(proxy.wrap("http://x").starts_with("https://proxy.local/fetch?v=1&url="));
    }

    #[test]
    fn test_resolve_playlist_selects_first() {
        let resolved = resolve_source(
            "http://x/list.m3u",
            Some("audio/x-mpegurl"),
            PLAYLIST,
            &PlaylistParser::default(),
            &ProxyEndpoint::default(),
        );
        assert_eq!(resolved.channels().len(), 2);
        assert_eq!(resolved.selected_channel().map(|c| c.title.as_str()), Some("One"));
        assert_eq!(resolved.playback_url(), "/api/proxy?url=http%3A%2F%2Fcdn%2Fone.m3u8");
    }

    #[test]
    fn test_resolve_empty_playlist_falls_back_to_stream() {
        let resolved = resolve_source(
            "http://x/live.m3u8",
            Some("application/vnd.apple.mpegurl"),
            "#EXTM3U\n#EXT-X-TARGETDURATION:6\nsegment0.ts\n",
            &PlaylistParser::default(),
            &ProxyEndpoint::default(),
        );
        assert!(matches!(resolved, ResolvedSource::Stream { .. }));
        assert!(resolved.channels().is_empty());
        assert_eq!(resolved.playback_url(), "/api/proxy?url=http%3A%2F%2Fx%2Flive.m3u8");
    }

    #[test]
    fn test_resolve_stream() {
        let resolved = resolve_source(
            "http://x/movie.mp4",
            Some("video/mp4"),
            "",
            &PlaylistParser::default(),
            &ProxyEndpoint::default(),
        );
        assert_eq!(resolved.selected_channel(), None);
    }
}
