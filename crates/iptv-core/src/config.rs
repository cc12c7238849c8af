//! Player configuration
//!
//! Loaded from TOML; every section falls back to its defaults so a partial
//! file only overrides what it names.

use crate::{error::TerminalFault, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level player configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Autoplay retry policy
    pub retry: RetryPolicy,
    /// Tuning handed to the adaptive streaming engine
    pub engine: EngineConfig,
    /// User-facing strings
    pub messages: Messages,
}

impl PlayerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlayerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings the session manager cannot honor
    pub fn validate(&self) -> Result<()> {
        let retry = &self.retry;
        if retry.max_play_attempts == 0 {
            return Err(Error::InvalidConfig(
                "retry.max_play_attempts must be at least 1".to_string(),
            ));
        }
        if retry.cap_delay_ms < retry.base_delay_ms {
            return Err(Error::InvalidConfig(
                "retry.cap_delay_ms must not be below retry.base_delay_ms".to_string(),
            ));
        }
        if retry.playlist_cap_delay_ms < retry.playlist_base_delay_ms {
            return Err(Error::InvalidConfig(
                "retry.playlist_cap_delay_ms must not be below retry.playlist_base_delay_ms"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Autoplay retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total play attempts before giving up, the first one included
    pub max_play_attempts: u32,
    /// Per-attempt delay step for single streams
    pub base_delay_ms: u64,
    /// Delay ceiling for single streams
    pub cap_delay_ms: u64,
    /// Per-attempt delay step for playlist-shaped sources
    pub playlist_base_delay_ms: u64,
    /// Delay ceiling for playlist-shaped sources
    pub playlist_cap_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_play_attempts: 3,
            base_delay_ms: 1000,
            cap_delay_ms: 3000,
            playlist_base_delay_ms: 2000,
            playlist_cap_delay_ms: 6000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next play attempt after `failed_attempts` rejections.
    ///
    /// `min(base * failed_attempts, cap)` with the playlist constants when
    /// the source is playlist-shaped.
    pub fn delay_for(&self, failed_attempts: u32, playlist_source: bool) -> Duration {
        let (base, cap) = if playlist_source {
            (self.playlist_base_delay_ms, self.playlist_cap_delay_ms)
        } else {
            (self.base_delay_ms, self.cap_delay_ms)
        };
        Duration::from_millis(base.saturating_mul(u64::from(failed_attempts)).min(cap))
    }

    /// True while another attempt may be scheduled
    pub fn allows_retry(&self, failed_attempts: u32) -> bool {
        failed_attempts < self.max_play_attempts
    }
}

/// Adaptive streaming engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub enable_worker: bool,
    pub max_buffer_size: u64,
    pub max_buffer_length_secs: u32,
    pub live_sync_duration_secs: u32,
    pub live_max_latency_duration_secs: u32,
    pub live_duration_infinity: bool,
    pub high_buffer_watchdog_period_secs: u32,
    pub manifest_loading_timeout_ms: u64,
    pub manifest_loading_max_retry: u32,
    pub manifest_loading_retry_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: false,
            max_buffer_size: 0,
            max_buffer_length_secs: 30,
            live_sync_duration_secs: 3,
            live_max_latency_duration_secs: 6,
            live_duration_infinity: true,
            high_buffer_watchdog_period_secs: 1,
            manifest_loading_timeout_ms: 10_000,
            manifest_loading_max_retry: 3,
            manifest_loading_retry_delay_ms: 1000,
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Title for entries without one
    pub unknown_channel: String,
    /// Group for entries without one
    pub uncategorized: String,
    pub playback_unsupported: String,
    pub init_failed: String,
    pub playlist_format_error: String,
    pub playback_failed: String,
    pub autoplay_blocked: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            unknown_channel: "Unknown".to_string(),
            uncategorized: "Uncategorized".to_string(),
            playback_unsupported: "Playback of this video is not supported".to_string(),
            init_failed: "Player initialization failed".to_string(),
            playlist_format_error: "Playlist format error, unable to parse".to_string(),
            playback_failed: "Playback failed, please try another channel".to_string(),
            autoplay_blocked: "Autoplay was blocked, tap the video to play manually".to_string(),
        }
    }
}

impl Messages {
    /// Simplified Chinese strings
    pub fn zh_cn() -> Self {
        Self {
            unknown_channel: "未知频道".to_string(),
            uncategorized: "未分类".to_string(),
            playback_unsupported: "您的浏览器不支持播放此视频".to_string(),
            init_failed: "播放器初始化失败".to_string(),
            playlist_format_error: "播放列表格式错误，无法解析".to_string(),
            playback_failed: "播放失败，请尝试其他频道".to_string(),
            autoplay_blocked: "自动播放失败，请点击视频手动播放".to_string(),
        }
    }

    /// Message shown for a terminal fault
    pub fn for_fault(&self, fault: TerminalFault) -> &str {
        match fault {
            TerminalFault::Unsupported => &self.playback_unsupported,
            TerminalFault::InitFailed => &self.init_failed,
            TerminalFault::PlaylistFormat => &self.playlist_format_error,
            TerminalFault::Unrecoverable => &self.playback_failed,
            TerminalFault::AutoplayBlocked => &self.autoplay_blocked,
        }
    }
}
