//! Output formatting for CLI

use console::style;
use iptv_core::{Channel, ResolvedSource};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

#[derive(Tabled)]
struct ChannelRow<'a> {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Title")]
    title: &'a str,
    #[tabled(rename = "Group")]
    group: &'a str,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "URL")]
    url: &'a str,
}

fn duration_label(channel: &Channel) -> String {
    if channel.is_live() {
        "live".to_string()
    } else {
        format!("{}s", channel.duration)
    }
}

fn to_json<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
}

/// Render channels in the selected format
pub fn format_channels(channels: &[&Channel], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(channels),
        OutputFormat::Table => {
            let rows = channels.iter().enumerate().map(|(i, c)| ChannelRow {
                index: i + 1,
                title: &c.title,
                group: &c.group,
                duration: duration_label(c),
                url: &c.url,
            });
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Text => channels
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut line = format!(
                    "{:>4}. {} {}",
                    i + 1,
                    style(&c.title).bold(),
                    style(format!("[{} · {}]", c.group, duration_label(c))).dim()
                );
                line.push_str(&format!("\n      {}", c.url));
                if c.has_logo() {
                    line.push_str(&format!("\n      logo: {}", c.logo));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render a resolved source in the selected format
pub fn format_resolved(resolved: &ResolvedSource, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(resolved),
        OutputFormat::Table | OutputFormat::Text => match resolved {
            ResolvedSource::Playlist { channels, .. } => {
                let selected = resolved
                    .selected_channel()
                    .map(|c| c.title.as_str())
                    .unwrap_or("-");
                format!(
                    "{} playlist with {} channels\n  Selected: {}\n  Playback URL: {}",
                    style("✓").green(),
                    channels.len(),
                    style(selected).bold(),
                    resolved.playback_url()
                )
            }
            ResolvedSource::Stream { playback_url } => format!(
                "{} single stream\n  Playback URL: {}",
                style("✓").green(),
                playback_url
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(title: &str, duration: i64) -> Channel {
        Channel {
            title: title.to_string(),
            group: "News".to_string(),
            logo: String::new(),
            duration,
            url: format!("http://cdn/{}", title),
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("anything"), OutputFormat::Text);
    }

    #[test]
    fn test_json_output() {
        let a = channel("a", -1);
        let json = format_channels(&[&a], OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["title"], "a");
        assert_eq!(parsed[0]["duration"], -1);
    }

    #[test]
    fn test_table_output() {
        let a = channel("alpha", 120);
        let table = format_channels(&[&a], OutputFormat::Table);
        assert!(table.contains("alpha"));
        assert!(table.contains("120s"));
        assert!(table.contains("Group"));
    }
}
