//! M3U playlist parsing
//!
//! Single pass over the trimmed lines of a playlist. An `#EXTINF:` line opens
//! a pending entry and the next locator line closes it:
//!
//! ```text
//! #EXTINF:-1 tvg-logo="https://cdn/logo.png" group-title="News",World News
//! https://cdn.example.com/world/index.m3u8
//! ```
//!
//! Malformed input never fails, it only yields fewer entries.

use crate::{config::Messages, types::Channel, DURATION_UNKNOWN};
use nom::{
    bytes::complete::{tag_no_case, take_till},
    character::complete::{char, digit1},
    combinator::{opt, recognize},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use tracing::{debug, trace};

const METADATA_MARKER: &str = "#EXTINF:";
const COMMENT_MARKER: char = '#';
const BYTE_ORDER_MARK: char = '\u{FEFF}';
const LOCATOR_SCHEMES: [&str; 3] = ["http", "rtmp", "rtsp"];

/// Parse a playlist with the default English labels
pub fn parse(text: &str) -> Vec<Channel> {
    PlaylistParser::default().parse(text)
}

/// Playlist parser carrying the placeholder labels for missing fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistParser {
    unknown_channel: String,
    uncategorized: String,
}

impl Default for PlaylistParser {
    fn default() -> Self {
        Self::from_messages(&Messages::default())
    }
}

impl PlaylistParser {
    pub fn new(unknown_channel: impl Into<String>, uncategorized: impl Into<String>) -> Self {
        Self {
            unknown_channel: unknown_channel.into(),
            uncategorized: uncategorized.into(),
        }
    }

    /// Use the placeholder labels of a message set
    pub fn from_messages(messages: &Messages) -> Self {
        Self::new(&messages.unknown_channel, &messages.uncategorized)
    }

    /// Parse playlist text into channels, in the order their locators appear
    pub fn parse(&self, text: &str) -> Vec<Channel> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        let (channels, pending) = text.lines().map(str::trim).fold(
            (Vec::<Channel>::new(), None::<Pending>),
            |(mut channels, pending), line| match classify(line) {
                Line::Metadata(info) => {
                    if let Some(dropped) = pending {
                        trace!(title = %dropped.title, "Metadata block without locator dropped");
                    }
                    (channels, Some(self.read_metadata(info)))
                }
                Line::Locator(url) => match pending {
                    Some(entry) if !entry.title.is_empty() => {
                        channels.push(entry.complete(url));
                        (channels, None)
                    }
                    Some(_) => {
                        trace!(url, "Untitled metadata block dropped");
                        (channels, None)
                    }
                    None => {
                        trace!(url, "Locator without metadata ignored");
                        (channels, None)
                    }
                },
                Line::Skip => (channels, pending),
                Line::Unsupported(directive) => {
                    trace!(directive, "Unsupported line ignored");
                    (channels, pending)
                }
            },
        );

        if let Some(dropped) = pending {
            trace!(title = %dropped.title, "Trailing metadata block without locator dropped");
        }

        debug!(channels = channels.len(), "Playlist parsed");
        channels
    }

    fn read_metadata(&self, line: &str) -> Pending {
        let title = match line.rfind(',') {
            Some(idx) => line[idx + 1..].trim().to_string(),
            None => self.unknown_channel.clone(),
        };

        Pending {
            title,
            group: find_attribute(line, "group-title")
                .map(|g| g.trim().to_string())
                .unwrap_or_else(|| self.uncategorized.clone()),
            logo: find_attribute(line, "tvg-logo")
                .map(|l| l.trim().to_string())
                .unwrap_or_default(),
            duration: first_integer(line).unwrap_or(DURATION_UNKNOWN),
        }
    }
}

/// Metadata waiting for its locator line
#[derive(Debug)]
struct Pending {
    title: String,
    group: String,
    logo: String,
    duration: i64,
}

impl Pending {
    fn complete(self, url: &str) -> Channel {
        Channel {
            title: self.title,
            group: self.group,
            logo: self.logo,
            duration: self.duration,
            url: url.to_string(),
        }
    }
}

enum Line<'a> {
    Metadata(&'a str),
    Locator(&'a str),
    Skip,
    Unsupported(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with(METADATA_MARKER) {
        Line::Metadata(line)
    } else if LOCATOR_SCHEMES.iter().any(|scheme| line.starts_with(scheme)) {
        Line::Locator(line)
    } else if line.is_empty() || line.starts_with(COMMENT_MARKER) {
        Line::Skip
    } else {
        Line::Unsupported(line)
    }
}

fn signed_integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1)).parse(input)
}

/// First signed integer literal anywhere in the line
fn first_integer(line: &str) -> Option<i64> {
    line.char_indices().find_map(|(idx, _)| {
        let (_, literal) = signed_integer(&line[idx..]).ok()?;
        Some(literal.parse::<i64>().unwrap_or(if literal.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }))
    })
}

/// Value of `name="..."`, matching the name case-insensitively
fn find_attribute<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.char_indices().find_map(|(idx, _)| {
        let parsed: IResult<&str, &str> = preceded(
            pair(tag_no_case(name), char('=')),
            delimited(char('"'), take_till(|c| c == '"'), char('"')),
        )
        .parse(&line[idx..]);
        parsed.ok().map(|(_, value)| value)
    })
}

/// Channels whose title or group contains `term`, ignoring case
pub fn search<'a>(channels: &'a [Channel], term: &str) -> Vec<&'a Channel> {
    let needle = term.to_lowercase();
    channels
        .iter()
        .filter(|c| {
            c.title.to_lowercase().contains(&needle) || c.group.to_lowercase().contains(&needle)
        })
        .collect()
}
