//! Channel reference parsing.
//!
//! Subscriptions are created from whatever the user pastes: a raw
//! channel ID, an `@handle`, or a full channel URL. Parsing happens here
//! so the resolution layer only ever sees the two canonical forms.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::video::ChannelId;

/// Resolved channel identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChannelInfo {
    pub channel_id: ChannelId,
    pub channel_name: String,
}

/// A user-supplied channel reference, reduced to its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// A raw `UC…` channel ID
    Id(String),
    /// An `@handle` (leading `@` stripped)
    Handle(String),
    /// Free text to resolve via channel search
    Query(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelRefError {
    #[error("channel reference is empty")]
    Empty,
    #[error("URL does not point to a channel: {0}")]
    NotAChannelUrl(String),
}

/// Parse a raw user input into a [`ChannelRef`].
///
/// Accepted forms:
/// - `UCxxxxxxxxxxxxxxxxxxxxxx` (24 characters starting with `UC`)
/// - `@handle` or `handle URL` (`youtube.com/@handle`)
/// - `youtube.com/channel/UC…`
/// - anything else becomes a search query
pub fn parse_channel_reference(input: &str) -> Result<ChannelRef, ChannelRefError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ChannelRefError::Empty);
    }

    if is_channel_id(input) {
        return Ok(ChannelRef::Id(input.to_string()));
    }

    if let Some(handle) = input.strip_prefix('@') {
        if handle.is_empty() {
            return Err(ChannelRefError::Empty);
        }
        return Ok(ChannelRef::Handle(handle.to_string()));
    }

    if is_youtube_url(input) {
        return parse_channel_url(input);
    }

    Ok(ChannelRef::Query(input.to_string()))
}

/// Channel IDs are 24 characters beginning with `UC`.
fn is_channel_id(s: &str) -> bool {
    s.len() == 24
        && s.starts_with("UC")
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_youtube_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.contains("youtube.com/")
}

fn parse_channel_url(url: &str) -> Result<ChannelRef, ChannelRefError> {
    if let Some(pos) = url.find("/channel/") {
        let id = path_segment(&url[pos + "/channel/".len()..]);
        if is_channel_id(&id) {
            return Ok(ChannelRef::Id(id));
        }
        return Err(ChannelRefError::NotAChannelUrl(url.to_string()));
    }

    if let Some(pos) = url.find("/@") {
        let handle = path_segment(&url[pos + 2..]);
        if !handle.is_empty() {
            return Ok(ChannelRef::Handle(handle));
        }
    }

    // Legacy /c/Name and /user/Name vanity paths resolve via search
    for prefix in ["/c/", "/user/"] {
        if let Some(pos) = url.find(prefix) {
            let name = path_segment(&url[pos + prefix.len()..]);
            if !name.is_empty() {
                return Ok(ChannelRef::Query(name));
            }
        }
    }

    Err(ChannelRefError::NotAChannelUrl(url.to_string()))
}

/// Take the path segment up to the next delimiter.
fn path_segment(s: &str) -> String {
    let end = s.find(['/', '?', '&', '#']).unwrap_or(s.len());
    s[..end].trim().to_string()
}
