//! Short-form video classification.
//!
//! Shorts are filtered out of notification flows but preserved in the
//! cache, so every call site must classify identically. Keep this the
//! single implementation.

/// Duration sentinel for feed-sourced videos with incomplete metadata.
pub const DURATION_UNKNOWN: &str = "N/A";

/// Classify a video as short-form from its title and display duration.
///
/// Rules, in order:
/// 1. A `#shorts` tag in the title (whole word, case-insensitive) always
///    classifies as short, regardless of duration.
/// 2. An `MM:SS` duration totalling 60 seconds or less is short.
/// 3. An `HH:MM:SS` duration is never short.
/// 4. `"N/A"` or an unparseable duration is **not** short, so videos of
///    unknown length are never silently discarded.
pub fn is_short(title: &str, duration: &str) -> bool {
    if title_has_shorts_tag(title) {
        return true;
    }

    match duration_total_seconds(duration) {
        Some(secs) => secs <= 60,
        None => false,
    }
}

/// Look for `#shorts` as a whole word. The character following the tag
/// must not be alphanumeric, so `#shortsfilm` does not match.
fn title_has_shorts_tag(title: &str) -> bool {
    let lower = title.to_lowercase();
    let mut search = lower.as_str();

    while let Some(pos) = search.find("#shorts") {
        let after = search[pos + "#shorts".len()..].chars().next();
        if !after.map(|c| c.is_alphanumeric()).unwrap_or(false) {
            return true;
        }
        search = &search[pos + 1..];
    }

    false
}

/// Parse an `MM:SS` display duration into seconds. `HH:MM:SS`, `"N/A"`
/// and anything unparseable yield `None`.
fn duration_total_seconds(duration: &str) -> Option<u32> {
    let parts: Vec<&str> = duration.split(':').collect();
    if parts.len() != 2 {
        return None;
    }

    let minutes: u32 = parts[0].trim().parse().ok()?;
    let seconds: u32 = parts[1].trim().parse().ok()?;
    Some(minutes * 60 + seconds)
}

/// Convert an ISO 8601 duration (`PT1H2M10S`) into the display form the
/// cache stores: `"1:02:10"` with hours, `"2:10"` without. Returns
/// `"N/A"` for anything that is not a `PT…` duration.
pub fn format_iso8601_duration(raw: &str) -> String {
    let Some(rest) = raw.strip_prefix("PT") else {
        return DURATION_UNKNOWN.to_string();
    };

    let mut hours: u64 = 0;
    let mut minutes: u64 = 0;
    let mut seconds: u64 = 0;
    let mut digits = String::new();

    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let value: u64 = match digits.parse() {
            Ok(v) => v,
            Err(_) => return DURATION_UNKNOWN.to_string(),
        };
        digits.clear();

        match c {
            'H' => hours = value,
            'M' => minutes = value,
            'S' => seconds = value,
            _ => return DURATION_UNKNOWN.to_string(),
        }
    }

    if !digits.is_empty() {
        // Trailing digits without a unit
        return DURATION_UNKNOWN.to_string();
    }

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
