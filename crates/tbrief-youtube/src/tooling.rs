//! Startup checks for external tools.

use tracing::{debug, warn};

/// True when yt-dlp is on PATH. Transcript and audio extraction need it;
/// listing and notifications work without.
pub fn ytdlp_available() -> bool {
    match which::which("yt-dlp") {
        Ok(path) => {
            debug!(path = %path.display(), "yt-dlp found");
            true
        }
        Err(_) => {
            warn!("yt-dlp not found on PATH; transcript and audio extraction will fail");
            false
        }
    }
}
