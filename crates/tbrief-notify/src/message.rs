//! Message formatting for Telegram delivery.

use tbrief_models::Video;

/// Per-video summary notification.
pub fn video_summary_message(channel_name: &str, video: &Video, summary: &str) -> String {
    format!(
        "🔔 *새 영상 요약: {channel_name}*\n\n📌 *제목:* {title}\n⏱ *길이:* {duration}\n\n{summary}\n\n🔗 [영상 보기]({url})",
        title = video.title,
        duration = video.duration,
        url = video.watch_url(),
    )
}

/// Daily briefing notification.
pub fn briefing_message(date: &str, briefing: &str) -> String {
    format!("📅 *오늘의 AI 커스텀 브리핑 ({date})*\n\n{briefing}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbrief_models::{VideoId, VideoSource};

    fn video() -> Video {
        Video {
            id: VideoId::from("dQw4w9WgXcQ"),
            title: "AI 최신 동향 정리".to_string(),
            published_at: "2025-06-01T09:00:00+00:00".to_string(),
            has_caption: true,
            duration: "12:34".to_string(),
            source: VideoSource::Api,
            cached_at: None,
            is_short: false,
        }
    }

    #[test]
    fn test_video_summary_message_format() {
        let message = video_summary_message("테크 채널", &video(), "- 요약 내용입니다.");
        assert_eq!(
            message,
            "🔔 *새 영상 요약: 테크 채널*\n\n\
             📌 *제목:* AI 최신 동향 정리\n\
             ⏱ *길이:* 12:34\n\n\
             - 요약 내용입니다.\n\n\
             🔗 [영상 보기](https://www.youtube.com/watch?v=dQw4w9WgXcQ)"
        );
    }

    #[test]
    fn test_briefing_message_format() {
        let message = briefing_message("2025-06-01", "오늘의 브리핑 본문");
        assert_eq!(
            message,
            "📅 *오늘의 AI 커스텀 브리핑 (2025-06-01)*\n\n오늘의 브리핑 본문"
        );
    }
}
