//! Prompt builders for the summarization pipeline.
//!
//! All prompts ask for Korean output. The transcript prompt instructs
//! the model to answer in natural language even when the transcript is
//! unusable, so callers must screen responses with
//! [`is_invalid_summary`] rather than rely on errors alone.

use tbrief_models::SummaryRecord;

/// Phrases that mark a model response as "no usable transcript".
pub const INVALID_SUMMARY_MARKERS: [&str; 5] = [
    "자막을 찾을 수 없거나",
    "자막 추출 오류",
    "자막이 없습니다",
    "transcript not available",
    "no transcript",
];

/// True if the model reported a missing or broken transcript instead
/// of a summary.
pub fn is_invalid_summary(text: &str) -> bool {
    let lowered = text.to_lowercase();
    INVALID_SUMMARY_MARKERS
        .iter()
        .any(|marker| lowered.contains(&marker.to_lowercase()))
}

fn keyword_text(tags: &[String], fallback: &str) -> String {
    if tags.is_empty() {
        fallback.to_string()
    } else {
        tags.join(", ")
    }
}

/// Prompt for summarizing a video transcript.
pub fn video_summary_prompt(tags: &[String], transcript: &str) -> String {
    let keywords = keyword_text(tags, "일반");
    format!(
        "다음은 YouTube 영상의 자막입니다. \"{keywords}\"에 관심이 있는 사람을 위해 핵심 내용을 3-5줄로 요약해주세요.\n\n자막:\n{transcript}\n\n요약 (3-5줄, 핵심만):"
    )
}

/// Prompt for summarizing an attached audio track.
pub fn audio_summary_prompt(tags: &[String]) -> String {
    let keywords = keyword_text(tags, "일반");
    format!(
        "이 오디오는 YouTube 영상의 내용입니다. \"{keywords}\"에 관심이 있는 사람을 위해 핵심 내용을 3-5줄로 요약해주세요.\n\n요약 (3-5줄, 핵심만):"
    )
}

/// Prompt for the daily briefing over a day's summaries.
pub fn briefing_prompt(tags: &[String], summaries: &[SummaryRecord]) -> String {
    let keywords = keyword_text(tags, "전체");
    let sources = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}] {} ({})\n{}", i + 1, s.title, s.channel_name, s.summary))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "다음은 오늘 수집된 YouTube 영상 요약들입니다. \"{keywords}\" 주제를 중심으로 오늘의 트렌드와 주요 이슈를 통합 브리핑해주세요.\n\n영상 요약들:\n{sources}\n\n통합 브리핑 (최대 1000자):\n1. 주요 트렌드 (1줄)\n2. 이슈별 상세 내용 (각 영상 번호 참조)\n3. 시사점 및 인사이트 (1줄)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbrief_models::VideoId;

    #[test]
    fn test_invalid_summary_detection() {
        assert!(is_invalid_summary("자막을 찾을 수 없거나 접근이 제한되어 있습니다."));
        assert!(is_invalid_summary("Sorry, the TRANSCRIPT NOT AVAILABLE for this video."));
        assert!(!is_invalid_summary("- 이 영상은 AI 트렌드를 다룹니다."));
    }

    #[test]
    fn test_video_prompt_mentions_tags_or_default() {
        let tagged = video_summary_prompt(&["뉴스".to_string(), "기술".to_string()], "내용");
        assert!(tagged.contains("\"뉴스, 기술\""));
        assert!(tagged.contains("내용"));

        let untagged = video_summary_prompt(&[], "내용");
        assert!(untagged.contains("\"일반\""));
    }

    #[test]
    fn test_briefing_prompt_numbers_sources() {
        let summaries = vec![
            SummaryRecord::new(VideoId::from("v1"), "AI 뉴스", "채널A", "첫 번째 요약", vec![]),
            SummaryRecord::new(VideoId::from("v2"), "반도체 동향", "채널B", "두 번째 요약", vec![]),
        ];
        let prompt = briefing_prompt(&["기술".to_string()], &summaries);
        assert!(prompt.contains("[1] AI 뉴스 (채널A)\n첫 번째 요약"));
        assert!(prompt.contains("[2] 반도체 동향 (채널B)\n두 번째 요약"));
        assert!(prompt.contains("\"기술\""));
    }
}
