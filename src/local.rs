//! Deterministic suggestions built from string interpolation alone, used
//! whenever no model answer is available.

use crate::models::{StructuredSuggestion, Suggestion};
use crate::normalize::fallback_title;
use serde::Serialize;

pub const LOCAL_PROVIDER: &str = "local";

pub fn generate_local_suggestions(a: &str, b: &str) -> Suggestion {
    let notes = [
        format!("核心卖点：用\"{a}\"的方法解决\"{b}\"里的老问题。"),
        format!("反共识尝试：把\"{b}\"的用户旅程搬进\"{a}\"的分发渠道。"),
        format!("最小验证：做一个一天可交付的Demo，验证{a}∩{b}的真实点击/转化率。"),
        "角色定位：谁是买单人？谁是使用者？谁会反对？提前准备三句反驳话术。".to_string(),
    ]
    .join("\n");

    Suggestion {
        title: fallback_title(a, b),
        notes,
        structured: None,
    }
}

/// One note line split into its label and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionLine {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

pub fn parse_suggestions(notes: &str) -> Vec<SuggestionLine> {
    notes
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            let (kind, content) = match split_label(line) {
                Some((kind, content)) => (kind.to_string(), content.to_string()),
                None => (String::new(), line.to_string()),
            };
            SuggestionLine {
                id: format!("suggestion-{index}"),
                kind,
                content,
            }
        })
        .collect()
}

// Label is everything before the first `：` past the first character; both
// sides must be non-empty.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let (at, colon) = line.char_indices().skip(1).find(|&(_, c)| c == '：')?;
    let content = &line[at + colon.len_utf8()..];
    (!content.is_empty()).then(|| (&line[..at], content))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCaptions {
    pub image_captions: Vec<String>,
    pub video_captions: Vec<String>,
}

/// Placeholder captions for the image and video tabs of a detailed plan.
pub fn build_media_captions(structured: &StructuredSuggestion) -> MediaCaptions {
    let title = structured.title.as_deref().unwrap_or_default();
    let one_sentence = structured.one_sentence.as_deref().unwrap_or_default();
    let selling = structured
        .selling_points
        .iter()
        .take(2)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("、");
    let assets = structured
        .assets
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" / ");

    let image_captions = vec![
        format!("KV主视觉：{title}｜{one_sentence}"),
        format!("卖点组合：{}", if selling.is_empty() { title } else { selling.as_str() }),
        format!("应用场景拼图：{assets}"),
    ];
    let video_captions = vec![
        match structured.hooks_top5.first() {
            Some(hook) => format!("15秒视频：{hook}"),
            None => format!("15秒视频：{title}"),
        },
        match structured.hooks_top5.get(1) {
            Some(hook) => format!("30秒视频：{hook}"),
            None => "30秒视频：从问题到解决".to_string(),
        },
    ];

    MediaCaptions {
        image_captions,
        video_captions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_suggestion_is_deterministic() {
        for (a, b) in [("A", "B"), ("环保包装", "科技感"), ("x y", "z")] {
            let s = generate_local_suggestions(a, b);
            assert_eq!(s.title, format!("{a} × {b}"));
            assert!(!s.notes.is_empty());
            assert!(s.notes.contains(a));
            assert!(s.notes.contains(b));
            assert_eq!(s.notes.lines().count(), 4);
            assert_eq!(s, generate_local_suggestions(a, b));
        }
    }

    #[test]
    fn parses_labelled_lines() {
        let lines = parse_suggestions("卖点：便宜\n\n  \nplain line\n：no label");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].id, "suggestion-0");
        assert_eq!(lines[0].kind, "卖点");
        assert_eq!(lines[0].content, "便宜");
        assert_eq!(lines[1].kind, "");
        assert_eq!(lines[1].content, "plain line");
        assert_eq!(lines[2].id, "suggestion-2");
        assert_eq!(lines[2].kind, "");
    }

    #[test]
    fn leading_colon_belongs_to_the_label() {
        let lines = parse_suggestions("：a：b
话术：
话术：：再来");
        assert_eq!(lines[0].kind, "：a");
        assert_eq!(lines[0].content, "b");
        assert_eq!(lines[1].kind, "");
        assert_eq!(lines[1].content, "话术：");
        assert_eq!(lines[2].kind, "话术");
        assert_eq!(lines[2].content, "：再来");
    }

    #[test]
    fn captions_use_structured_fields() {
        let structured = StructuredSuggestion {
            title: Some("绿色科技".into()),
            one_sentence: Some("一句话".into()),
            selling_points: vec!["a".into(), "b".into(), "c".into()],
            hooks_top5: vec!["钩子1".into()],
            assets: vec!["海报".into(), "视频".into()],
            ..Default::default()
        };
        let captions = build_media_captions(&structured);
        assert_eq!(captions.image_captions[0], "KV主视觉：绿色科技｜一句话");
        assert_eq!(captions.image_captions[1], "卖点组合：a、b");
        assert_eq!(captions.image_captions[2], "应用场景拼图：海报 / 视频");
        assert_eq!(captions.video_captions[0], "15秒视频：钩子1");
        assert_eq!(captions.video_captions[1], "30秒视频：从问题到解决");
    }

    #[test]
    fn captions_fall_back_to_title() {
        let structured = StructuredSuggestion {
            title: Some("T".into()),
            ..Default::default()
        };
        let captions = build_media_captions(&structured);
        assert_eq!(captions.image_captions[1], "卖点组合：T");
        assert_eq!(captions.video_captions[0], "15秒视频：T");
    }
}
