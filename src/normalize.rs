//! Turning a model reply into a [`Suggestion`].
//!
//! Models do not reliably honour the strict-JSON instruction: replies arrive
//! wrapped in prose or code fences, with trailing commas or smart quotes.
//! Nothing here fails; unusable output degrades to raw-text notes.

use crate::models::{Kpi, Language, Milestone, StructuredSuggestion, Suggestion};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z]*\s*([\s\S]*?)```").expect("fence pattern"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern"));

const KNOWN_FIELDS: &[&str] = &[
    "title",
    "oneSentence",
    "bigIdea",
    "titlesTop5",
    "hooksTop5",
    "pipeline",
    "assets",
    "sellingPoints",
    "contrarianPoints",
    "talkTracks",
    "mvp",
    "milestones",
    "kpis",
    "notes",
];

/// Inner content of the first fenced block, or the trimmed text.
pub fn strip_code_fences(text: &str) -> &str {
    match FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Recover a JSON object from noisy model output.
pub fn try_recover_json(text: &str) -> Option<Map<String, Value>> {
    let content = strip_code_fences(text);
    if let Ok(Value::Object(map)) = serde_json::from_str(content) {
        return Some(map);
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    let body = TRAILING_COMMA.replace_all(&content[start..=end], "$1");
    let body = body.replace(['\u{201c}', '\u{201d}'], "\"");
    match serde_json::from_str(&body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn pair_field<T>(map: &Map<String, Value>, key: &str, make: impl Fn(String, String) -> T, second: &str) -> Vec<T> {
    let Some(Value::Array(items)) = map.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => {
                let name = text_field(obj, "name").unwrap_or_default();
                let other = text_field(obj, second).unwrap_or_default();
                (!name.is_empty() || !other.is_empty()).then(|| make(name, other))
            }
            Value::String(s) if !s.trim().is_empty() => Some(make(s.trim().to_string(), String::new())),
            _ => None,
        })
        .collect()
}

/// Map a recovered object onto the structured schema, if it looks like one.
pub fn to_structured(map: &Map<String, Value>) -> Option<StructuredSuggestion> {
    if !KNOWN_FIELDS.iter().any(|f| map.contains_key(*f)) {
        return None;
    }
    Some(StructuredSuggestion {
        title: text_field(map, "title"),
        one_sentence: text_field(map, "oneSentence"),
        big_idea: text_field(map, "bigIdea"),
        titles_top5: list_field(map, "titlesTop5"),
        hooks_top5: list_field(map, "hooksTop5"),
        pipeline: list_field(map, "pipeline"),
        assets: list_field(map, "assets"),
        selling_points: list_field(map, "sellingPoints"),
        contrarian_points: list_field(map, "contrarianPoints"),
        talk_tracks: list_field(map, "talkTracks"),
        mvp: text_field(map, "mvp"),
        milestones: pair_field(map, "milestones", |name, desc| Milestone { name, desc }, "desc"),
        kpis: pair_field(map, "kpis", |name, target| Kpi { name, target }, "target"),
        notes: list_field(map, "notes"),
    })
}

struct NotePrefixes {
    selling: &'static str,
    contrarian: &'static str,
    talk: &'static str,
    mvp: &'static str,
}

fn prefixes(language: Language) -> NotePrefixes {
    match language {
        Language::Zh => NotePrefixes {
            selling: "卖点：",
            contrarian: "反共识：",
            talk: "话术：",
            mvp: "MVP：",
        },
        Language::En => NotePrefixes {
            selling: "Selling point: ",
            contrarian: "Contrarian: ",
            talk: "Talk track: ",
            mvp: "MVP: ",
        },
    }
}

/// Flat note lines: explicit notes win, otherwise synthesized from the
/// selling, contrarian, talk-track and MVP fields.
pub fn flatten_notes(structured: &StructuredSuggestion, language: Language) -> String {
    if !structured.notes.is_empty() {
        return structured.notes.join("\n");
    }
    let p = prefixes(language);
    let mut lines = Vec::new();
    lines.extend(structured.selling_points.iter().map(|s| format!("{}{s}", p.selling)));
    lines.extend(structured.contrarian_points.iter().map(|s| format!("{}{s}", p.contrarian)));
    lines.extend(structured.talk_tracks.iter().map(|s| format!("{}{s}", p.talk)));
    if let Some(mvp) = &structured.mvp {
        lines.push(format!("{}{mvp}", p.mvp));
    }
    lines.join("\n")
}

pub fn fallback_title(a: &str, b: &str) -> String {
    format!("{a} × {b}")
}

/// Normalize a raw model reply for the concepts `a` and `b`.
pub fn normalize(raw: &str, a: &str, b: &str, language: Language) -> Suggestion {
    let fallback = fallback_title(a, b);

    if let Some(structured) = try_recover_json(raw).as_ref().and_then(to_structured) {
        let notes = flatten_notes(&structured, language);
        return Suggestion {
            title: structured.title.clone().unwrap_or_else(|| fallback.clone()),
            notes: if notes.is_empty() { fallback } else { notes },
            structured: Some(structured),
        };
    }

    tracing::debug!("model reply is not structured, keeping raw text");
    let raw = raw.trim();
    Suggestion {
        title: fallback.clone(),
        notes: if raw.is_empty() { fallback } else { raw.to_string() },
        structured: None,
    }
}

/// Reply text from a chat-completion body.
///
/// Accepts the OpenAI-compatible shape (`choices[0].message.content`, either
/// a string or a list of `{text}` parts) and DashScope's native
/// `output.text` / `output.choices` shape.
pub fn extract_content(body: &Value) -> String {
    let candidates = [
        body.pointer("/choices/0/message/content"),
        body.pointer("/output/choices/0/message/content"),
        body.pointer("/output/text"),
        body.pointer("/choices/0/text"),
    ];
    candidates
        .into_iter()
        .flatten()
        .map(content_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn content_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(s) => Some(s.as_str()),
                other => other.get("text").and_then(Value::as_str),
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}
