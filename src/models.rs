use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 600;
pub const DETAIL_MAX_TOKENS: u32 = 1600;

// Fusion API request format. Concepts are optional here so that a missing
// one is reported as a validation error instead of a body rejection.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct FusionRequest {
    #[serde(default)]
    pub a: Option<String>,
    #[serde(default)]
    pub b: Option<String>,
    #[serde(default)]
    pub context: FusionContext,
}

impl FusionRequest {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: Some(a.into()),
            b: Some(b.into()),
            context: FusionContext::default(),
        }
    }

    pub fn with_context(mut self, context: FusionContext) -> Self {
        self.context = context;
        self
    }
}

/// Options a caller may attach to a fusion request. Unknown keys are ignored.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FusionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    // Client-side deadline hint; not part of the wire format
    #[serde(skip)]
    pub timeout_ms: Option<u64>,
}

impl FusionContext {
    pub fn detail(&self) -> bool {
        self.detail.unwrap_or(false)
    }

    pub fn agent(&self) -> Agent {
        Agent::parse(self.agent.as_deref())
    }

    pub fn language(&self) -> Language {
        Language::parse(self.language.as_deref())
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(if self.detail() {
            DETAIL_MAX_TOKENS
        } else {
            DEFAULT_MAX_TOKENS
        })
    }

    /// Free-text prompt, trimmed; blank counts as absent.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Whether the caller asked for one of the rich output schemas.
    pub fn wants_structured(&self) -> bool {
        self.detail() || self.agent() == Agent::Pitch
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Zh,
    En,
}

impl Language {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "en" || s.starts_with("en-") => Language::En,
            _ => Language::Zh,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Agent {
    Fusion,
    Pitch,
}

impl Agent {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "pitch" => Agent::Pitch,
            _ => Agent::Fusion,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Agent::Fusion => "fusion",
            Agent::Pitch => "pitch",
        }
    }
}

// Chat-completion message roles
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// OpenAI-compatible chat-completion body, shared by both providers
#[derive(Serialize, Clone, Debug)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Milestone {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Kpi {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target: String,
}

/// Rich suggestion produced in detail or pitch mode.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSuggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_idea: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles_top5: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks_top5: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipeline: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selling_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contrarian_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub talk_tracks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<Milestone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kpis: Vec<Kpi>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Canonical suggestion as stored in the cache.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Suggestion {
    pub title: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<StructuredSuggestion>,
}

// Fusion API response format
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FusionResponse {
    pub title: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<StructuredSuggestion>,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub language: String,
}

impl FusionResponse {
    pub fn from_suggestion(
        suggestion: Suggestion,
        provider: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            title: suggestion.title,
            notes: suggestion.notes,
            structured: suggestion.structured,
            provider: provider.into(),
            language: language.as_str().to_string(),
        }
    }
}
