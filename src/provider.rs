use crate::config::{DEFAULT_ALI_COMPAT_BASE, DEFAULT_DEEPSEEK_BASE, ProviderConfig};
use crate::error::{FusionError, UpstreamError};
use crate::models::{ChatCompletionRequest, FusionContext};
use serde_json::Value;
use std::time::Duration;

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

// Upstream language-model vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    DeepSeek,
    Ali,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek",
            Provider::Ali => "ali",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Some(Provider::DeepSeek),
            "ali" | "dashscope" => Some(Provider::Ali),
            _ => None,
        }
    }

    /// Tag reported to callers for results this provider produced.
    pub fn proxy_tag(&self) -> String {
        format!("{}-proxy", self.name())
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek-chat",
            Provider::Ali => "qwen-turbo",
        }
    }

    pub fn credential_var(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
            Provider::Ali => "ALI_API_KEY",
        }
    }

    fn prefix(&self) -> String {
        format!("{}:", self.name())
    }
}

/// Provider and bare model id picked for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub provider: Provider,
    pub model: String,
}

/// Everything needed to call a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub provider: Provider,
    pub model: String,
    pub url: String,
    pub auth_header: String,
}

struct ProviderSlot {
    base_url: String,
    api_key: Option<String>,
}

impl ProviderSlot {
    fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        }
    }
}

pub struct ProviderRouter {
    deepseek: ProviderSlot,
    ali: ProviderSlot,
}

impl ProviderRouter {
    pub fn new(config: &ProviderConfig) -> Self {
        let base = |url: &str, default: &'static str| {
            if url.trim().is_empty() {
                default.to_string()
            } else {
                url.to_string()
            }
        };
        Self {
            deepseek: ProviderSlot::new(
                &base(&config.deepseek_base, DEFAULT_DEEPSEEK_BASE),
                config.deepseek_api_key.as_deref(),
            ),
            ali: ProviderSlot::new(
                &base(&config.ali_compat_base, DEFAULT_ALI_COMPAT_BASE),
                config.ali_api_key.as_deref(),
            ),
        }
    }

    fn slot(&self, provider: Provider) -> &ProviderSlot {
        match provider {
            Provider::DeepSeek => &self.deepseek,
            Provider::Ali => &self.ali,
        }
    }

    pub fn has_credential(&self, provider: Provider) -> bool {
        self.slot(provider).api_key.is_some()
    }

    /// Pick provider and model: explicit provider first, then a model
    /// prefix such as `ali:`, then the primary provider.
    fn route(&self, context: &FusionContext) -> Result<Route, FusionError> {
        let explicit = match context.provider.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(Provider::parse(raw).ok_or_else(|| {
                FusionError::Validation(format!("Unsupported provider: {raw}"))
            })?),
            _ => None,
        };

        let model = context.model.as_deref().map(str::trim).unwrap_or_default();
        let prefixed = [Provider::Ali, Provider::DeepSeek]
            .into_iter()
            .find_map(|p| model.strip_prefix(p.prefix().as_str()).map(|rest| (p, rest.trim())));

        let (provider, model) = match (explicit, prefixed) {
            (Some(provider), Some((_, rest))) => (provider, rest),
            (Some(provider), None) => (provider, model),
            (None, Some((provider, rest))) => (provider, rest),
            (None, None) => (Provider::DeepSeek, model),
        };

        let model = if model.is_empty() {
            provider.default_model().to_string()
        } else {
            model.to_string()
        };
        Ok(Route { provider, model })
    }

    // Credentials are checked here, per request, so one missing key only
    // affects requests routed to that provider.
    fn endpoint(&self, route: &Route) -> Result<Endpoint, FusionError> {
        let slot = self.slot(route.provider);
        let key = slot.api_key.as_deref().ok_or(FusionError::MissingCredential {
            provider: route.provider.name(),
            env_var: route.provider.credential_var(),
        })?;
        Ok(Endpoint {
            provider: route.provider,
            model: route.model.clone(),
            url: format!("{}{}", slot.base_url, CHAT_COMPLETIONS_PATH),
            auth_header: format!("Bearer {key}"),
        })
    }

    /// Provider, bare model, URL and auth header for one request.
    pub fn resolve(&self, context: &FusionContext) -> Result<Endpoint, FusionError> {
        self.endpoint(&self.route(context)?)
    }
}

/// One chat-completion call. Non-success statuses become errors so the
/// retry executor treats them like transport failures.
pub async fn send_chat(
    client: &reqwest::Client,
    endpoint: &Endpoint,
    body: &ChatCompletionRequest,
    timeout: Duration,
) -> Result<Value, UpstreamError> {
    let res = client
        .post(&endpoint.url)
        .header(reqwest::header::AUTHORIZATION, &endpoint.auth_header)
        .json(body)
        .timeout(timeout)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    res.json::<Value>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}
