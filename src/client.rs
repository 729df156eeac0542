//! Caller-side suggestion path.
//!
//! Unlike the proxy service this never reports an error: network, status,
//! credential and parsing failures all end in the local-rule suggestion, so
//! the end user always gets something back.

use crate::config::DEFAULT_DEEPSEEK_BASE;
use crate::error::UpstreamError;
use crate::local::{LOCAL_PROVIDER, generate_local_suggestions};
use crate::models::{ChatCompletionRequest, FusionContext, FusionRequest, FusionResponse};
use crate::normalize::{extract_content, normalize};
use crate::prompt::build_messages;
use crate::provider::{CHAT_COMPLETIONS_PATH, Endpoint, Provider, send_chat};
use std::time::Duration;

pub const MIN_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const BACKEND_PROVIDER: &str = "api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMode {
    /// Go through a fusion gateway
    Backend { url: String },
    /// Call the primary provider with a caller-held key
    Direct { api_key: String, base_url: String },
    Local,
}

impl ClientMode {
    /// A backend URL wins over a direct key; with neither, local rules only.
    pub fn select(backend: Option<&str>, api_key: Option<&str>, base_url: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        if let Some(url) = present(backend) {
            return ClientMode::Backend { url };
        }
        match present(api_key) {
            Some(api_key) => ClientMode::Direct {
                api_key,
                base_url: present(base_url).unwrap_or_else(|| DEFAULT_DEEPSEEK_BASE.to_string()),
            },
            None => ClientMode::Local,
        }
    }
}

/// Deadline for one caller-side request: the hint, floored at 8s.
pub fn request_timeout(context: &FusionContext) -> Duration {
    context
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT)
        .max(MIN_TIMEOUT)
}

pub struct SuggestionClient {
    http: reqwest::Client,
    mode: ClientMode,
}

impl SuggestionClient {
    pub fn new(mode: ClientMode) -> Self {
        Self {
            http: reqwest::Client::new(),
            mode,
        }
    }

    pub async fn suggest(&self, a: &str, b: &str, context: &FusionContext) -> FusionResponse {
        let local = || {
            FusionResponse::from_suggestion(
                generate_local_suggestions(a, b),
                LOCAL_PROVIDER,
                context.language(),
            )
        };

        let wants_local = context
            .model
            .as_deref()
            .is_some_and(|m| m.trim().eq_ignore_ascii_case("local"));
        if wants_local {
            return local();
        }

        let result = match &self.mode {
            ClientMode::Backend { url } => self.via_backend(url, a, b, context).await,
            ClientMode::Direct { api_key, base_url } => {
                self.via_provider(api_key, base_url, a, b, context).await
            }
            ClientMode::Local => return local(),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "suggestion call failed, using local rules");
            local()
        })
    }

    async fn via_backend(
        &self,
        url: &str,
        a: &str,
        b: &str,
        context: &FusionContext,
    ) -> Result<FusionResponse, UpstreamError> {
        let body = FusionRequest::new(a, b).with_context(context.clone());

        let res = self
            .http
            .post(format!("{}/api/fuse/suggest", url.trim_end_matches('/')))
            .json(&body)
            .timeout(request_timeout(context))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: res.text().await.unwrap_or_default().chars().take(200).collect(),
            });
        }

        let mut response: FusionResponse = res
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        if response.provider.is_empty() {
            response.provider = BACKEND_PROVIDER.to_string();
        }
        Ok(response)
    }

    async fn via_provider(
        &self,
        api_key: &str,
        base_url: &str,
        a: &str,
        b: &str,
        context: &FusionContext,
    ) -> Result<FusionResponse, UpstreamError> {
        let provider = Provider::DeepSeek;
        let model = context
            .model
            .as_deref()
            .map(|m| m.trim().trim_start_matches("deepseek:"))
            .filter(|m| !m.is_empty())
            .unwrap_or(provider.default_model());
        let endpoint = Endpoint {
            provider,
            model: model.to_string(),
            url: format!("{}{}", base_url.trim_end_matches('/'), CHAT_COMPLETIONS_PATH),
            auth_header: format!("Bearer {api_key}"),
        };
        let body = ChatCompletionRequest {
            model: endpoint.model.clone(),
            messages: build_messages(a, b, context),
            temperature: context.temperature(),
            max_tokens: context.max_tokens(),
            stream: false,
        };

        let reply = send_chat(&self.http, &endpoint, &body, request_timeout(context)).await?;
        let content = extract_content(&reply);
        if content.trim().is_empty() {
            return Err(UpstreamError::Decode("empty model reply".to_string()));
        }

        let mut suggestion = normalize(&content, a, b, context.language());
        if !context.wants_structured() {
            suggestion.structured = None;
        }
        Ok(FusionResponse::from_suggestion(
            suggestion,
            provider.name(),
            context.language(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selection_order() {
        assert_eq!(
            ClientMode::select(Some("http://gw"), Some("sk"), None),
            ClientMode::Backend { url: "http://gw".into() }
        );
        assert_eq!(
            ClientMode::select(Some(" "), Some("sk"), None),
            ClientMode::Direct {
                api_key: "sk".into(),
                base_url: DEFAULT_DEEPSEEK_BASE.into()
            }
        );
        assert_eq!(ClientMode::select(None, None, None), ClientMode::Local);
    }

    #[test]
    fn timeout_has_a_floor() {
        let mut ctx = FusionContext::default();
        assert_eq!(request_timeout(&ctx), Duration::from_secs(15));
        ctx.timeout_ms = Some(1_000);
        assert_eq!(request_timeout(&ctx), Duration::from_secs(8));
        ctx.timeout_ms = Some(20_000);
        assert_eq!(request_timeout(&ctx), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn local_mode_and_local_model_skip_the_network() {
        let client = SuggestionClient::new(ClientMode::Local);
        let res = client.suggest("A", "B", &FusionContext::default()).await;
        assert_eq!(res.provider, "local");
        assert_eq!(res.title, "A × B");

        // unroutable backend; the local model must short-circuit before it
        let client = SuggestionClient::new(ClientMode::Backend {
            url: "http://127.0.0.1:9".into(),
        });
        let ctx = FusionContext {
            model: Some("LOCAL".into()),
            ..Default::default()
        };
        let res = client.suggest("A", "B", &ctx).await;
        assert_eq!(res.provider, "local");
    }
}
