use crate::cache::{CacheStore, make_cache_key};
use crate::config::{ProviderConfig, ServerConfig};
use crate::error::FusionError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE, UPSTREAM_FAILURES};
use crate::models::{ChatCompletionRequest, FusionContext, FusionRequest, FusionResponse, Suggestion};
use crate::normalize::{extract_content, normalize};
use crate::prompt::build_messages;
use crate::provider::{Endpoint, ProviderRouter, send_chat};
use crate::retry::RetryExecutor;
use std::sync::Arc;
use std::time::Duration;

pub const CACHE_PROVIDER: &str = "proxy-cache";

/// Cache check, prompt build, provider dispatch with retry, normalization
/// and cache write for one fusion request.
pub struct FusionService {
    cache: Arc<CacheStore<Suggestion>>,
    router: ProviderRouter,
    retry: RetryExecutor,
    client: reqwest::Client,
    upstream_timeout: Duration,
}

impl FusionService {
    pub fn new(
        cache: Arc<CacheStore<Suggestion>>,
        router: ProviderRouter,
        retry: RetryExecutor,
        client: reqwest::Client,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            router,
            retry,
            client,
            upstream_timeout,
        }
    }

    pub fn from_config(providers: &ProviderConfig, server: &ServerConfig) -> Self {
        Self::new(
            Arc::new(CacheStore::new(server.cache_capacity, server.cache_ttl())),
            ProviderRouter::new(providers),
            RetryExecutor::new(server.max_retries, server.retry_delay()),
            reqwest::Client::new(),
            server.upstream_timeout(),
        )
    }

    pub fn cache(&self) -> &CacheStore<Suggestion> {
        &self.cache
    }

    pub fn router(&self) -> &ProviderRouter {
        &self.router
    }

    pub async fn suggest(&self, request: FusionRequest) -> Result<FusionResponse, FusionError> {
        let (a, b) = validate(&request)?;
        let context = &request.context;
        let language = context.language();
        let endpoint = self.router.resolve(context)?;
        let cache_key = request_key(a, b, &endpoint, context);

        if let Some(hit) = self.cache.get(&cache_key) {
            CACHE_HITS.inc();
            tracing::debug!(a, b, "cache hit");
            return Ok(FusionResponse::from_suggestion(hit, CACHE_PROVIDER, language));
        }
        CACHE_MISSES.inc();
        // a miss may be a lazily expired entry that was just dropped
        CACHE_SIZE.set(self.cache.len() as f64);

        let body = ChatCompletionRequest {
            model: endpoint.model.clone(),
            messages: build_messages(a, b, context),
            temperature: context.temperature(),
            max_tokens: context.max_tokens(),
            stream: false,
        };
        tracing::info!(
            provider = endpoint.provider.name(),
            model = %endpoint.model,
            "dispatching fusion request"
        );

        let reply = self
            .retry
            .execute(|_| send_chat(&self.client, &endpoint, &body, self.upstream_timeout))
            .await
            .map_err(|source| {
                UPSTREAM_FAILURES.inc();
                FusionError::Upstream {
                    provider: endpoint.provider.name(),
                    source,
                }
            })?;

        let mut suggestion = normalize(&extract_content(&reply), a, b, language);
        if !context.wants_structured() {
            suggestion.structured = None;
        }

        self.cache.set(cache_key, suggestion.clone());
        CACHE_SIZE.set(self.cache.len() as f64);

        Ok(FusionResponse::from_suggestion(
            suggestion,
            endpoint.provider.proxy_tag(),
            language,
        ))
    }
}

fn validate(request: &FusionRequest) -> Result<(&str, &str), FusionError> {
    fn concept(c: &Option<String>) -> Option<&str> {
        c.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
    match (concept(&request.a), concept(&request.b)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(FusionError::Validation("Missing a/b".to_string())),
    }
}

/// Cache key over both concepts and the effective context, so requests that
/// only differ in spelled-out defaults or field order share an entry.
pub fn request_key(a: &str, b: &str, endpoint: &Endpoint, context: &FusionContext) -> String {
    make_cache_key([
        ("a", a.to_string()),
        ("b", b.to_string()),
        ("provider", endpoint.provider.name().to_string()),
        ("model", endpoint.model.clone()),
        ("prompt", context.prompt().unwrap_or_default().to_string()),
        ("temperature", context.temperature().to_string()),
        ("maxTokens", context.max_tokens().to_string()),
        ("detail", context.detail().to_string()),
        ("agent", context.agent().as_str().to_string()),
        ("language", context.language().as_str().to_string()),
    ])
}
