use clap::Parser; // for cli
use fusion_gateway::client::{ClientMode, SuggestionClient};
use fusion_gateway::config::{Args, Command, FuseArgs, ProviderConfig};
use fusion_gateway::local::{build_media_captions, parse_suggestions};
use fusion_gateway::models::FusionContext;
use fusion_gateway::provider::{Provider, ProviderRouter};
use fusion_gateway::rate_limit::RateLimiter;
use fusion_gateway::{AppState, FusionService, create_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fusion_gateway=info,tower_http=info")),
        )
        .init();

    // parse cli arguments
    let args = Args::parse();

    match args.command {
        Some(Command::Fuse(fuse)) => run_fuse(&args.providers, fuse).await,
        None => serve(args).await,
    }
}

async fn serve(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let service = FusionService::from_config(&args.providers, &args.server);
    warn_missing_credentials(service.router());

    let rate_limiter = RateLimiter::new(args.server.rate_limit, args.server.rate_window());
    let state = Arc::new(
        AppState::new(service, rate_limiter).with_trusted_proxy(args.server.trust_proxy),
    );
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", args.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Fusion gateway running on http://localhost:{}", args.server.port);
    tracing::info!(
        capacity = args.server.cache_capacity,
        ttl_secs = args.server.cache_ttl,
        "suggestion cache configured"
    );
    tracing::info!(
        max_retries = args.server.max_retries,
        step_ms = args.server.retry_delay_ms,
        timeout_secs = args.server.upstream_timeout,
        "upstream retry policy"
    );
    if args.server.rate_limit > 0 {
        tracing::info!(
            "Rate limit: {} requests per {} seconds",
            args.server.rate_limit,
            args.server.rate_window
        );
        if args.server.trust_proxy {
            tracing::info!("Rate limit keyed on x-forwarded-for");
        }
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

// A missing key only fails requests routed to that provider
fn warn_missing_credentials(router: &ProviderRouter) {
    for provider in [Provider::DeepSeek, Provider::Ali] {
        if !router.has_credential(provider) {
            tracing::warn!(
                "{} is not set. Requests routed to {} will be rejected.",
                provider.credential_var(),
                provider.name()
            );
        }
    }
}

async fn run_fuse(
    providers: &ProviderConfig,
    fuse: FuseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = ClientMode::select(
        fuse.backend.as_deref(),
        providers.deepseek_api_key.as_deref(),
        Some(providers.deepseek_base.as_str()),
    );
    let client = SuggestionClient::new(mode);

    let context = FusionContext {
        model: fuse.model,
        prompt: fuse.prompt,
        detail: Some(fuse.detail),
        agent: fuse.agent,
        language: fuse.language,
        timeout_ms: fuse.timeout_ms,
        ..Default::default()
    };
    let response = client.suggest(&fuse.a, &fuse.b, &context).await;

    println!("{}  [{}]", response.title, response.provider);
    for line in parse_suggestions(&response.notes) {
        if line.kind.is_empty() {
            println!("  - {}", line.content);
        } else {
            println!("  - [{}] {}", line.kind, line.content);
        }
    }
    if let Some(structured) = &response.structured {
        let captions = build_media_captions(structured);
        println!("{}", serde_json::to_string_pretty(structured)?);
        for caption in captions.image_captions.iter().chain(&captions.video_captions) {
            println!("  * {caption}");
        }
    }
    Ok(())
}
