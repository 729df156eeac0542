use crate::rate_limit::RateLimiter;
use crate::service::FusionService;

// app's shared state
pub struct AppState {
    pub service: FusionService,
    pub rate_limiter: RateLimiter,
    // Take the rate-limit key from x-forwarded-for
    pub trust_forwarded: bool,
}

impl AppState {
    pub fn new(service: FusionService, rate_limiter: RateLimiter) -> Self {
        Self {
            service,
            rate_limiter,
            trust_forwarded: false,
        }
    }

    pub fn with_trusted_proxy(mut self, trust_forwarded: bool) -> Self {
        self.trust_forwarded = trust_forwarded;
        self
    }
}
