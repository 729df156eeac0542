mod health;
mod metrics;
mod score;
mod suggest;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use score::score_handler;
pub use suggest::suggest_handler;
