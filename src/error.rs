use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure of a single upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream body could not be decoded: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::Transport(e) => e.status().map(|s| s.as_u16()),
            UpstreamError::Decode(_) => None,
        }
    }
}

/// Errors surfaced by the fusion endpoint.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("{0}")]
    Validation(String),

    #[error("Server missing {env_var}")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Proxy failed: {provider} upstream unavailable ({source})")]
    Upstream {
        provider: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error("Rate limit exceeded. Try again later.")]
    RateLimited,
}

impl FusionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FusionError::Validation(_) => StatusCode::BAD_REQUEST,
            FusionError::MissingCredential { .. } | FusionError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            FusionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for FusionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "fusion request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            FusionError::Validation("Missing a/b".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FusionError::MissingCredential {
                provider: "ali",
                env_var: "ALI_API_KEY"
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            FusionError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let err = FusionError::MissingCredential {
            provider: "deepseek",
            env_var: "DEEPSEEK_API_KEY",
        };
        assert_eq!(err.to_string(), "Server missing DEEPSEEK_API_KEY");
    }
}
