//! Bearer-token authentication. The identity service itself stays external:
//! handlers only see the `TokenVerifier` seam and the typed `ProviderContext`
//! the middleware binds into the request.

use crate::handlers::ApiError;
use crate::AppState;
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token rejected by identity service")]
    InvalidToken,
    #[error("identity service failure: {0}")]
    Unavailable(String),
}

/// Verifies an identity-service token and yields the stable subject id the
/// provider record is keyed by.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// Request-scoped context carrying the verified subject id. Every patient
/// and provider-profile operation is scoped to this id; there is no other
/// authorization model.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub provider_id: String,
}

/// Fixed token-to-subject table, loaded from configuration. Used for local
/// development and tests; a deployment verifying tokens against the managed
/// identity service implements the same trait.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Middleware guarding every protected route. Rejects with 401 unless the
/// request carries a verifiable `Authorization: Bearer <token>` header, then
/// binds the subject id for the handlers downstream.
pub async fn require_provider(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Some(token) = header_value.and_then(|value| value.strip_prefix("Bearer ")) else {
        return Err(ApiError::Unauthenticated(
            "No valid authorization token provided".into(),
        ));
    };

    match state.verifier.verify(token).await {
        Ok(provider_id) => {
            request
                .extensions_mut()
                .insert(ProviderContext { provider_id });
            Ok(next.run(request).await)
        }
        Err(err) => {
            // Verification detail stays in the logs, never in the response.
            tracing::warn!("authentication failed: {err}");
            Err(ApiError::Unauthenticated(
                "Invalid authentication token".into(),
            ))
        }
    }
}
