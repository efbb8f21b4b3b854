use anyhow::Context;
use patientpilot::auth::StaticTokenVerifier;
use patientpilot::config::AppConfig;
use patientpilot::store::MemoryStore;
use patientpilot::{app, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Process-wide handles, constructed exactly once
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        verifier: Arc::new(StaticTokenVerifier::new(config.auth_tokens.clone())),
    };

    let router = app(state, &config.api_prefix);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(
        "PatientPilot API running on http://0.0.0.0:{}{}",
        config.port,
        config.api_prefix
    );

    axum::serve(listener, router).await?;

    Ok(())
}
