use anyhow::Context;
use std::collections::HashMap;

/// Process configuration, read once during bootstrap.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Mount point for the API routes, without a trailing slash.
    pub api_prefix: String,
    /// Bearer-token table for the static verifier. Empty when no
    /// `AUTH_TOKENS` file is configured.
    pub auth_tokens: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("invalid PORT")?,
            Err(_) => 3000,
        };

        let api_prefix = std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string());
        let api_prefix = normalize_prefix(&api_prefix);

        // Token table file: a JSON object mapping bearer tokens to subject
        // ids. A configured-but-unreadable file fails startup outright.
        let auth_tokens = match std::env::var("AUTH_TOKENS") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read token table {path}"))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("invalid token table {path}"))?
            }
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            port,
            api_prefix,
            auth_tokens,
        })
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        "/api".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
