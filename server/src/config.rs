use anyhow::{Result, anyhow};
use products_talent::published_doc::DEFAULT_PUBLIC_CV_BASE_URL;

const DEV_CV_TOKEN_SECRET: &str = "dev-secret";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    pub public_cv_base_url: String,
    pub cv_token_secret: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:4200".into()),
        );

        let public_cv_base_url = std::env::var("PUBLIC_CV_BASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_PUBLIC_CV_BASE_URL.into());

        let allow_dev_secret = env_bool("ALLOW_DEV_SECRET", cfg!(debug_assertions));
        let cv_token_secret = match std::env::var("CV_TOKEN_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if allow_dev_secret => {
                tracing::warn!("CV_TOKEN_SECRET not set; public CV links use a development secret");
                DEV_CV_TOKEN_SECRET.into()
            }
            _ => return Err(anyhow!("CV_TOKEN_SECRET missing")),
        };

        Ok(Self {
            cors_allowed_origins,
            public_cv_base_url,
            cv_token_secret,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn env_bool(var: &str, default: bool) -> bool {
    std::env::var(var)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}
