use serde::Deserialize;

/// Shopify Admin API version used for every customer request.
pub const SHOPIFY_API_VERSION: &str = "2024-10";

/// Route the signup form posts to when `SUBMISSION_PATH` is not set.
pub const DEFAULT_SUBMISSION_PATH: &str = "/api/create-wholesale-customer";

/// Request body limit applied when `MAX_BODY_BYTES` is not set (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Store host, e.g. `example.myshopify.com`.
    pub shopify_store: String,
    pub shopify_access_token: String,
    /// Overrides `https://{shopify_store}` (local proxies, tests).
    pub shopify_base_url: Option<String>,
    pub submission_path: String,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            shopify_store: std::env::var("SHOPIFY_STORE")
                .map_err(|_| anyhow::anyhow!("SHOPIFY_STORE environment variable required"))
                .and_then(|store| {
                    let store = store.trim().to_string();
                    if store.is_empty() {
                        anyhow::bail!("SHOPIFY_STORE cannot be empty");
                    }
                    if store.contains("://") {
                        anyhow::bail!(
                            "SHOPIFY_STORE must be a bare host (e.g. example.myshopify.com)"
                        );
                    }
                    Ok(store)
                })?,
            shopify_access_token: std::env::var("SHOPIFY_ACCESS_TOKEN")
                .map_err(|_| anyhow::anyhow!("SHOPIFY_ACCESS_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("SHOPIFY_ACCESS_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            shopify_base_url: std::env::var("SHOPIFY_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("SHOPIFY_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?,
            submission_path: std::env::var("SUBMISSION_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|path| {
                    if !path.starts_with('/') {
                        anyhow::bail!("SUBMISSION_PATH must start with /");
                    }
                    Ok(path)
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_SUBMISSION_PATH.to_string()),
            max_body_bytes: match std::env::var("MAX_BODY_BYTES") {
                Ok(raw) => parse_body_limit(&raw)?,
                Err(_) => DEFAULT_MAX_BODY_BYTES,
            },
        };

        // Never log the access token
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Shopify store: {}", config.shopify_store);
        if let Some(ref base) = config.shopify_base_url {
            tracing::info!("Shopify base URL override configured: {}", base);
        }
        tracing::debug!("Submission path: {}", config.submission_path);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Base URL of the Admin API host, without a trailing slash.
    pub fn shopify_base_url(&self) -> String {
        match &self.shopify_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.shopify_store),
        }
    }
}

fn parse_body_limit(raw: &str) -> anyhow::Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => anyhow::bail!("MAX_BODY_BYTES must be a positive integer"),
    }
}
