use anyhow::{bail, Context, Result};

use crate::layout::font_metrics::FontFamily;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file holding the candidate pool.
    pub pool_path: String,
    pub port: u16,
    pub rust_log: String,
    pub font_family: FontFamily,
    pub font_size_px: f32,
    /// Fallback seed for requests that do not carry their own.
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let font_raw = optional_env("BRACKET_FONT").unwrap_or_else(|| "helvetica".to_string());
        let font_family = FontFamily::parse(&font_raw)
            .with_context(|| format!("BRACKET_FONT '{font_raw}' is not a known font family"))?;

        let font_size_px = optional_env("BRACKET_FONT_SIZE_PX")
            .unwrap_or_else(|| "14".to_string())
            .parse::<f32>()
            .context("BRACKET_FONT_SIZE_PX must be a number")?;
        if !(font_size_px.is_finite() && font_size_px > 0.0) {
            bail!("BRACKET_FONT_SIZE_PX must be positive, got {font_size_px}");
        }

        let rng_seed = optional_env("RNG_SEED")
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .context("RNG_SEED must be an unsigned integer")?;

        Ok(Config {
            pool_path: require_env("POOL_PATH")?,
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            font_family,
            font_size_px,
            rng_seed,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
