use anyhow::{Context, Result};

use crate::layout::{DEFAULT_PAGE_SIZE, REFERENCE_FONT_SIZE_PX};

/// Largest accepted markup document, in bytes (2 MiB).
const DEFAULT_MAX_MARKUP_BYTES: usize = 2 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Preset active at startup; validated when the paginator is built.
    pub default_page_size: String,
    pub default_font_size_px: u32,
    pub max_markup_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_page_size: std::env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string()),
            default_font_size_px: parse_env("DEFAULT_FONT_SIZE_PX", REFERENCE_FONT_SIZE_PX)
                .context("DEFAULT_FONT_SIZE_PX must be a whole number of pixels")?,
            max_markup_bytes: parse_env("MAX_MARKUP_BYTES", DEFAULT_MAX_MARKUP_BYTES)
                .context("MAX_MARKUP_BYTES must be a byte count")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            default_page_size: DEFAULT_PAGE_SIZE.to_string(),
            default_font_size_px: REFERENCE_FONT_SIZE_PX,
            max_markup_bytes: DEFAULT_MAX_MARKUP_BYTES,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("PAGECUT_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("PAGECUT_TEST_BAD_NUMBER", "twelve");
        let result: Result<u16> = parse_env("PAGECUT_TEST_BAD_NUMBER", 1);
        assert!(result.is_err());
        std::env::remove_var("PAGECUT_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_parse_env_trims_whitespace() {
        std::env::set_var("PAGECUT_TEST_PADDED_NUMBER", " 24 ");
        let value: u32 = parse_env("PAGECUT_TEST_PADDED_NUMBER", 18).unwrap();
        assert_eq!(value, 24);
        std::env::remove_var("PAGECUT_TEST_PADDED_NUMBER");
    }

    #[test]
    fn test_default_config_matches_engine_defaults() {
        let config = Config::default();
        assert_eq!(config.default_page_size, "medium");
        assert_eq!(config.default_font_size_px, 18);
        assert_eq!(config.max_markup_bytes, 2 * 1024 * 1024);
    }
}
