pub mod analysis;
pub mod client;
pub mod domain;
pub mod engine;
pub mod session;

pub mod config {
    use crate::client::http::{DEFAULT_PREFIX, DEFAULT_TIMEOUT_SECS};
    use crate::session::debounce::DEFAULT_DEBOUNCE_MS;
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: Option<String>,
        pub api_prefix: String,
        pub http_timeout_secs: u64,
        pub search_debounce_ms: u64,
        pub sentry_dsn: Option<String>,
        pub port: u16,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_base_url: None,
                api_prefix: DEFAULT_PREFIX.to_string(),
                http_timeout_secs: DEFAULT_TIMEOUT_SECS,
                search_debounce_ms: DEFAULT_DEBOUNCE_MS,
                sentry_dsn: None,
                port: DEFAULT_PORT,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                api_base_url: non_empty_var("STONKS_API_BASE_URL"),
                // The production proxy serves the same routes under /stonks/api.
                api_prefix: std::env::var("STONKS_API_PREFIX").unwrap_or(defaults.api_prefix),
                http_timeout_secs: parsed_var("STONKS_HTTP_TIMEOUT_SECS")?
                    .unwrap_or(defaults.http_timeout_secs),
                search_debounce_ms: parsed_var("STONKS_SEARCH_DEBOUNCE_MS")?
                    .unwrap_or(defaults.search_debounce_ms),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                port: parsed_var("PORT")?.unwrap_or(defaults.port),
            })
        }

        pub fn require_api_base_url(&self) -> anyhow::Result<&str> {
            self.api_base_url
                .as_deref()
                .context("STONKS_API_BASE_URL is required")
        }

        pub fn search_debounce(&self) -> Duration {
            Duration::from_millis(self.search_debounce_ms)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_var(key)
            .map(|s| s.parse::<T>().with_context(|| format!("{key} is invalid: {s}")))
            .transpose()
    }
}
