//! Server configuration, loaded from environment variables at startup.

use std::fmt;
use std::time::Duration;

use handle_vendor::{DEFAULT_BASE_URL, ResolutionSettings, RetryPolicy};

/// Runtime configuration for handle-server.
///
/// Everything except the vendor credential has a default. Without the
/// credential the server still starts, but every vendor-facing route answers
/// with a configuration error.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Vendor API host (default: [`DEFAULT_BASE_URL`]).
    pub vendor_url: String,

    /// Vendor bearer credential (`ASKHANDLE_API_TOKEN`). Never sent to clients.
    pub api_token: Option<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs go to a daily-rolling file in this directory instead of stdout.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,

    /// Retry and polling budgets for `/api/sendMessage`.
    pub resolution: ResolutionSettings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("vendor_url", &self.vendor_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("log_dir", &self.log_dir)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_swagger", &self.enable_swagger)
            .field("resolution", &self.resolution)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };
        let millis = |key: &str, default: Duration| {
            Duration::from_millis(parse_or(lookup(key), default.as_millis() as u64))
        };

        let defaults = ResolutionSettings::default();
        let resolution = ResolutionSettings {
            submit: RetryPolicy::new(
                parse_or(lookup("HANDLE_SUBMIT_RETRIES"), defaults.submit.max_retries),
                millis("HANDLE_SUBMIT_DELAY_MS", defaults.submit.delay),
            ),
            poll_budget: parse_or(lookup("HANDLE_POLL_BUDGET"), defaults.poll_budget),
            poll_delay: millis("HANDLE_POLL_DELAY_MS", defaults.poll_delay),
            poll_retry: RetryPolicy::new(
                parse_or(lookup("HANDLE_POLL_RETRIES"), defaults.poll_retry.max_retries),
                millis("HANDLE_POLL_RETRY_DELAY_MS", defaults.poll_retry.delay),
            ),
        };

        Self {
            bind_address: env_or("HANDLE_BIND", "0.0.0.0:3000"),
            vendor_url: env_or("HANDLE_VENDOR_URL", DEFAULT_BASE_URL),
            api_token: non_empty("ASKHANDLE_API_TOKEN"),
            log_level: env_or("HANDLE_LOG", "info"),
            log_json: flag("HANDLE_LOG_JSON", false),
            log_dir: non_empty("HANDLE_LOG_DIR"),
            cors_allowed_origins: non_empty("HANDLE_CORS_ORIGINS"),
            enable_swagger: flag("HANDLE_ENABLE_SWAGGER", true),
            resolution,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
