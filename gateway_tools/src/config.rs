use std::time::Duration;

use fpg_common::{helpers::env_parse, Secret};
use log::*;

pub const DEFAULT_GATEWAY_BASE_URL: &str = "https://api.paystack.co";
/// Upper bound on a whole gateway call, from connecting to reading the last byte of the body.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Root of the gateway REST API, without a trailing slash. e.g. "https://api.paystack.co"
    pub base_url: String,
    /// The merchant secret key. It authorizes REST calls and is also the HMAC key for webhook signatures.
    pub secret_key: Secret<String>,
    /// Calls that take longer than this are abandoned and reported as transient failures.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { base_url: String::default(), secret_key: Secret::default(), timeout: DEFAULT_GATEWAY_TIMEOUT }
    }
}

impl GatewayConfig {
    pub fn new(base_url: &str, secret_key: Secret<String>) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), secret_key, timeout: DEFAULT_GATEWAY_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("FPG_GATEWAY_BASE_URL").unwrap_or_else(|_| {
            info!("FPG_GATEWAY_BASE_URL not set, using {DEFAULT_GATEWAY_BASE_URL} as default");
            DEFAULT_GATEWAY_BASE_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("FPG_GATEWAY_SECRET_KEY").unwrap_or_else(|_| {
            warn!("FPG_GATEWAY_SECRET_KEY not set, using (probably useless) default");
            "sk_test_0000000000000000".to_string()
        }));
        let timeout = env_parse::<u64>("FPG_GATEWAY_TIMEOUT_MS")
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or_else(|| {
                info!("Using a {}ms gateway timeout", DEFAULT_GATEWAY_TIMEOUT.as_millis());
                DEFAULT_GATEWAY_TIMEOUT
            });
        Self::new(&base_url, secret_key).with_timeout(timeout)
    }
}
