//! Server configuration.
//!
//! Everything is read from `FPG_*` environment variables (see `cli-help.txt` for the full list). Missing or invalid
//! values fall back to defaults with a log message, so that a misconfigured server is noisy rather than dead.
use std::{env, time::Duration};

use fair_payment_engine::{
    sqlite::db::db_url,
    ReconciliationOptions,
    DEFAULT_VERIFY_ATTEMPTS,
    DEFAULT_VERIFY_BACKOFF,
};
use fpg_common::{
    helpers::{env_flag, env_parse},
    Secret,
    DEFAULT_CURRENCY_CODE,
};
use gateway_tools::GatewayConfig;
use log::*;

const DEFAULT_FPG_HOST: &str = "127.0.0.1";
const DEFAULT_FPG_PORT: u16 = 8370;
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The public URL of this server, used to build the callback URLs the gateway sends customers back to.
    pub public_base_url: Option<String>,
    pub gateway: GatewayConfig,
    /// If false, webhook calls are accepted without checking their signature. **DANGER**
    pub signature_checks: bool,
    pub verify_attempts: u32,
    pub verify_backoff: Duration,
    /// The currency for payments that do not specify one
    pub currency: String,
    /// Confirmation emails are only sent if this is configured
    pub smtp: Option<SmtpConfig>,
}

#[derive(Clone, Debug, Default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    /// The sender mailbox, e.g. "Book Fair <payments@bookfair.ng>"
    pub from: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FPG_HOST.to_string(),
            port: DEFAULT_FPG_PORT,
            database_url: String::default(),
            public_base_url: None,
            gateway: GatewayConfig::default(),
            signature_checks: true,
            verify_attempts: DEFAULT_VERIFY_ATTEMPTS,
            verify_backoff: DEFAULT_VERIFY_BACKOFF,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            smtp: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FPG_HOST").ok().unwrap_or_else(|| DEFAULT_FPG_HOST.into());
        let port = env_parse::<u16>("FPG_PORT").unwrap_or_else(|e| {
            if env::var("FPG_PORT").is_ok() {
                error!("🪛️ {e} Using the default, {DEFAULT_FPG_PORT}, instead.");
            }
            DEFAULT_FPG_PORT
        });
        let database_url = db_url();
        let public_base_url = env::var("FPG_PUBLIC_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());
        if public_base_url.is_none() {
            warn!(
                "🪛️ FPG_PUBLIC_BASE_URL is not set. Customers will be returned to the callback URL configured on the \
                 gateway dashboard."
            );
        }
        let gateway = GatewayConfig::new_from_env_or_default();
        let signature_checks = env_flag("FPG_GATEWAY_SIGNATURE_CHECKS", true);
        if !signature_checks {
            warn!("🚨️ Webhook signature checks are DISABLED. Anyone can post payment events to this server. 🚨️");
        }
        let verify_attempts = env_parse::<u32>("FPG_VERIFY_ATTEMPTS")
            .map_err(|e| info!("🪛️ Using {DEFAULT_VERIFY_ATTEMPTS} verification attempts. {e}"))
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_VERIFY_ATTEMPTS);
        let verify_backoff = env_parse::<u64>("FPG_VERIFY_BACKOFF_MS")
            .map(Duration::from_millis)
            .map_err(|e| info!("🪛️ Using a {}ms verification backoff. {e}", DEFAULT_VERIFY_BACKOFF.as_millis()))
            .unwrap_or(DEFAULT_VERIFY_BACKOFF);
        let currency = env::var("FPG_CURRENCY")
            .ok()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
        let smtp = SmtpConfig::from_env();
        Self {
            host,
            port,
            database_url,
            public_base_url,
            gateway,
            signature_checks,
            verify_attempts,
            verify_backoff,
            currency,
            smtp,
        }
    }

    pub fn reconciliation_options(&self) -> ReconciliationOptions {
        ReconciliationOptions {
            verify_attempts: self.verify_attempts,
            verify_backoff: self.verify_backoff,
            currency: self.currency.clone(),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

impl SmtpConfig {
    /// Reads the SMTP settings. Returns `None`, which disables confirmation emails, if `FPG_SMTP_HOST` is not set.
    pub fn from_env() -> Option<Self> {
        let Some(host) = env::var("FPG_SMTP_HOST").ok().filter(|s| !s.trim().is_empty()) else {
            info!("🪛️ FPG_SMTP_HOST is not set. Confirmation emails are disabled.");
            return None;
        };
        let port = env_parse::<u16>("FPG_SMTP_PORT").unwrap_or_else(|e| {
            if env::var("FPG_SMTP_PORT").is_ok() {
                warn!("🪛️ {e} Using the default, {DEFAULT_SMTP_PORT}, instead.");
            }
            DEFAULT_SMTP_PORT
        });
        let username = env::var("FPG_SMTP_USERNAME").unwrap_or_else(|_| {
            warn!("🪛️ FPG_SMTP_USERNAME is not set. The SMTP server will probably refuse to send mail.");
            String::default()
        });
        let password = Secret::new(env::var("FPG_SMTP_PASSWORD").unwrap_or_else(|_| {
            warn!("🪛️ FPG_SMTP_PASSWORD is not set.");
            String::default()
        }));
        let from = env::var("FPG_SMTP_FROM").unwrap_or_else(|_| {
            warn!("🪛️ FPG_SMTP_FROM is not set. Using {username} as the sender.");
            username.clone()
        });
        info!("🪛️ Confirmation emails will be sent via {host}:{port} as {from}");
        Some(Self { host: host.trim().to_string(), port, username, password, from })
    }
}
