use std::{env, net::IpAddr, time::Duration};

use log::*;
use website_order_engine::payments::{SignatureVerifier, DEFAULT_TOLERANCE};
use wop_common::{helpers::env_flag, Secret};

const DEFAULT_WOP_HOST: &str = "127.0.0.1";
const DEFAULT_WOP_PORT: u16 = 8460;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// Payment provider configuration
    pub stripe: StripeConfig,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    /// The provider API key. Not used by the webhook itself, but kept alongside the signing secret so that both are
    /// configured in one place.
    pub secret_key: Secret<String>,
    /// The signing secret for webhook deliveries (`whsec_...`).
    pub webhook_secret: Secret<String>,
    /// Maximum accepted age of a webhook signature timestamp.
    pub signature_tolerance: Duration,
    /// If supplied, webhook requests will be checked against a whitelist of provider IP addresses.
    /// To explicitly disable the whitelist, set this to "false", "none", or "0".
    pub whitelist: Option<Vec<IpAddr>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WOP_HOST.to_string(),
            port: DEFAULT_WOP_PORT,
            database_url: String::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            use_x_forwarded_for: false,
            use_forwarded: false,
            stripe: StripeConfig::default(),
        }
    }
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
            signature_tolerance: DEFAULT_TOLERANCE,
            whitelist: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("WOP_HOST").ok().unwrap_or_else(|| DEFAULT_WOP_HOST.into());
        let port = env::var("WOP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for WOP_PORT. {e} Using the default, {DEFAULT_WOP_PORT}, instead."
                    );
                    DEFAULT_WOP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_WOP_PORT);
        let database_url = env::var("WOP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ WOP_DATABASE_URL is not set. Please set it to the URL for the order database.");
            String::default()
        });
        let max_connections = env::var("WOP_DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| {
                        warn!(
                            "🪛️ Invalid configuration value for WOP_DATABASE_MAX_CONNECTIONS. {e}. Using \
                             {DEFAULT_MAX_CONNECTIONS}."
                        )
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let use_x_forwarded_for = env_flag("WOP_USE_X_FORWARDED_FOR", false);
        let use_forwarded = env_flag("WOP_USE_FORWARDED", false);
        let stripe = StripeConfig::from_env_or_defaults();
        Self { host, port, database_url, max_connections, use_x_forwarded_for, use_forwarded, stripe }
    }
}

impl StripeConfig {
    pub fn from_env_or_defaults() -> Self {
        let secret_key = env::var("WOP_STRIPE_SECRET_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ WOP_STRIPE_SECRET_KEY is not set.");
            String::default()
        });
        let webhook_secret = env::var("WOP_STRIPE_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ WOP_STRIPE_WEBHOOK_SECRET is not set. Every payment webhook delivery will be rejected until it is \
                 set to the endpoint's signing secret."
            );
            String::default()
        });
        let signature_tolerance = env::var("WOP_STRIPE_SIGNATURE_TOLERANCE")
            .map_err(|_| {
                info!(
                    "🪛️ WOP_STRIPE_SIGNATURE_TOLERANCE is not set. Using the default value of {}s.",
                    DEFAULT_TOLERANCE.as_secs()
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for WOP_STRIPE_SIGNATURE_TOLERANCE. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_TOLERANCE);
        let whitelist = env::var("WOP_STRIPE_IP_WHITELIST").ok().and_then(|s| parse_whitelist(&s));
        match &whitelist {
            Some(whitelist) if whitelist.is_empty() => {
                warn!(
                    "🚨️ The payment provider IP whitelist was configured, but is empty. The server will run, but won't \
                     accept any webhook deliveries."
                );
            },
            None => {
                info!("🪛️ No payment provider IP whitelist is set. Only signature checks will be used.");
            },
            Some(v) => {
                let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                info!("🪛️ Payment provider IP whitelist: {addrs}");
            },
        }
        Self {
            secret_key: Secret::new(secret_key),
            webhook_secret: Secret::new(webhook_secret),
            signature_tolerance,
            whitelist,
        }
    }

    pub fn signature_verifier(&self) -> SignatureVerifier {
        SignatureVerifier::new(self.webhook_secret.clone()).with_tolerance(self.signature_tolerance)
    }
}

/// Parses a comma-separated list of IP addresses. "none", "false" and "0" disable the whitelist. Invalid entries are
/// skipped.
pub fn parse_whitelist(s: &str) -> Option<Vec<IpAddr>> {
    if ["none", "false", "0"].contains(&s.trim().to_lowercase().as_str()) {
        info!(
            "🪛️ Payment provider IP whitelist is disabled. If this is not what you want, set WOP_STRIPE_IP_WHITELIST \
             to a comma-separated list of IP addresses to enable it."
        );
        return None;
    }
    let ip_addrs = s
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            s.parse()
                .map_err(|e| warn!("🪛️ Ignoring invalid IP address ({s}) in WOP_STRIPE_IP_WHITELIST: {e}"))
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    Some(ip_addrs)
}
