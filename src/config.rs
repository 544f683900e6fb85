// Engine configuration
// Defaults describe an offline deployment: live fetch stays off until provider credentials are set.

use crate::error::ConfigError;
use crate::money::Money;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://test.api.amadeus.com";

// Provider connection settings
#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub request_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl ProviderConfig {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// Lodging price enrichment settings
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub batch_size: usize,
    pub max_concurrent_batches: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_concurrent_batches: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub live_fetch: bool,
    pub provider: ProviderConfig,
    pub enrichment: EnrichmentConfig,
    pub deadline_ms: u64,
    pub lodging_placeholder_price: Money,
    pub server: ServerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            live_fetch: false,
            provider: ProviderConfig::default(),
            enrichment: EnrichmentConfig::default(),
            deadline_ms: 25_000,
            lodging_placeholder_price: Money::from_units(100),
            server: ServerConfig::default(),
        }
    }
}

impl EngineConfig {
    // Load configuration from environment variables.
    //
    // - `TRIP_LIVE_FETCH` (default `false`)
    // - `TRIP_PROVIDER_BASE_URL` (default `https://test.api.amadeus.com`)
    // - `TRIP_PROVIDER_CLIENT_ID`, `TRIP_PROVIDER_CLIENT_SECRET`
    // - `TRIP_REQUEST_TIMEOUT_MS` (default 10000)
    // - `TRIP_DEADLINE_MS` (default 25000)
    // - `TRIP_LODGING_PLACEHOLDER_PRICE` (default 100)
    // - `TRIP_BIND_ADDR` (default `0.0.0.0:8080`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        Ok(Self {
            live_fetch: parse_or("TRIP_LIVE_FETCH", &lookup, defaults.live_fetch)?,
            provider: ProviderConfig {
                base_url: lookup("TRIP_PROVIDER_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.provider.base_url),
                client_id: lookup("TRIP_PROVIDER_CLIENT_ID").unwrap_or_default(),
                client_secret: lookup("TRIP_PROVIDER_CLIENT_SECRET").unwrap_or_default(),
                request_timeout_ms: parse_or(
                    "TRIP_REQUEST_TIMEOUT_MS",
                    &lookup,
                    defaults.provider.request_timeout_ms,
                )?,
            },
            enrichment: defaults.enrichment,
            deadline_ms: parse_or("TRIP_DEADLINE_MS", &lookup, defaults.deadline_ms)?,
            lodging_placeholder_price: parse_or(
                "TRIP_LODGING_PLACEHOLDER_PRICE",
                &lookup,
                defaults.lodging_placeholder_price,
            )?,
            server: ServerConfig {
                bind_addr: parse_or("TRIP_BIND_ADDR", &lookup, defaults.server.bind_addr)?,
            },
        })
    }

    // Live fetch needs both the switch and a usable client credential
    pub fn live_fetch_enabled(&self) -> bool {
        self.live_fetch && self.provider.has_credentials()
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_offline() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(!config.live_fetch_enabled());
        assert_eq!(config.provider.base_url, DEFAULT_PROVIDER_BASE_URL);
        assert_eq!(config.lodging_placeholder_price, Money::from_units(100));
        assert_eq!(config.enrichment.batch_size, 10);
        assert_eq!(config.enrichment.max_concurrent_batches, 4);
        assert_eq!(config.server.bind_addr.port(), 8080);
    }

    #[test]
    fn test_live_fetch_requires_credentials() {
        let switch_only = EngineConfig::from_lookup(lookup_from(&[("TRIP_LIVE_FETCH", "true")]))
            .unwrap();
        assert!(!switch_only.live_fetch_enabled());

        let full = EngineConfig::from_lookup(lookup_from(&[
            ("TRIP_LIVE_FETCH", "true"),
            ("TRIP_PROVIDER_CLIENT_ID", "client"),
            ("TRIP_PROVIDER_CLIENT_SECRET", "secret"),
            ("TRIP_PROVIDER_BASE_URL", "http://localhost:9000/"),
            ("TRIP_DEADLINE_MS", "500"),
            ("TRIP_LODGING_PLACEHOLDER_PRICE", "120.50"),
        ]))
        .unwrap();
        assert!(full.live_fetch_enabled());
        assert_eq!(full.provider.base_url, "http://localhost:9000");
        assert_eq!(full.deadline(), Duration::from_millis(500));
        assert_eq!(full.lodging_placeholder_price, Money::from_cents(12050));
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = EngineConfig::from_lookup(lookup_from(&[("TRIP_DEADLINE_MS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "TRIP_DEADLINE_MS",
                value: "soon".into()
            }
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ProviderConfig {
            client_secret: "hunter2".into(),
            ..ProviderConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
