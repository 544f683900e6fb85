// Shared bearer credential with lazy, coalesced refresh
// Reads take the fast path under a read lock; an expired or absent credential is
// re-acquired by exactly one caller while the others wait on the refresh lock.

use crate::config::ProviderConfig;
use crate::error::PackageError;
use crate::provider::TokenResponse;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(60);

// Longest lifetime a locally built credential is given
const MAX_CREDENTIAL_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Clone)]
pub struct Credential {
    token: String,
    expires_at: Instant,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            token: token.into(),
            expires_at: Instant::now() + expires_in.min(MAX_CREDENTIAL_LIFETIME),
        }
    }

    // Lifetimes reported by the identity provider are untrusted; None when the expiry
    // instant cannot be represented
    pub fn try_new(token: impl Into<String>, expires_in: Duration) -> Option<Self> {
        Instant::now()
            .checked_add(expires_in)
            .map(|expires_at| Self {
                token: token.into(),
                expires_at,
            })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_valid_for(&self, margin: Duration) -> bool {
        self.expires_at > Instant::now() + margin
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// Identity provider performing the client-credentials exchange
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn exchange(&self) -> Result<Credential, PackageError>;
}

pub struct HttpIdentityProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl HttpIdentityProvider {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            token_url: format!("{}/v1/security/oauth2/token", config.base_url),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn exchange(&self) -> Result<Credential, PackageError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PackageError::AuthFailure(format!("identity endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PackageError::AuthFailure(format!(
                "identity endpoint rejected client credentials: {}",
                status
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| PackageError::AuthFailure(format!("malformed token response: {}", e)))?;

        Credential::try_new(body.access_token, Duration::from_secs(body.expires_in)).ok_or_else(
            || {
                PackageError::AuthFailure(format!(
                    "credential lifetime out of range: {}s",
                    body.expires_in
                ))
            },
        )
    }
}

pub struct CredentialCache {
    provider: Arc<dyn IdentityProvider>,
    current: RwLock<Option<Credential>>,
    refresh: Mutex<()>,
    margin: Duration,
    exchanges: AtomicUsize,
}

impl CredentialCache {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_margin(provider, TOKEN_SAFETY_MARGIN)
    }

    pub fn with_margin(provider: Arc<dyn IdentityProvider>, margin: Duration) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
            margin,
            exchanges: AtomicUsize::new(0),
        }
    }

    pub async fn acquire(&self) -> Result<Credential, PackageError> {
        if let Some(credential) = self.cached() {
            return Ok(credential);
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(credential) = self.cached() {
            debug!("Credential refreshed by a concurrent caller");
            return Ok(credential);
        }

        self.exchanges.fetch_add(1, Ordering::SeqCst);
        let fresh = match self.provider.exchange().await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "Credential exchange failed");
                return Err(e);
            }
        };

        if !fresh.is_valid_for(Duration::ZERO) {
            return Err(PackageError::AuthFailure(
                "identity provider issued an already expired credential".into(),
            ));
        }

        info!(
            expires_in_secs = fresh
                .expires_at()
                .saturating_duration_since(Instant::now())
                .as_secs(),
            "Acquired new provider credential"
        );
        *self.current.write() = Some(fresh.clone());
        Ok(fresh)
    }

    // Number of identity exchanges performed so far
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn invalidate(&self) {
        *self.current.write() = None;
    }

    fn cached(&self) -> Option<Credential> {
        self.current
            .read()
            .as_ref()
            .filter(|c| c.is_valid_for(self.margin))
            .cloned()
    }
}
