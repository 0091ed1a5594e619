use crate::{
    apis::auth::{AssertionClaims, AuthResponse, HmacKey, Token},
    common::TOKEN_MAX_AGE_MILLIS,
    error::Error,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Url,
};
use reqwest_middleware::ClientWithMiddleware;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};
use tokio::sync::Mutex;

/// Cached bearer token and the moment it was issued.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    /// Opaque token as received from the service.
    pub token: Option<Token>,
    /// Issue time, in milliseconds since the Unix epoch.
    pub issued_at_millis: i64,
}

impl TokenCache {
    /// Returns the cached token if it is younger than 23 hours at `now_millis`.
    pub fn fresh_token(&self, now_millis: i64) -> Option<&Token> {
        self.token
            .as_ref()
            .filter(|token| !token.is_empty())
            .filter(|_| now_millis - self.issued_at_millis < TOKEN_MAX_AGE_MILLIS)
    }
}

/// Issuer and cache of the bearer token used to authenticate requests.
///
/// Cloning an `Authenticator` yields a handle to the same cache.
#[derive(Debug, Clone)]
pub struct Authenticator {
    inner: Arc<AuthenticatorState>,
}

struct AuthenticatorState {
    client: ClientWithMiddleware,
    auth_url: Url,
    program_identifier: String,
    hmac_key: HmacKey,
    cache: Mutex<TokenCache>,
}

impl Debug for AuthenticatorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorState")
            .field("auth_url", &self.auth_url)
            .field("program_identifier", &self.program_identifier)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Creates a new authenticator with an empty cache.
    ///
    /// `client` must not carry the authentication middleware: the bootstrap never
    /// sends the cached token.
    pub fn new(
        client: ClientWithMiddleware,
        auth_url: Url,
        program_identifier: String,
        hmac_key: HmacKey,
    ) -> Self {
        Self {
            inner: Arc::new(AuthenticatorState {
                client,
                auth_url,
                program_identifier,
                hmac_key,
                cache: Mutex::new(TokenCache::default()),
            }),
        }
    }

    /// URL of the `auth` bootstrap endpoint.
    pub fn auth_url(&self) -> &Url {
        &self.inner.auth_url
    }

    /// Returns the cached token, bootstrapping a new one if there is none or if it is
    /// older than 23 hours.
    ///
    /// The cache lock is held for the whole read-decide-refresh sequence, so concurrent
    /// callers observing an expired token result in exactly one bootstrap request.
    #[tracing::instrument(name = "Get Access Token", level = "debug", skip(self))]
    pub async fn ensure_fresh(&self) -> Result<Token, Error> {
        let mut cache = self.inner.cache.lock().await;

        if let Some(token) = cache.fresh_token(now_millis()) {
            tracing::debug!("Reusing existing access token");
            return Ok(token.clone());
        }

        self.issue_locked(&mut cache).await
    }

    /// Performs a bootstrap without consulting the cache, then stores the new token.
    ///
    /// A failed bootstrap leaves the cache unchanged.
    #[tracing::instrument(name = "Issue Access Token", level = "debug", skip(self))]
    pub async fn issue(&self) -> Result<Token, Error> {
        let mut cache = self.inner.cache.lock().await;
        self.issue_locked(&mut cache).await
    }

    /// Snapshot of the current cache contents.
    pub async fn cached(&self) -> TokenCache {
        self.inner.cache.lock().await.clone()
    }

    async fn issue_locked(&self, cache: &mut TokenCache) -> Result<Token, Error> {
        let assertion = self.sign_assertion()?;
        let mut header_value =
            HeaderValue::from_str(&assertion).map_err(|e| Error::Other(e.into()))?;
        header_value.set_sensitive(true);

        // The assertion travels in the Authorization header of the bootstrap request
        let bytes = self
            .inner
            .client
            .post(self.inner.auth_url.clone())
            .header(AUTHORIZATION, header_value)
            .send()
            .await?
            .bytes()
            .await?;
        let res: AuthResponse = serde_json::from_slice(&bytes)?;

        if res.token.is_empty() {
            return Err(Error::Other(anyhow::anyhow!(
                "The auth endpoint returned an empty token"
            )));
        }

        *cache = TokenCache {
            token: Some(res.token.clone()),
            issued_at_millis: now_millis(),
        };

        tracing::info!("Got new access token");

        Ok(res.token)
    }

    fn sign_assertion(&self) -> Result<String, Error> {
        let claims = AssertionClaims {
            iat: now_millis() / 1000,
            sub: self.inner.program_identifier.clone(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.inner.hmac_key.expose_secret()),
        )?)
    }

    #[cfg(test)]
    pub(crate) async fn set_cache(&self, cache: TokenCache) {
        *self.inner.cache.lock().await = cache;
    }
}

// Select an implementation of `now()` depending on whether we are testing or not
#[cfg(not(test))]
fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
#[cfg(test)]
fn now_millis() -> i64 {
    tests::mocked_time::now().timestamp_millis()
}
