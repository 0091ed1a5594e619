use crate::{apis::auth::Token, authenticator::Authenticator, Error};

/// CoreLedger authentication API client.
#[derive(Debug, Clone)]
pub struct AuthApi {
    authenticator: Authenticator,
}

impl AuthApi {
    pub(crate) fn new(authenticator: Authenticator) -> Self {
        Self { authenticator }
    }

    /// Returns the bearer token currently used to authenticate to the CoreLedger APIs.
    /// If the client is not authenticated yet, or the cached token is older than 23 hours,
    /// a new bootstrap request is fired.
    pub async fn get_token(&self) -> Result<Token, Error> {
        // Just delegate to the authenticator
        self.authenticator.ensure_fresh().await
    }

    /// Unconditionally performs a new bootstrap and replaces the cached token.
    ///
    /// Useful after the service rejected the cached token with a `401`, since the client
    /// never re-authenticates on its own.
    pub async fn refresh_token(&self) -> Result<Token, Error> {
        self.authenticator.issue().await
    }
}
