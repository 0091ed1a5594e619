use crate::authenticator::Authenticator;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Request, Response,
};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Reqwest middleware to inject the bearer token into outgoing HTTP requests.
/// On the first request, an additional HTTP request will be fired to bootstrap a new token.
///
/// Requests addressed to the `auth` endpoint itself are forwarded untouched.
pub struct AuthenticationMiddleware {
    pub(crate) authenticator: Authenticator,
}

#[async_trait]
impl Middleware for AuthenticationMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if req.url().path() == self.authenticator.auth_url().path() {
            return next.run(req, extensions).await;
        }

        // Request a token from the authenticator
        let token = self.authenticator.ensure_fresh().await?;

        // Inject the token verbatim, the service does not expect a scheme prefix
        let mut header_value = HeaderValue::from_str(token.expose_secret())
            .map_err(|e| reqwest_middleware::Error::Middleware(e.into()))?;
        header_value.set_sensitive(true);
        req.headers_mut().insert(AUTHORIZATION, header_value);

        // Run the rest of the middlewares
        next.run(req, extensions).await
    }
}
