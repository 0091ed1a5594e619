//! Module containing the main CoreLedger API client.

use crate::{
    apis::{
        accounts::Account, auth::AuthApi, auth::HmacKey, cards::Card,
        compliance_workflows::ComplianceWorkflow, customers::Customer, kyc_documents::KycDocument,
        transactions::Transaction, transfers::Transfer, ResourceApi,
    },
    authenticator::Authenticator,
    common::AUTH_PATH,
    config::{Config, Environment},
    dispatcher::{api_url, Dispatcher, QueryParams},
    error::Error,
    middlewares::{
        authentication::AuthenticationMiddleware, debug_logging::DebugLoggingMiddleware,
        default_headers::DefaultHeadersMiddleware, error_handling::ErrorHandlingMiddleware,
    },
};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_tracing::TracingMiddleware;
use tokio_util::sync::CancellationToken;

/// Client for CoreLedger public APIs.
///
/// The client is cheap to clone and every clone shares the same transport and token
/// cache. Build it completely, then share it between tasks.
#[derive(Debug, Clone)]
pub struct CoreLedgerClient {
    /// Authentication APIs client.
    pub auth: AuthApi,
    /// Customers APIs client.
    pub customers: ResourceApi<Customer>,
    /// Custodial accounts APIs client.
    pub accounts: ResourceApi<Account>,
    /// Debit cards APIs client.
    pub cards: ResourceApi<Card>,
    /// Transfers APIs client.
    pub transfers: ResourceApi<Transfer>,
    /// Ledger transactions APIs client.
    pub transactions: ResourceApi<Transaction>,
    /// Compliance workflows APIs client.
    pub compliance_workflows: ResourceApi<ComplianceWorkflow>,
    /// KYC documents APIs client.
    pub kyc_documents: ResourceApi<KycDocument>,
    dispatcher: Dispatcher,
    environment: Environment,
}

impl CoreLedgerClient {
    /// Returns a new builder to configure a new [`CoreLedgerClient`](crate::client::CoreLedgerClient).
    pub fn builder(
        program_identifier: impl Into<String>,
        hmac_key: impl Into<HmacKey>,
    ) -> CoreLedgerClientBuilder {
        CoreLedgerClientBuilder::new(Config::new(program_identifier, hmac_key))
    }

    /// Builds a new [`CoreLedgerClient`](crate::client::CoreLedgerClient) from a [`Config`](crate::config::Config).
    ///
    /// Fails with [`Error::Configuration`](crate::Error::Configuration) if the
    /// configuration is invalid. No network I/O happens here.
    pub fn from_config(config: Config) -> Result<CoreLedgerClient, Error> {
        CoreLedgerClientBuilder::new(config).build()
    }

    /// Returns a copy of this client whose every call is aborted when `ctx` is cancelled.
    pub fn with_cancellation(&self, ctx: CancellationToken) -> Self {
        Self::from_parts(self.dispatcher.clone(), self.environment, ctx)
    }

    /// Low level access to the dispatcher, for endpoints not modeled by this crate.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Environment tier this client talks to.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    fn from_parts(
        dispatcher: Dispatcher,
        environment: Environment,
        ctx: CancellationToken,
    ) -> Self {
        CoreLedgerClient {
            auth: AuthApi::new(dispatcher.authenticator().clone()),
            customers: ResourceApi::new(dispatcher.clone(), ctx.clone()),
            accounts: ResourceApi::new(dispatcher.clone(), ctx.clone()),
            cards: ResourceApi::new(dispatcher.clone(), ctx.clone()),
            transfers: ResourceApi::new(dispatcher.clone(), ctx.clone()),
            transactions: ResourceApi::new(dispatcher.clone(), ctx.clone()),
            compliance_workflows: ResourceApi::new(dispatcher.clone(), ctx.clone()),
            kyc_documents: ResourceApi::new(dispatcher.clone(), ctx),
            dispatcher,
            environment,
        }
    }
}

/// Builder for a [`CoreLedgerClient`](crate::client::CoreLedgerClient).
#[derive(Debug)]
pub struct CoreLedgerClientBuilder {
    config: Config,
}

impl CoreLedgerClientBuilder {
    /// Creates a new builder to configure a [`CoreLedgerClient`](crate::client::CoreLedgerClient).
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Consumes the builder and builds a new [`CoreLedgerClient`](crate::client::CoreLedgerClient).
    pub fn build(self) -> Result<CoreLedgerClient, Error> {
        let config = self.config.validate_and_normalize()?;
        let environment = config.environment_tier();

        let base_url = config
            .base_url
            .ok_or_else(|| Error::Configuration("missing base URL".to_string()))?;
        let client = config
            .http_client
            .ok_or_else(|| Error::Configuration("missing HTTP client".to_string()))?;

        // Build an authenticator
        let auth_url = api_url(&base_url, AUTH_PATH, &QueryParams::new())?;
        let authenticator = Authenticator::new(
            build_client_with_middleware(client.clone(), config.debug, None),
            auth_url,
            config.program_identifier,
            config.hmac_key,
        );

        // Prepare the middlewares
        let auth_middleware = Some(AuthenticationMiddleware {
            authenticator: authenticator.clone(),
        });

        // Build the actual CoreLedger client
        let dispatcher = Dispatcher::new(
            build_client_with_middleware(client, config.debug, auth_middleware),
            authenticator,
            base_url,
        );

        Ok(CoreLedgerClient::from_parts(
            dispatcher,
            environment,
            CancellationToken::new(),
        ))
    }

    /// Sets the environment tier (`sandbox`, `integration` or `production`).
    ///
    /// Unknown values are replaced with `sandbox` when the client is built.
    pub fn with_environment(mut self, environment: impl ToString) -> Self {
        self.config.environment = environment.to_string();
        self
    }

    /// Overrides the base URL derived from the environment.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.config.base_url = Some(base_url);
        self
    }

    /// Sets a specific reqwest [`Client`](reqwest::Client) to use.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.config.http_client = Some(client);
        self
    }

    /// Logs method, URL and outcome of every request.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }
}

fn build_client_with_middleware(
    client: reqwest::Client,
    debug: bool,
    auth_middleware: Option<AuthenticationMiddleware>,
) -> ClientWithMiddleware {
    let mut builder = reqwest_middleware::ClientBuilder::new(client).with(TracingMiddleware::default());

    if debug {
        builder = builder.with(DebugLoggingMiddleware);
    }

    builder = builder
        .with(ErrorHandlingMiddleware)
        .with(DefaultHeadersMiddleware::new());

    if let Some(auth_middleware) = auth_middleware {
        builder = builder.with(auth_middleware);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn invalid_credentials_fail_construction() {
        let err = CoreLedgerClient::builder("", "K").build().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn unknown_environment_falls_back_to_sandbox() {
        let client = CoreLedgerClient::builder("P", "K")
            .with_environment("staging")
            .build()
            .unwrap();

        assert_eq!(client.environment(), Environment::Sandbox);
        assert_eq!(
            client.dispatcher().base_url().as_str(),
            "https://sandbox.coreledger.io/"
        );
    }

    #[test]
    fn auth_url_is_under_api_version() {
        let client = CoreLedgerClient::builder("P", "K")
            .with_environment("production")
            .build()
            .unwrap();

        assert_eq!(
            client.dispatcher().authenticator().auth_url().as_str(),
            "https://production.coreledger.io/api/v1/auth"
        );
    }

    #[tokio::test]
    async fn cancellation_is_shared_by_all_resources() {
        let client = CoreLedgerClient::builder("P", "K").build().unwrap();
        let ctx = CancellationToken::new();
        let client = client.with_cancellation(ctx.clone());
        ctx.cancel();

        let err = client.customers.get("cus_1").await.unwrap_err();
        assert!(err.is_cancelled());
        let err = client.kyc_documents.download("doc_1").await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
