use crate::common::mock_server::CoreLedgerMockServer;
use coreledger_rust::CoreLedgerClient;
use reqwest::Url;
use uuid::Uuid;

pub struct TestContext {
    pub client: CoreLedgerClient,
    program_identifier: String,
    hmac_key: String,
    mock_server: CoreLedgerMockServer,
}

impl TestContext {
    pub async fn start() -> Self {
        // Generate a new set of random credentials for this specific test
        let program_identifier = Uuid::new_v4().to_string();
        let hmac_key = Uuid::new_v4().to_string();

        // Setup a new mock server
        let mock_server = CoreLedgerMockServer::start(&program_identifier, &hmac_key).await;

        // Configure a new CoreLedgerClient to point to the mock server
        let client = build_client(mock_server.url(), &program_identifier, &hmac_key);

        Self {
            client,
            program_identifier,
            hmac_key,
            mock_server,
        }
    }

    /// A new client, with its own token cache, using the credentials of this context.
    pub fn new_client(&self) -> CoreLedgerClient {
        build_client(self.mock_server.url(), &self.program_identifier, &self.hmac_key)
    }

    /// A new client pointing to the same server with different credentials.
    pub fn client_with_credentials(
        &self,
        program_identifier: &str,
        hmac_key: &str,
    ) -> CoreLedgerClient {
        build_client(self.mock_server.url(), program_identifier, hmac_key)
    }

    pub fn mock_server_url(&self) -> &Url {
        self.mock_server.url()
    }

    /// Number of bootstrap requests the server accepted.
    pub fn auth_calls(&self) -> usize {
        self.mock_server.issued_tokens().len()
    }

    pub fn issued_tokens(&self) -> Vec<String> {
        self.mock_server.issued_tokens()
    }
}

fn build_client(url: &Url, program_identifier: &str, hmac_key: &str) -> CoreLedgerClient {
    CoreLedgerClient::builder(program_identifier, hmac_key)
        .with_base_url(url.clone())
        .build()
        .unwrap()
}
