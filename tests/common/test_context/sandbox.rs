use coreledger_rust::{CoreLedgerClient, Environment};

pub struct TestContext {
    pub client: CoreLedgerClient,
    program_identifier: String,
    hmac_key: String,
}

impl TestContext {
    pub async fn start() -> Self {
        // Take the required credentials from the env
        let program_identifier = std::env::var("ACCEPTANCE_TESTS_PROGRAM_IDENTIFIER").unwrap();
        let hmac_key = std::env::var("ACCEPTANCE_TESTS_HMAC_KEY").unwrap();

        // Configure a new CoreLedgerClient to point to Sandbox
        let client = build_client(&program_identifier, &hmac_key);

        Self {
            client,
            program_identifier,
            hmac_key,
        }
    }

    pub fn new_client(&self) -> CoreLedgerClient {
        build_client(&self.program_identifier, &self.hmac_key)
    }

    pub fn client_with_credentials(
        &self,
        program_identifier: &str,
        hmac_key: &str,
    ) -> CoreLedgerClient {
        build_client(program_identifier, hmac_key)
    }
}

fn build_client(program_identifier: &str, hmac_key: &str) -> CoreLedgerClient {
    CoreLedgerClient::builder(program_identifier, hmac_key)
        .with_environment(Environment::Sandbox)
        .build()
        .unwrap()
}
