use anyhow::Context;
use coreledger_rust::{
    apis::{
        compliance_workflows::WorkflowStatus,
        customers::{CustomerStatus, ListCustomersQuery},
        transactions::ListTransactionsQuery,
    },
    CoreLedgerClient,
};

#[derive(serde::Deserialize, Debug)]
struct Config {
    program_identifier: String,
    hmac_key: String,
    #[serde(default = "default_environment")]
    environment: String,
    #[serde(default)]
    debug: bool,
}

fn default_environment() -> String {
    "sandbox".to_string()
}

impl Config {
    fn read() -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name("config"))
            .build()?
            .try_deserialize()
            .context("Failed to assemble the required configuration")
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::read()?;

    // Setup CoreLedger client
    let cl = CoreLedgerClient::builder(config.program_identifier, config.hmac_key)
        .with_environment(config.environment)
        .with_debug(config.debug)
        .build()?;

    // List all active customers
    let customers = cl
        .customers
        .list_all(&ListCustomersQuery {
            email: None,
            status: Some(CustomerStatus::Active),
        })
        .await?;
    tracing::info!("Found {} active customers", customers.len());

    for customer in customers.iter().take(5) {
        tracing::info!(
            "Customer {}: {} {} <{}>",
            customer.uid,
            customer.details.first_name,
            customer.details.last_name,
            customer.details.email
        );

        // Show the state of the last compliance check
        match cl.compliance_workflows.latest(&customer.uid).await {
            Ok(workflow) if workflow.status == WorkflowStatus::Approved => {
                tracing::info!("  KYC approved")
            }
            Ok(workflow) => tracing::info!(
                "  KYC {:?}, {} documents required",
                workflow.status,
                workflow.required_documents.len()
            ),
            Err(e) if e.status() == Some(404) => tracing::info!("  No compliance workflow yet"),
            Err(e) => return Err(e.into()),
        }
    }

    // Ledger movements of the last 30 days
    let transactions = cl
        .transactions
        .list_all(&ListTransactionsQuery {
            account_uid: None,
            from: Some(chrono::Utc::now() - chrono::Duration::days(30)),
            to: None,
        })
        .await?;
    for transaction in &transactions {
        tracing::info!(
            "Transaction {}: {:?} {} {}",
            transaction.uid,
            transaction.direction,
            transaction.amount,
            transaction.currency
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    if let Err(e) = run().await {
        tracing::error!("Fatal error: {:?}", e);
        std::process::exit(1);
    }
}
