//! Async Rust client for the [CoreLedger](https://coreledger.io) financial services APIs.
//!
//! The crate covers customers, custodial accounts, debit cards, transfers, ledger
//! transactions, compliance workflows and KYC documents, plus a STOMP subscriber for the
//! CoreLedger event bus.
//!
//! # Usage
//!
//! ## Prerequisites
//!
//! Every integration is identified by a *program identifier* and an HMAC key, both
//! issued by CoreLedger. The client uses them to sign an HS512 assertion, trades it for
//! a bearer token on the first call and transparently refreshes the token every 23 hours.
//!
//! ## Initialize a new `CoreLedgerClient`
//!
//! ```rust,no_run
//! # use coreledger_rust::{CoreLedgerClient, Error};
//! # fn main() -> Result<(), Error> {
//! let client = CoreLedgerClient::builder("my-program", "my-hmac-key")
//!     .with_environment("sandbox")
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! By default, a `CoreLedgerClient` connects to the Sandbox environment.
//! Unknown environment names are replaced with `sandbox` as well.
//!
//! ## Create a customer
//!
//! ```rust,no_run
//! # use coreledger_rust::{CoreLedgerClient, Error, apis::customers::*};
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! # let client: CoreLedgerClient = unreachable!();
//! #
//! let req = CreateCustomerRequestBuilder::default()
//!     .details(
//!         CustomerDetailsBuilder::default()
//!             .first_name("Ada")
//!             .last_name("Lovelace")
//!             .email("ada@example.com")
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let customer = client.customers.create(&req).await?;
//! println!("Created new customer: {}", customer.uid);
//! # Ok(())
//! # }
//! ```
//!
//! ## Listing customers
//!
//! ```rust,no_run
//! # use coreledger_rust::{CoreLedgerClient, Error, apis::customers::*};
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! # let client: CoreLedgerClient = unreachable!();
//! #
//! let customers = client
//!     .customers
//!     .list_all(&ListCustomersQuery::default())
//!     .await?;
//! for customer in &customers {
//!     tracing::info!("Customer {}: {:?}", customer.uid, customer.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! Every call can be aborted through a [`CancellationToken`](tokio_util::sync::CancellationToken):
//!
//! ```rust,no_run
//! # use coreledger_rust::{CoreLedgerClient, Error};
//! # use tokio_util::sync::CancellationToken;
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! # let client: CoreLedgerClient = unreachable!();
//! let ctx = CancellationToken::new();
//! let scoped = client.with_cancellation(ctx.clone());
//!
//! ctx.cancel();
//! assert!(scoped.customers.get("cus_1").await.unwrap_err().is_cancelled());
//! # Ok(())
//! # }
//! ```
//!
//! ## More examples
//!
//! Look into the [`demos`](../demos) for more example usages of this library.
//!
//! To run a demo, use `cargo run` like this:
//!
//! ```shell
//! cargo run --example list_customers
//! ```

#![deny(missing_debug_implementations)]
#![forbid(unsafe_code)]

pub mod apis;
pub(crate) mod authenticator;
pub mod client;
mod common;
pub mod config;
#[cfg(feature = "conformance")]
pub mod conformance;
pub mod date;
pub mod dispatcher;
pub mod error;
mod middlewares;
pub mod pagination;
pub mod stomp;

pub use client::{CoreLedgerClient, CoreLedgerClientBuilder};
pub use config::{Config, Environment};
pub use error::Error;
