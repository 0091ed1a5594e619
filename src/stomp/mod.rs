//! Subscriber for the CoreLedger event bus, spoken over STOMP 1.2 on TLS.
//!
//! ```rust,no_run
//! # use coreledger_rust::{Environment, Error, stomp::{StompConfig, StompSubscriber}};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let config = StompConfig::new(Environment::Sandbox, "my-user", "my-password");
//! let subscriber = StompSubscriber::connect(config).await?;
//!
//! let mut events = subscriber.subscribe("customers")?;
//! while let Some(frame) = events.next_message().await {
//!     println!("{}", frame.body_text());
//! }
//!
//! subscriber.disconnect().await
//! # }
//! ```

mod frame;
mod subscriber;

pub use frame::{Frame, StompCodec, StompItem, MAX_FRAME_SIZE};
pub use subscriber::{StompConfig, StompSubscriber, Subscription};
