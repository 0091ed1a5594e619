//! APIs and models related to ledger transactions.

mod api;
mod model;

pub use model::*;
