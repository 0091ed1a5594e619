//! APIs and models related to transfers between accounts.

mod api;
mod model;

pub use model::*;
