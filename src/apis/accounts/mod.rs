//! APIs and models related to custodial accounts.

mod api;
mod model;

pub use model::*;
