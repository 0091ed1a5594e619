//! APIs and models related to uploaded KYC documents.

mod api;
mod model;

pub use model::*;
