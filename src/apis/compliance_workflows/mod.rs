//! APIs and models related to customer compliance (KYC/KYB) workflows.

mod api;
mod model;

pub use model::*;
