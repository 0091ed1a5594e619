//! APIs and models related to customers.

mod api;
mod model;

pub use model::*;
