//! APIs and models related to debit cards.

mod api;
mod model;

pub use model::*;
