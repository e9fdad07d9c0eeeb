//! Coinfolio Core - trade ledger normalization, position reconstruction and
//! portfolio valuation.
//!
//! The engine is a pure pipeline over externally owned data:
//! raw ledger records -> trade events -> positions -> valued positions ->
//! portfolio snapshot. Collaborators (ledger API, order API, price feed) are
//! traits so the pipeline can be driven by HTTP clients or test doubles.

pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod trades;

pub use portfolio::*;

pub use errors::Error;
pub use errors::Result;
